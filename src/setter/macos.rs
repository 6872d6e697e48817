// ============================================================================
// macOS Desktop Backend
// ============================================================================

use std::path::Path;

use super::{path_str, run_tool, ApplyError, WallpaperSetter};

/// Sets the picture on every desktop through System Events
pub struct SystemEventsSetter;

impl WallpaperSetter for SystemEventsSetter {
    fn name(&self) -> &str {
        "System Events (osascript)"
    }

    fn apply(&self, image_path: &Path) -> Result<(), ApplyError> {
        let script = format!(
            "tell application \"System Events\" to tell every desktop to set picture to \"{}\"",
            applescript_escape(path_str(image_path)?)
        );
        run_tool("osascript", &["-e", &script])
    }
}

/// Escape a value for use inside an AppleScript string literal
fn applescript_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applescript_escape() {
        assert_eq!(applescript_escape("/Users/Shared/My Pics/a.jpg"), "/Users/Shared/My Pics/a.jpg");
        assert_eq!(applescript_escape("/tmp/\"quoted\".png"), "/tmp/\\\"quoted\\\".png");
        assert_eq!(applescript_escape("/tmp/back\\slash.png"), "/tmp/back\\\\slash.png");
    }
}
