// ============================================================================
// Linux / BSD Desktop Backends
// ============================================================================
// Tries the usual desktop tools in order and uses the first one on PATH.

use std::env;
use std::ffi::OsStr;
use std::path::Path;

use super::{path_str, run_tool, ApplyError, WallpaperSetter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinuxTool {
    Gsettings, // GNOME and derivatives
    Feh,
    Nitrogen,
    Xfconf,    // XFCE
}

impl LinuxTool {
    /// Detection order
    pub const ALL: [LinuxTool; 4] = [
        LinuxTool::Gsettings,
        LinuxTool::Feh,
        LinuxTool::Nitrogen,
        LinuxTool::Xfconf,
    ];

    pub fn program(&self) -> &'static str {
        match self {
            LinuxTool::Gsettings => "gsettings",
            LinuxTool::Feh => "feh",
            LinuxTool::Nitrogen => "nitrogen",
            LinuxTool::Xfconf => "xfconf-query",
        }
    }
}

impl WallpaperSetter for LinuxTool {
    fn name(&self) -> &str {
        self.program()
    }

    fn apply(&self, image_path: &Path) -> Result<(), ApplyError> {
        let path = path_str(image_path)?;

        match self {
            LinuxTool::Gsettings => {
                let uri = format!("file://{}", path);
                run_tool("gsettings", &["set", "org.gnome.desktop.background", "picture-uri", &uri])?;

                // Only exists on GNOME 42+
                if let Err(e) = run_tool("gsettings", &["set", "org.gnome.desktop.background", "picture-uri-dark", &uri]) {
                    log::debug!("Skipping picture-uri-dark: {}", e);
                }
                Ok(())
            }
            LinuxTool::Feh => run_tool("feh", &["--bg-fill", path]),
            LinuxTool::Nitrogen => run_tool("nitrogen", &["--set-zoom-fill", path]),
            LinuxTool::Xfconf => run_tool(
                "xfconf-query",
                &[
                    "-c",
                    "xfce4-desktop",
                    "-p",
                    "/backdrop/screen0/monitor0/workspace0/last-image",
                    "-s",
                    path,
                ],
            ),
        }
    }
}

/// First supported tool found on PATH
pub fn detect() -> Option<LinuxTool> {
    let path_var = env::var_os("PATH")?;
    detect_in(&path_var)
}

fn detect_in(path_var: &OsStr) -> Option<LinuxTool> {
    LinuxTool::ALL
        .into_iter()
        .find(|tool| is_on_path(path_var, tool.program()))
}

fn is_on_path(path_var: &OsStr, program: &str) -> bool {
    use std::os::unix::fs::PermissionsExt;

    env::split_paths(path_var).any(|dir| {
        dir.join(program)
            .metadata()
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_tool(dir: &Path, name: &str, executable: bool) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        let mode = if executable { 0o755 } else { 0o644 };
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_detect_prefers_earlier_tools() {
        let bin = TempDir::new().unwrap();
        fake_tool(bin.path(), "nitrogen", true);
        fake_tool(bin.path(), "feh", true);

        assert_eq!(detect_in(bin.path().as_os_str()), Some(LinuxTool::Feh));
    }

    #[test]
    fn test_detect_searches_every_path_entry() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fake_tool(second.path(), "xfconf-query", true);

        let joined = env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(detect_in(&joined), Some(LinuxTool::Xfconf));
    }

    #[test]
    fn test_detect_ignores_non_executables() {
        let bin = TempDir::new().unwrap();
        fake_tool(bin.path(), "gsettings", false);

        assert_eq!(detect_in(bin.path().as_os_str()), None);
    }

    #[test]
    fn test_non_utf8_path_is_rejected_before_running() {
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/walls/caf\xe9.jpg"));
        for tool in LinuxTool::ALL {
            assert!(matches!(tool.apply(path), Err(ApplyError::InvalidPath(_))));
        }
    }

    #[test]
    fn test_program_names() {
        let names: Vec<&str> = LinuxTool::ALL.iter().map(|t| t.program()).collect();
        assert_eq!(names, vec!["gsettings", "feh", "nitrogen", "xfconf-query"]);
    }
}
