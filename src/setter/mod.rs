// ============================================================================
// Wallpaper Setters
// ============================================================================
// One backend per desktop mechanism. `detect()` picks the backend for the
// running platform once at startup; the rotation code only sees the trait.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[cfg(all(unix, not(target_os = "macos")))]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod win32;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Unsupported environment: {0}")]
    Unsupported(String),
    #[error("Path is not valid UTF-8: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[cfg(target_os = "windows")]
    #[error("Windows shell error: {0}")]
    Shell(#[from] windows::core::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Applies an absolute image path as the desktop wallpaper
pub trait WallpaperSetter {
    /// Short human-readable backend name
    fn name(&self) -> &str;

    /// Apply synchronously. Never retried by callers.
    fn apply(&self, image_path: &Path) -> Result<(), ApplyError>;
}

/// Returned when nothing on this machine can set a wallpaper
#[derive(Debug, Clone)]
pub struct Unsupported {
    reason: String,
}

impl Unsupported {
    pub fn new(reason: impl Into<String>) -> Self {
        Unsupported { reason: reason.into() }
    }
}

impl WallpaperSetter for Unsupported {
    fn name(&self) -> &str {
        "unsupported"
    }

    fn apply(&self, _image_path: &Path) -> Result<(), ApplyError> {
        Err(ApplyError::Unsupported(self.reason.clone()))
    }
}

/// Select the wallpaper backend for the current platform and desktop
pub fn detect() -> Box<dyn WallpaperSetter> {
    let setter = platform_setter();
    log::debug!("Using wallpaper backend: {}", setter.name());
    setter
}

#[cfg(target_os = "windows")]
fn platform_setter() -> Box<dyn WallpaperSetter> {
    Box::new(win32::DesktopWallpaperSetter)
}

#[cfg(target_os = "macos")]
fn platform_setter() -> Box<dyn WallpaperSetter> {
    Box::new(macos::SystemEventsSetter)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_setter() -> Box<dyn WallpaperSetter> {
    match linux::detect() {
        Some(tool) => Box::new(tool),
        None => Box::new(Unsupported::new(format!(
            "No compatible wallpaper tool found. Install: {}",
            linux::LinuxTool::ALL.iter().map(|t| t.program()).collect::<Vec<_>>().join(", ")
        ))),
    }
}

#[cfg(not(any(unix, target_os = "windows")))]
fn platform_setter() -> Box<dyn WallpaperSetter> {
    Box::new(Unsupported::new("Wallpaper setting is not supported on this platform"))
}

/// Run an external tool to completion, mapping a non-zero exit to an error
#[cfg_attr(target_os = "windows", allow(dead_code))]
fn run_tool(program: &str, args: &[&str]) -> Result<(), ApplyError> {
    log::debug!("Running {} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ApplyError::Spawn {
            tool: program.to_string(),
            source,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(ApplyError::Failed {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg_attr(target_os = "windows", allow(dead_code))]
fn path_str(image_path: &Path) -> Result<&str, ApplyError> {
    image_path
        .to_str()
        .ok_or_else(|| ApplyError::InvalidPath(image_path.to_path_buf()))
}
