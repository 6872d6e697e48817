// ============================================================================
// Configuration
// ============================================================================
// Where wallpapers live and where the rotation state is kept. Built from
// platform defaults, then an optional config.json, then the --dir flag
// (or WALLCYCLE_DIR).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Name of the state file inside the wallpaper folder (hidden, so scans skip it)
pub const STATE_FILE_NAME: &str = ".wallpaper_state";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Optional overrides read from config.json
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub wallpaper_dir: Option<PathBuf>,
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub wallpaper_dir: PathBuf,
    pub state_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let wallpaper_dir = default_wallpaper_dir();
        Config {
            state_file: wallpaper_dir.join(STATE_FILE_NAME),
            wallpaper_dir,
        }
    }
}

impl Config {
    /// Resolve the effective configuration. A broken config file is reported
    /// and ignored rather than stopping the run.
    pub fn resolve(dir_override: Option<PathBuf>) -> Self {
        let file = match config_file_path() {
            Some(path) => load_config_file(&path).unwrap_or_else(|e| {
                log::warn!("{}", e);
                None
            }),
            None => None,
        };

        Self::from_sources(file, dir_override)
    }

    /// Layer the config file and the directory override on top of defaults.
    pub fn from_sources(file: Option<ConfigFile>, dir_override: Option<PathBuf>) -> Self {
        let file = file.unwrap_or_default();

        let wallpaper_dir = dir_override
            .or(file.wallpaper_dir)
            .unwrap_or_else(default_wallpaper_dir);
        let wallpaper_dir = make_absolute(&wallpaper_dir);

        let state_file = file
            .state_file
            .map(|p| make_absolute(&p))
            .unwrap_or_else(|| wallpaper_dir.join(STATE_FILE_NAME));

        Config {
            wallpaper_dir,
            state_file,
        }
    }
}

/// `<config dir>/wallcycle/config.json`
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wallcycle").join("config.json"))
}

/// Read the config file; a missing file is simply `None`.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(file))
}

#[cfg(target_os = "windows")]
fn default_wallpaper_dir() -> PathBuf {
    PathBuf::from(r"C:\Wallpapers")
}

#[cfg(target_os = "macos")]
fn default_wallpaper_dir() -> PathBuf {
    PathBuf::from("/Users/Shared/Wallpapers")
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_wallpaper_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/home/user"))
        .join("Wallpapers")
}

fn make_absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
