// ============================================================================
// Rotation State Persistence
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

/// The record carried from one run to the next
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct WallpaperState {
    #[serde(default)]
    pub last_change_time: i64,    // Unix seconds, 0 = never changed
    #[serde(default)]
    pub wallpaper_index: usize,   // Position in the scan that produced it
    #[serde(default)]
    pub total_wallpapers: usize,  // Display only, never used for bounds
    #[serde(default)]
    pub last_wallpaper: String,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Could not save state to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reads and writes the state file at a fixed location
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored state. A missing or unreadable file is a first run,
    /// not an error.
    pub fn load(&self) -> WallpaperState {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let state = parse_state(&content);
                log::debug!(
                    "State loaded from {}: index {}/{}",
                    self.path.display(),
                    state.wallpaper_index,
                    state.total_wallpapers
                );
                state
            }
            Err(e) => {
                log::debug!("No state at {} ({}), starting fresh", self.path.display(), e);
                WallpaperState::default()
            }
        }
    }

    /// Overwrite the state file. The record is written beside the target and
    /// renamed into place, so a failure leaves the previous file intact.
    pub fn save(&self, state: &WallpaperState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::with_prefix_in(".wallpaper_state-", dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        log::debug!("State saved to {}", self.path.display());
        Ok(())
    }
}

/// Decode either the JSON record or the older four-line layout
/// (timestamp, index, total, path).
fn parse_state(content: &str) -> WallpaperState {
    let mut state = decode_state(content);
    // Timestamps before the epoch are treated as "never changed"
    state.last_change_time = state.last_change_time.max(0);
    state
}

fn decode_state(content: &str) -> WallpaperState {
    if content.trim_start().starts_with('{') {
        return serde_json::from_str(content).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed state file: {}", e);
            WallpaperState::default()
        });
    }

    let mut lines = content.lines();

    let last_change_time = lines.next().and_then(|l| l.trim().parse::<i64>().ok()).unwrap_or(0);
    let wallpaper_index = lines.next().and_then(|l| l.trim().parse::<usize>().ok()).unwrap_or(0);
    let total_wallpapers = lines.next().and_then(|l| l.trim().parse::<usize>().ok()).unwrap_or(0);
    let last_wallpaper = lines.next().map(|l| l.trim_end_matches('\r')).unwrap_or_default().to_string();

    WallpaperState {
        last_change_time,
        wallpaper_index,
        total_wallpapers,
        last_wallpaper,
    }
}
