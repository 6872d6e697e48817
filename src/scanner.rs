// ============================================================================
// Wallpaper Folder Scanner
// ============================================================================
// Builds the ordered candidate list for one run. Order is whatever the
// filesystem hands back; index-based rotation relies on it staying put
// for the lifetime of the process only.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Upper bound on entries collected per scan
pub const MAX_WALLPAPERS: usize = 1000;

/// Extensions accepted as wallpapers (matched case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Cannot open wallpaper directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// True if the file name carries one of the supported image extensions
pub fn is_image_file<S: AsRef<OsStr> + ?Sized>(name: &S) -> bool {
    Path::new(name.as_ref())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Collect image files from `dir`, skipping hidden entries.
pub fn scan(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    scan_bounded(dir, MAX_WALLPAPERS)
}

fn scan_bounded(dir: &Path, limit: usize) -> Result<Vec<PathBuf>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|source| ScanError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut wallpapers = Vec::new();
    for entry in entries.filter_map(|entry| entry.ok()) {
        if wallpapers.len() >= limit {
            log::debug!("Scan stopped at {} entries", limit);
            break;
        }

        // Names need not be UTF-8; match on the raw bytes
        let name = entry.file_name();
        if name.as_encoded_bytes().first() == Some(&b'.') || !is_image_file(&name) {
            continue;
        }

        // Listing and access can race; only keep what is still there
        let path = dir.join(&name);
        if path.is_file() {
            wallpapers.push(path);
        }
    }

    Ok(wallpapers)
}
