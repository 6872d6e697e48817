// ============================================================================
// Rotation Policy
// ============================================================================
// Decides when to advance and which wallpaper comes next. Index math always
// uses the length of the current scan; the stored total is display only.

use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use crate::setter::{ApplyError, WallpaperSetter};
use crate::state::{StateError, StateStore, WallpaperState};

/// Minimum time between unforced changes (one day)
pub const CHANGE_INTERVAL_SECS: i64 = 86_400;

#[derive(Debug, Error)]
pub enum RotationError {
    #[error("No wallpapers available")]
    NoWallpapers,
}

/// What a rotation or random pick did
#[derive(Debug)]
pub enum RotationOutcome {
    /// A new wallpaper was chosen, applied and persisted
    Changed {
        index: usize,
        total: usize,
        path: PathBuf,
        applied: Result<(), ApplyError>,
        saved: Result<(), StateError>,
    },
    /// Inside the 24h window; nothing touched
    NotDue {
        hours_remaining: i64,
        current: String,
    },
}

/// True once a full day has passed, if nothing was ever set, or if the
/// clock went backwards past the last change.
pub fn should_change(state: &WallpaperState, now: i64) -> bool {
    if state.last_change_time == 0 {
        return true;
    }
    let elapsed = now.saturating_sub(state.last_change_time);
    !(0..CHANGE_INTERVAL_SECS).contains(&elapsed)
}

/// Whole hours until the next unforced change (negative when overdue)
pub fn hours_until_next_change(state: &WallpaperState, now: i64) -> i64 {
    CHANGE_INTERVAL_SECS.saturating_sub(now.saturating_sub(state.last_change_time)) / 3600
}

/// Whole hours since the last change
pub fn hours_since_last_change(state: &WallpaperState, now: i64) -> i64 {
    now.saturating_sub(state.last_change_time) / 3600
}

/// Advance to the next wallpaper in scan order.
///
/// Without `force` this is a no-op until a day has passed. A fresh state sits
/// at index 0, so the first rotation lands on index 1.
pub fn rotate(
    wallpapers: &[PathBuf],
    state: &mut WallpaperState,
    force: bool,
    now: i64,
    setter: &dyn WallpaperSetter,
    store: &StateStore,
) -> Result<RotationOutcome, RotationError> {
    if wallpapers.is_empty() {
        return Err(RotationError::NoWallpapers);
    }

    if !force && !should_change(state, now) {
        return Ok(RotationOutcome::NotDue {
            hours_remaining: hours_until_next_change(state, now),
            current: state.last_wallpaper.clone(),
        });
    }

    let count = wallpapers.len();
    let index = (state.wallpaper_index % count + 1) % count;
    Ok(commit(wallpapers, state, index, now, setter, store))
}

/// Jump to a uniformly random wallpaper, ignoring the stored index.
pub fn pick_random<R: Rng>(
    wallpapers: &[PathBuf],
    state: &mut WallpaperState,
    now: i64,
    rng: &mut R,
    setter: &dyn WallpaperSetter,
    store: &StateStore,
) -> Result<RotationOutcome, RotationError> {
    if wallpapers.is_empty() {
        return Err(RotationError::NoWallpapers);
    }

    let index = rng.random_range(0..wallpapers.len());
    Ok(commit(wallpapers, state, index, now, setter, store))
}

/// Record the choice, apply it and persist. The state is saved even when
/// applying failed, so the next run still moves on.
fn commit(
    wallpapers: &[PathBuf],
    state: &mut WallpaperState,
    index: usize,
    now: i64,
    setter: &dyn WallpaperSetter,
    store: &StateStore,
) -> RotationOutcome {
    let path = wallpapers[index].clone();

    state.total_wallpapers = wallpapers.len();
    state.wallpaper_index = index;
    state.last_change_time = now;
    state.last_wallpaper = path.to_string_lossy().into_owned();

    let applied = apply_logged(setter, &path);
    let saved = store.save(state);
    if let Err(e) = &saved {
        log::warn!("{}", e);
    }

    RotationOutcome::Changed {
        index,
        total: wallpapers.len(),
        path,
        applied,
        saved,
    }
}

fn apply_logged(setter: &dyn WallpaperSetter, path: &Path) -> Result<(), ApplyError> {
    log::debug!("Applying {} via {}", path.display(), setter.name());
    let result = setter.apply(path);
    if let Err(e) = &result {
        log::warn!("{} could not set wallpaper: {}", setter.name(), e);
    }
    result
}
