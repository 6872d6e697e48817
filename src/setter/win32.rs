// ============================================================================
// Windows Wallpaper Setting (NO ADMIN REQUIRED!)
// ============================================================================
// Uses the shell's IDesktopWallpaper COM object instead of the registry, so
// no elevation is needed.

use std::path::Path;

use windows::{
    core::*,
    Win32::System::Com::*,
    Win32::UI::Shell::*,
};

use super::{ApplyError, WallpaperSetter};

pub struct DesktopWallpaperSetter;

impl WallpaperSetter for DesktopWallpaperSetter {
    fn name(&self) -> &str {
        "Windows desktop"
    }

    fn apply(&self, image_path: &Path) -> std::result::Result<(), ApplyError> {
        let path_wide: Vec<u16> = image_path
            .to_str()
            .ok_or_else(|| ApplyError::InvalidPath(image_path.to_path_buf()))?
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        unsafe {
            // Only balance an initialization this call actually made
            let initialized = CoInitializeEx(None, COINIT_APARTMENTTHREADED).is_ok();

            let result = (|| -> Result<()> {
                let desktop_wallpaper: IDesktopWallpaper = CoCreateInstance(
                    &DesktopWallpaper,
                    None,
                    CLSCTX_LOCAL_SERVER,
                )?;

                // Null monitor id = every monitor
                desktop_wallpaper.SetWallpaper(PCWSTR::null(), PCWSTR::from_raw(path_wide.as_ptr()))
            })();

            if initialized {
                CoUninitialize();
            }
            result.map_err(ApplyError::from)
        }
    }
}
