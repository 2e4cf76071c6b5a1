//! Icon resolution and caching.
//!
//! Resolves a decoded bitmap for an application record using the cheapest
//! platform mechanism, then serves repeats from an in-memory cache. Misses
//! are never cached, so an icon that appears later is picked up on the
//! next request.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use image::RgbaImage;
use log::debug;
use walkdir::WalkDir;

use crate::catalog::AppRecord;
use crate::error::ScanIssue;
use crate::paths::SystemPaths;
use crate::platform::Platform;
use crate::scale::scale_with_quality;

/// A cached, decoded icon. Shared read-only with consumers.
pub type IconBitmap = Arc<RgbaImage>;

/// Edge length icons are normalized to.
pub const DEFAULT_ICON_SIZE: u32 = 64;

/// Pixel sizes tried largest-first when searching theme directories.
const ICON_SIZES: &[u32] = &[256, 128, 96, 64, 48, 32];

/// Themes tried after hicolor.
const POPULAR_THEMES: &[&str] = &["Adwaita", "gnome", "oxygen", "breeze", "Papirus"];

/// Extensions the decoder handles.
const ICON_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Depth limit for the last-resort search under the pixmaps directory.
const PIXMAPS_FALLBACK_DEPTH: usize = 3;

/// Platform icon lookup plus process-lifetime cache.
///
/// Safe to share across threads; concurrent resolutions for the same key
/// may race but both produce an immutable entry, last write wins.
pub struct IconStore {
    platform: Platform,
    paths: SystemPaths,
    target_size: u32,
    cache: RwLock<HashMap<String, IconBitmap>>,
}

impl IconStore {
    pub fn new(platform: Platform, paths: SystemPaths) -> Self {
        Self {
            platform,
            paths,
            target_size: DEFAULT_ICON_SIZE,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Override the normalized icon size.
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Resolve the icon for a record. `None` means "no icon"; the caller
    /// substitutes a placeholder.
    pub fn resolve(&self, record: &AppRecord) -> Option<IconBitmap> {
        let key = self.cache_key(record);
        if key.is_empty() {
            return None;
        }

        {
            let cache = self.cache.read().unwrap();
            if let Some(hit) = cache.get(&key) {
                return Some(hit.clone());
            }
        }

        let loaded = match self.platform {
            Platform::Windows => self.load_windows(&record.launch_path),
            Platform::Linux => self.load_linux(&key),
            Platform::Unsupported => None,
        }?;

        let scaled = Arc::new(scale_with_quality(
            &loaded,
            self.target_size,
            self.target_size,
        ));
        self.cache
            .write()
            .unwrap()
            .insert(key, Arc::clone(&scaled));
        Some(scaled)
    }

    fn cache_key(&self, record: &AppRecord) -> String {
        match self.platform {
            Platform::Windows => record.launch_path.clone(),
            // Theme name when the entry provides one, otherwise the
            // command stem doubles as the icon name.
            _ => record.icon_hint.clone().unwrap_or_else(|| {
                Path::new(&record.launch_path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }),
        }
    }

    #[cfg(windows)]
    fn load_windows(&self, launch_path: &str) -> Option<RgbaImage> {
        crate::win_icon::extract_shell_icon(Path::new(launch_path))
    }

    #[cfg(not(windows))]
    fn load_windows(&self, launch_path: &str) -> Option<RgbaImage> {
        debug!("shell icon extraction unavailable on this host: {launch_path}");
        None
    }

    fn load_linux(&self, hint: &str) -> Option<RgbaImage> {
        let path = if hint.starts_with('/') {
            PathBuf::from(hint)
        } else {
            self.find_theme_icon(hint)?
        };

        match self.load_image(&path) {
            Ok(image) => Some(image),
            Err(issue) => {
                debug!("{issue}");
                None
            }
        }
    }

    fn load_image(&self, path: &Path) -> Result<RgbaImage, ScanIssue> {
        image::open(path)
            .map(|img| img.to_rgba8())
            .map_err(|err| ScanIssue::Decode {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }

    /// Search the standard icon directories for a theme icon name.
    /// Largest sizes first, hicolor before other themes, first match wins.
    fn find_theme_icon(&self, name: &str) -> Option<PathBuf> {
        for size in ICON_SIZES {
            let dim = format!("{size}x{size}");
            for base in &self.paths.icon_dirs {
                if !base.is_dir() {
                    continue;
                }
                for ext in ICON_EXTENSIONS {
                    let file = format!("{name}.{ext}");

                    for sub in ["apps", "applications"] {
                        let candidate = base.join("hicolor").join(&dim).join(sub).join(&file);
                        if candidate.is_file() {
                            return Some(candidate);
                        }
                    }

                    for theme in POPULAR_THEMES {
                        let candidate = base.join(theme).join(&dim).join("apps").join(&file);
                        if candidate.is_file() {
                            return Some(candidate);
                        }
                    }

                    // Any other theme installed under this base.
                    if let Ok(entries) = fs::read_dir(base) {
                        for entry in entries.flatten() {
                            let theme_dir = entry.path();
                            if !theme_dir.is_dir() {
                                continue;
                            }
                            let candidate = theme_dir.join(&dim).join("apps").join(&file);
                            if candidate.is_file() {
                                return Some(candidate);
                            }
                        }
                    }
                }
            }
        }

        // Flat files directly in the base directories (classic pixmaps).
        for base in &self.paths.icon_dirs {
            for ext in ICON_EXTENSIONS {
                let candidate = base.join(format!("{name}.{ext}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        // Bounded recursive sweep under pixmaps; some icons hide in
        // vendor subdirectories.
        if self.paths.pixmaps_dir.is_dir() {
            let wanted: Vec<String> = ICON_EXTENSIONS
                .iter()
                .map(|ext| format!("{name}.{ext}"))
                .collect();
            for entry in WalkDir::new(&self.paths.pixmaps_dir)
                .max_depth(PIXMAPS_FALLBACK_DEPTH)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(file_name) = entry.file_name().to_str() {
                    if wanted.iter().any(|w| w == file_name) {
                        return Some(entry.path().to_path_buf());
                    }
                }
            }
        }

        debug!("no icon found for theme name: {name}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn record(name: &str, launch_path: &str, icon_hint: Option<&str>) -> AppRecord {
        AppRecord {
            display_name: name.to_string(),
            launch_path: launch_path.to_string(),
            is_system_app: false,
            icon_hint: icon_hint.map(str::to_string),
        }
    }

    fn write_png(path: &Path, size: u32) {
        RgbaImage::from_pixel(size, size, Rgba([120, 10, 200, 255]))
            .save(path)
            .unwrap();
    }

    fn linux_store(paths: SystemPaths) -> IconStore {
        IconStore::new(Platform::Linux, paths)
    }

    #[test]
    fn test_absolute_hint_loads_and_scales() {
        let dir = tempfile::tempdir().unwrap();
        let icon_path = dir.path().join("app.png");
        write_png(&icon_path, 256);

        let store = linux_store(SystemPaths::empty());
        let rec = record("App", "/usr/bin/app", Some(icon_path.to_str().unwrap()));

        let bitmap = store.resolve(&rec).unwrap();
        assert_eq!(bitmap.dimensions(), (64, 64));
    }

    #[test]
    fn test_second_resolution_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let icon_path = dir.path().join("app.png");
        write_png(&icon_path, 64);

        let store = linux_store(SystemPaths::empty());
        let rec = record("App", "/usr/bin/app", Some(icon_path.to_str().unwrap()));

        let first = store.resolve(&rec).unwrap();

        // Remove the file: a second resolution can only succeed from cache.
        fs::remove_file(&icon_path).unwrap();
        let second = store.resolve(&rec).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_misses_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let icon_path = dir.path().join("late.png");

        let store = linux_store(SystemPaths::empty());
        let rec = record("Late", "/usr/bin/late", Some(icon_path.to_str().unwrap()));

        assert!(store.resolve(&rec).is_none());

        // The file appears later; the next request must retry and succeed.
        write_png(&icon_path, 64);
        assert!(store.resolve(&rec).is_some());
    }

    #[test]
    fn test_theme_lookup_prefers_largest_size() {
        let base = tempfile::tempdir().unwrap();
        let small = base.path().join("hicolor/48x48/apps");
        let large = base.path().join("hicolor/128x128/apps");
        fs::create_dir_all(&small).unwrap();
        fs::create_dir_all(&large).unwrap();
        write_png(&small.join("editor.png"), 48);
        write_png(&large.join("editor.png"), 128);

        let mut paths = SystemPaths::empty();
        paths.icon_dirs = vec![base.path().to_path_buf()];

        let store = linux_store(paths);
        let found = store.find_theme_icon("editor").unwrap();
        assert!(found.ends_with("hicolor/128x128/apps/editor.png"));
    }

    #[test]
    fn test_theme_lookup_falls_back_to_flat_pixmaps() {
        let base = tempfile::tempdir().unwrap();
        write_png(&base.path().join("legacy.png"), 32);

        let mut paths = SystemPaths::empty();
        paths.icon_dirs = vec![base.path().to_path_buf()];

        let store = linux_store(paths);
        let found = store.find_theme_icon("legacy").unwrap();
        assert!(found.ends_with("legacy.png"));
    }

    #[test]
    fn test_pixmaps_recursive_fallback() {
        let pixmaps = tempfile::tempdir().unwrap();
        let nested = pixmaps.path().join("vendor").join("deep");
        fs::create_dir_all(&nested).unwrap();
        write_png(&nested.join("buried.png"), 32);

        let mut paths = SystemPaths::empty();
        paths.pixmaps_dir = pixmaps.path().to_path_buf();

        let store = linux_store(paths);
        let found = store.find_theme_icon("buried").unwrap();
        assert!(found.ends_with("buried.png"));
    }

    #[test]
    fn test_hintless_record_uses_command_stem() {
        let base = tempfile::tempdir().unwrap();
        write_png(&base.path().join("myeditor.png"), 32);

        let mut paths = SystemPaths::empty();
        paths.icon_dirs = vec![base.path().to_path_buf()];

        let store = linux_store(paths);
        let rec = record("My Editor", "/usr/bin/myeditor", None);
        assert!(store.resolve(&rec).is_some());
    }

    #[test]
    fn test_unsupported_platform_has_no_icons() {
        let store = IconStore::new(Platform::Unsupported, SystemPaths::empty());
        let rec = record("App", "/usr/bin/app", Some("app"));
        assert!(store.resolve(&rec).is_none());
    }

    #[test]
    fn test_decode_failure_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("broken.png");
        fs::write(&bogus, b"not actually a png").unwrap();

        let store = linux_store(SystemPaths::empty());
        let rec = record("Broken", "/usr/bin/broken", Some(bogus.to_str().unwrap()));
        assert!(store.resolve(&rec).is_none());
    }
}
