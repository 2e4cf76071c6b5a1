//! Standard filesystem locations for application and icon discovery.
//!
//! Everything is captured once into a [`SystemPaths`] value and handed to
//! the services that need it, so tests can point the whole pipeline at a
//! constructed directory tree.

use std::path::PathBuf;

use crate::platform::Platform;

/// The filesystem roots one scan operates on.
#[derive(Clone, Debug)]
pub struct SystemPaths {
    /// Windows: installation roots walked for `.exe` files.
    pub program_files: Vec<PathBuf>,
    /// Windows: the OS system directory (classic utilities live here).
    pub system_dir: PathBuf,
    /// Linux: `.desktop` directories, highest priority first.
    pub application_dirs: Vec<PathBuf>,
    /// Linux: icon theme roots, searched in order.
    pub icon_dirs: Vec<PathBuf>,
    /// Linux: flat pixmaps directory used for the bounded fallback search.
    pub pixmaps_dir: PathBuf,
    /// Contents of the search-path variable, if set.
    pub path_var: Option<String>,
}

impl SystemPaths {
    /// Capture the standard locations for the given platform.
    pub fn detect(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Self::windows_defaults(),
            Platform::Linux => Self::linux_defaults(),
            Platform::Unsupported => Self::empty(),
        }
    }

    fn windows_defaults() -> Self {
        Self {
            program_files: vec![
                PathBuf::from("C:\\Program Files"),
                PathBuf::from("C:\\Program Files (x86)"),
            ],
            system_dir: PathBuf::from("C:\\Windows\\System32"),
            application_dirs: Vec::new(),
            icon_dirs: Vec::new(),
            pixmaps_dir: PathBuf::new(),
            path_var: std::env::var("PATH").ok(),
        }
    }

    fn linux_defaults() -> Self {
        let home = dirs::home_dir().unwrap_or_default();

        Self {
            program_files: Vec::new(),
            system_dir: PathBuf::new(),
            application_dirs: vec![
                PathBuf::from("/usr/share/applications"),
                PathBuf::from("/usr/local/share/applications"),
                home.join(".local/share/applications"),
            ],
            icon_dirs: vec![
                PathBuf::from("/usr/share/icons"),
                PathBuf::from("/usr/share/pixmaps"),
                home.join(".local/share/icons"),
                home.join(".icons"),
            ],
            pixmaps_dir: PathBuf::from("/usr/share/pixmaps"),
            path_var: std::env::var("PATH").ok(),
        }
    }

    /// A path set that discovers nothing. Used for unsupported platforms
    /// and as a base for test fixtures.
    pub fn empty() -> Self {
        Self {
            program_files: Vec::new(),
            system_dir: PathBuf::new(),
            application_dirs: Vec::new(),
            icon_dirs: Vec::new(),
            pixmaps_dir: PathBuf::new(),
            path_var: None,
        }
    }
}
