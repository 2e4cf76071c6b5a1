//! dock-apps: application discovery catalog and icon resolver.
//!
//! Provides a unified service for:
//! - Scanning a machine for launchable applications (Windows `.exe` trees
//!   with exclusion rules, Linux `.desktop` directories)
//! - Desktop entry parsing and launch-command validation
//! - Icon lookup with theme directory heuristics and high-quality rescaling
//! - In-memory icon caching for fast repeat lookups
//!
//! Everything is built from explicit service objects: detect a
//! [`Platform`] once, capture [`SystemPaths`], then hand both to a
//! [`CatalogBuilder`] and an [`IconStore`]. No global state.

mod catalog;
mod desktop_entry;
mod error;
mod icons;
mod paths;
mod platform;
mod scale;
mod scanner;
mod validator;
#[cfg(windows)]
mod win_icon;

pub use catalog::{AppRecord, CatalogBuilder, ScanOutcome};
pub use desktop_entry::{DesktopEntry, clean_exec_command, parse_desktop_entry};
pub use error::{ExeFilter, RejectReason, ScanIssue};
pub use icons::{DEFAULT_ICON_SIZE, IconBitmap, IconStore};
pub use paths::SystemPaths;
pub use platform::Platform;
pub use scale::scale_with_quality;
pub use scanner::{ExeScanner, ScanFilters};
pub use validator::ExecValidator;

/// Convenience entry point: scan the current machine and return the
/// ordered catalog. Long-running; call it off the UI thread.
pub fn scan_applications() -> Vec<AppRecord> {
    let platform = Platform::detect();
    let paths = SystemPaths::detect(platform);
    CatalogBuilder::new(platform, paths).scan().records
}
