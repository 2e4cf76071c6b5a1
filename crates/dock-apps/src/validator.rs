//! Executable validation.
//!
//! Confirms that a cleaned launch command actually denotes something
//! runnable, so broken `.desktop` entries never reach the catalog.

use std::path::{Path, PathBuf};

/// Desktop-environment commands accepted even without a search-path hit.
/// Covers sessions where PATH is absent or trimmed down.
const KNOWN_COMMANDS: &[&str] = &[
    "gnome-terminal",
    "konsole",
    "xterm",
    "nautilus",
    "dolphin",
    "thunar",
    "firefox",
    "gedit",
    "kate",
    "gnome-calculator",
    "gnome-system-monitor",
    "gnome-control-center",
    "systemsettings",
];

/// Validates launch commands against the filesystem and search path.
#[derive(Clone, Debug)]
pub struct ExecValidator {
    path_var: Option<String>,
}

impl ExecValidator {
    /// Build a validator over the given search-path variable contents.
    /// `None` means the variable is unset; bare commands then only pass
    /// via the allow-list.
    pub fn new(path_var: Option<String>) -> Self {
        Self { path_var }
    }

    /// Is this command something we could actually launch?
    pub fn is_runnable(&self, command: &str) -> bool {
        if command.is_empty() {
            return false;
        }

        if command.starts_with('/') || command.starts_with('~') {
            return is_executable_file(&expand_home(command));
        }

        if let Some(path_var) = &self.path_var {
            for dir in std::env::split_paths(path_var) {
                if is_executable_file(&dir.join(command)) {
                    return true;
                }
            }
        }

        KNOWN_COMMANDS.contains(&command)
    }
}

fn expand_home(command: &str) -> PathBuf {
    if let Some(rest) = command.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(command)
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
