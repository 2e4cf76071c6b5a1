//! Catalog building.
//!
//! Orchestrates platform-specific discovery into one ordered, deduplicated
//! list of launchable applications. A scan never fails: per-item problems
//! are collected as issues and the worst case is an empty catalog.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use walkdir::WalkDir;

use crate::desktop_entry::{clean_exec_command, parse_desktop_file};
use crate::error::ScanIssue;
use crate::paths::SystemPaths;
use crate::platform::Platform;
use crate::scanner::{ExeScanner, ScanFilters};
use crate::validator::ExecValidator;

/// One discoverable launch target. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppRecord {
    /// Human-readable name; not guaranteed unique.
    pub display_name: String,
    /// Absolute file path (Windows) or a command resolvable via the
    /// search path (Linux). Never empty.
    pub launch_path: String,
    /// Sourced from a trusted system location or the fallback list.
    pub is_system_app: bool,
    /// Icon theme name or absolute icon path, when the source provides one.
    pub icon_hint: Option<String>,
}

/// The result of one scan: the catalog plus everything that was skipped.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub records: Vec<AppRecord>,
    pub issues: Vec<ScanIssue>,
}

/// Classic utilities appended after the Windows tree walk.
const SYSTEM_UTILITIES: &[&str] = &[
    "calc.exe",
    "notepad.exe",
    "mspaint.exe",
    "cmd.exe",
    "explorer.exe",
    "charmap.exe",
    "msinfo32.exe",
];

/// Well-known commands offered when a Linux scan finds nothing at all.
const FALLBACK_APPS: &[(&str, &str)] = &[
    ("Terminal", "gnome-terminal"),
    ("Files", "nautilus"),
    ("Web Browser", "firefox"),
    ("Text Editor", "gedit"),
    ("Calculator", "gnome-calculator"),
    ("System Monitor", "gnome-system-monitor"),
    ("Settings", "gnome-control-center"),
];

/// Depth limit for `.desktop` directory enumeration.
const DESKTOP_WALK_DEPTH: usize = 3;

/// Builds the application catalog for one platform.
///
/// Stateless across invocations; every [`scan`](CatalogBuilder::scan)
/// recomputes from the filesystem.
pub struct CatalogBuilder {
    platform: Platform,
    paths: SystemPaths,
    filters: ScanFilters,
}

impl CatalogBuilder {
    pub fn new(platform: Platform, paths: SystemPaths) -> Self {
        Self {
            platform,
            paths,
            filters: ScanFilters::default(),
        }
    }

    /// Override the executable exclusion rules.
    pub fn with_filters(mut self, filters: ScanFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Produce the catalog for the configured platform.
    pub fn scan(&self) -> ScanOutcome {
        let mut outcome = match self.platform {
            Platform::Windows => self.scan_windows(),
            Platform::Linux => self.scan_linux(),
            // Nothing to report; not an error.
            Platform::Unsupported => ScanOutcome::default(),
        };

        // Ordinal (byte-wise) ascending by name.
        outcome
            .records
            .sort_by(|a, b| a.display_name.cmp(&b.display_name));

        info!(
            "scan complete: {} records, {} skipped",
            outcome.records.len(),
            outcome.issues.len()
        );
        outcome
    }

    fn scan_windows(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let scanner = ExeScanner::new(self.filters.clone());

        scanner.scan(
            &self.paths.program_files,
            &self.paths.system_dir,
            &mut outcome.records,
            &mut outcome.issues,
        );

        // Classic utilities from the system directory, skipping anything
        // the walk already picked up (matched by launch path).
        for utility in SYSTEM_UTILITIES {
            let path = self.paths.system_dir.join(utility);
            if !path.is_file() {
                continue;
            }
            let launch_path = path.to_string_lossy().into_owned();
            if outcome
                .records
                .iter()
                .any(|record| record.launch_path == launch_path)
            {
                continue;
            }
            outcome.records.push(AppRecord {
                display_name: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                launch_path,
                is_system_app: true,
                icon_hint: None,
            });
        }

        outcome
    }

    fn scan_linux(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let validator = ExecValidator::new(self.paths.path_var.clone());

        // Earlier directories take priority: first-seen wins for both the
        // display name and the launch path.
        let mut seen_names: HashSet<String> = HashSet::new();
        let mut seen_paths: HashSet<String> = HashSet::new();

        for dir in &self.paths.application_dirs {
            if !dir.exists() {
                continue;
            }
            debug!("scanning desktop entries under {}", dir.display());

            let walker = WalkDir::new(dir)
                .follow_links(true)
                .max_depth(DESKTOP_WALK_DEPTH);
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        let path = err
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| dir.clone());
                        if let Some(source) = err.into_io_error() {
                            outcome.issues.push(ScanIssue::ReadDir { path, source });
                        }
                        continue;
                    }
                };

                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                    continue;
                }

                let parsed = match parse_desktop_file(path) {
                    Ok(parsed) => parsed,
                    Err(issue) => {
                        outcome.issues.push(issue);
                        continue;
                    }
                };

                let command = clean_exec_command(&parsed.exec);
                if command.is_empty() || !validator.is_runnable(&command) {
                    outcome.issues.push(ScanIssue::NotRunnable { command });
                    continue;
                }

                if seen_names.contains(&parsed.name) || seen_paths.contains(&command) {
                    outcome.issues.push(ScanIssue::Duplicate {
                        path: path.to_path_buf(),
                    });
                    continue;
                }
                seen_names.insert(parsed.name.clone());
                seen_paths.insert(command.clone());

                outcome.records.push(AppRecord {
                    display_name: parsed.name,
                    launch_path: command,
                    is_system_app: true,
                    icon_hint: parsed.icon,
                });
            }
        }

        // Deterministic rule: the fallback list is offered only when the
        // scan found nothing at all.
        if outcome.records.is_empty() {
            debug!("no desktop entries found, offering fallback catalog");
            for (name, command) in FALLBACK_APPS {
                if !validator.is_runnable(command) {
                    continue;
                }
                outcome.records.push(AppRecord {
                    display_name: (*name).to_string(),
                    launch_path: (*command).to_string(),
                    is_system_app: true,
                    icon_hint: Some((*command).to_string()),
                });
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const MB: u64 = 1024 * 1024;

    fn make_file(path: &Path, len: u64) {
        let file = fs::File::create(path).unwrap();
        file.set_len(len).unwrap();
    }

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn write_desktop(dir: &Path, file: &str, name: &str, exec: &str) {
        let content = format!("[Desktop Entry]\nType=Application\nName={name}\nExec={exec}\n");
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn test_unsupported_platform_yields_empty_catalog() {
        let builder = CatalogBuilder::new(Platform::Unsupported, SystemPaths::empty());
        let outcome = builder.scan();
        assert!(outcome.records.is_empty());
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_windows_scan_appends_system_utilities() {
        let programs = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        make_file(&programs.path().join("Game.exe"), 10 * MB);
        make_file(&system.path().join("calc.exe"), 1024);
        make_file(&system.path().join("notepad.exe"), 1024);

        let mut paths = SystemPaths::empty();
        paths.program_files = vec![programs.path().to_path_buf()];
        paths.system_dir = system.path().to_path_buf();

        let outcome = CatalogBuilder::new(Platform::Windows, paths).scan();
        let names: Vec<_> = outcome
            .records
            .iter()
            .map(|r| r.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Game", "calc", "notepad"]);

        let calc = outcome
            .records
            .iter()
            .find(|r| r.display_name == "calc")
            .unwrap();
        assert!(calc.is_system_app);
    }

    #[test]
    fn test_windows_scan_deduplicates_utilities_by_launch_path() {
        // The system dir itself listed as a walk root: calc.exe is picked
        // up by the walk, then must not be appended a second time.
        let system = tempfile::tempdir().unwrap();
        make_file(&system.path().join("calc.exe"), 10 * MB);

        let mut paths = SystemPaths::empty();
        paths.program_files = vec![system.path().to_path_buf()];
        paths.system_dir = system.path().to_path_buf();

        let outcome = CatalogBuilder::new(Platform::Windows, paths).scan();
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].is_system_app);
    }

    #[test]
    fn test_windows_scan_is_idempotent() {
        let programs = tempfile::tempdir().unwrap();
        make_file(&programs.path().join("Zeta.exe"), 10 * MB);
        make_file(&programs.path().join("Alpha.exe"), 10 * MB);

        let mut paths = SystemPaths::empty();
        paths.program_files = vec![programs.path().to_path_buf()];
        paths.system_dir = PathBuf::from("/nonexistent");

        let builder = CatalogBuilder::new(Platform::Windows, paths);
        let first = builder.scan();
        let second = builder.scan();
        assert_eq!(first.records, second.records);

        let names: Vec<_> = first
            .records
            .iter()
            .map(|r| r.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_linux_scan_accepts_valid_entries() {
        let apps = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let foo = bin.path().join("foo");
        make_executable(&foo);

        write_desktop(
            apps.path(),
            "foo.desktop",
            "Foo",
            &format!("{} %U", foo.display()),
        );

        let mut paths = SystemPaths::empty();
        paths.application_dirs = vec![apps.path().to_path_buf()];

        let outcome = CatalogBuilder::new(Platform::Linux, paths).scan();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].display_name, "Foo");
        assert_eq!(outcome.records[0].launch_path, foo.display().to_string());
        assert!(outcome.records[0].is_system_app);
    }

    #[test]
    #[cfg(unix)]
    fn test_linux_scan_first_directory_wins() {
        let high = tempfile::tempdir().unwrap();
        let low = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let first = bin.path().join("first");
        let second = bin.path().join("second");
        make_executable(&first);
        make_executable(&second);

        write_desktop(high.path(), "app.desktop", "Editor", first.to_str().unwrap());
        write_desktop(low.path(), "app.desktop", "Editor", second.to_str().unwrap());

        let mut paths = SystemPaths::empty();
        paths.application_dirs = vec![high.path().to_path_buf(), low.path().to_path_buf()];

        let outcome = CatalogBuilder::new(Platform::Linux, paths).scan();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].launch_path, first.display().to_string());
        assert!(outcome
            .issues
            .iter()
            .any(|issue| matches!(issue, ScanIssue::Duplicate { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_linux_scan_skips_invalid_commands() {
        let apps = tempfile::tempdir().unwrap();
        write_desktop(apps.path(), "ghost.desktop", "Ghost", "/no/such/binary");

        let mut paths = SystemPaths::empty();
        paths.application_dirs = vec![apps.path().to_path_buf()];

        let outcome = CatalogBuilder::new(Platform::Linux, paths).scan();
        // The broken entry contributes nothing; the fallback kicks in
        // because the catalog came out empty.
        assert!(outcome
            .issues
            .iter()
            .any(|issue| matches!(issue, ScanIssue::NotRunnable { .. })));
        assert!(outcome
            .records
            .iter()
            .all(|record| record.launch_path != "/no/such/binary"));
    }

    #[test]
    fn test_linux_fallback_catalog_when_empty() {
        let mut paths = SystemPaths::empty();
        paths.application_dirs = vec![PathBuf::from("/no/such/applications")];

        let outcome = CatalogBuilder::new(Platform::Linux, paths).scan();
        // Allow-listed fallback commands survive even without a PATH.
        assert!(!outcome.records.is_empty());
        assert!(outcome.records.iter().all(|r| r.is_system_app));

        let mut sorted = outcome.records.clone();
        sorted.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        assert_eq!(outcome.records, sorted);
    }

    #[test]
    #[cfg(unix)]
    fn test_linux_fallback_not_used_when_scan_found_apps() {
        let apps = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let foo = bin.path().join("foo");
        make_executable(&foo);
        write_desktop(apps.path(), "foo.desktop", "Foo", foo.to_str().unwrap());

        let mut paths = SystemPaths::empty();
        paths.application_dirs = vec![apps.path().to_path_buf()];

        let outcome = CatalogBuilder::new(Platform::Linux, paths).scan();
        assert_eq!(outcome.records.len(), 1);
    }
}
