//! Executable tree walk for Windows-style discovery.
//!
//! Walks installation roots with an explicit work queue (no recursion, so
//! pathological trees can't blow the stack) and a visited set of canonical
//! paths to break symlink cycles. Every dropped candidate is recorded as a
//! [`ScanIssue`] instead of silently vanishing.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::catalog::AppRecord;
use crate::error::{ExeFilter, ScanIssue};

/// Exclusion rules for the executable walk.
#[derive(Clone, Debug)]
pub struct ScanFilters {
    /// Directory names skipped wholesale (case-sensitive substring).
    pub excluded_dirs: Vec<String>,
    /// Filename substrings of installers/updaters/helpers (matched lowercase).
    pub name_keywords: Vec<String>,
    /// Full-path substrings such as plugin subtrees (matched lowercase).
    pub path_keywords: Vec<String>,
    /// Minimum file size in whole megabytes; smaller stubs are skipped.
    pub min_size_mb: u64,
}

impl Default for ScanFilters {
    fn default() -> Self {
        let sep = std::path::MAIN_SEPARATOR;
        Self {
            excluded_dirs: [
                "Common Files",
                "Intel",
                "NVIDIA",
                "NVIDIA Corporation",
                "drivers",
                "Microsoft.NET",
                "Microsoft SDKs",
                "Windows Defender",
                "Temp",
                "Redist",
                "vcredist",
                "DirectX",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            name_keywords: [
                "unins",
                "setup",
                "update",
                "crash",
                "dbg",
                "report",
                "support",
                "install",
                "service",
                "agent",
                "helper",
                "plugin",
                "eula",
                "readme",
                "daemon",
                "symbolizer",
                "clangd",
                "redist",
                "perf",
                "vcredist",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            path_keywords: ["plugins", "resources", "lldb", "vc"]
                .iter()
                .map(|segment| format!("{sep}{segment}{sep}"))
                .collect(),
            min_size_mb: 5,
        }
    }
}

/// Walks directory roots and emits records for surviving executables.
pub struct ExeScanner {
    filters: ScanFilters,
}

impl ExeScanner {
    pub fn new(filters: ScanFilters) -> Self {
        Self { filters }
    }

    /// Walk the given roots. `system_dir` marks which records count as
    /// system apps. Output order is walk order; the catalog sorts later.
    pub fn scan(
        &self,
        roots: &[PathBuf],
        system_dir: &Path,
        records: &mut Vec<AppRecord>,
        issues: &mut Vec<ScanIssue>,
    ) {
        let mut queue: VecDeque<PathBuf> = roots
            .iter()
            .filter(|root| root.is_dir())
            .cloned()
            .collect();
        let mut visited: HashSet<PathBuf> = HashSet::new();

        while let Some(dir) = queue.pop_front() {
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                if self
                    .filters
                    .excluded_dirs
                    .iter()
                    .any(|excluded| name.contains(excluded.as_str()))
                {
                    issues.push(ScanIssue::Filtered {
                        path: dir,
                        filter: ExeFilter::ExcludedDirectory,
                    });
                    continue;
                }
            }

            // Cycle guard: one visit per canonical directory.
            if let Ok(canonical) = fs::canonicalize(&dir) {
                if !visited.insert(canonical) {
                    debug!("already visited, skipping: {}", dir.display());
                    continue;
                }
            }

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(source) => {
                    issues.push(ScanIssue::ReadDir { path: dir, source });
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => {
                        issues.push(ScanIssue::ReadDir {
                            path: dir.clone(),
                            source,
                        });
                        continue;
                    }
                };

                let path = entry.path();
                if path.is_dir() {
                    queue.push_back(path);
                    continue;
                }
                if !path.is_file() || !has_exe_extension(&path) {
                    continue;
                }

                match self.filter_executable(&path) {
                    Ok(record_path) => {
                        let display_name = record_path
                            .file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        records.push(AppRecord {
                            display_name,
                            launch_path: record_path.to_string_lossy().into_owned(),
                            is_system_app: record_path.starts_with(system_dir),
                            icon_hint: None,
                        });
                    }
                    Err(issue) => issues.push(issue),
                }
            }
        }
    }

    /// Apply the three candidate filters in order: size, name keyword,
    /// path keyword. Ok means the file belongs in the catalog.
    fn filter_executable(&self, path: &Path) -> Result<PathBuf, ScanIssue> {
        let meta = match path.metadata() {
            Ok(meta) => meta,
            Err(source) => {
                return Err(ScanIssue::Metadata {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let size_mb = meta.len() / (1024 * 1024);
        if size_mb < self.filters.min_size_mb {
            return Err(ScanIssue::Filtered {
                path: path.to_path_buf(),
                filter: ExeFilter::BelowMinSize,
            });
        }

        let name_lower = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if self
            .filters
            .name_keywords
            .iter()
            .any(|kw| name_lower.contains(kw.as_str()))
        {
            return Err(ScanIssue::Filtered {
                path: path.to_path_buf(),
                filter: ExeFilter::NameKeyword,
            });
        }

        let path_lower = path.to_string_lossy().to_lowercase();
        if self
            .filters
            .path_keywords
            .iter()
            .any(|kw| path_lower.contains(kw.as_str()))
        {
            return Err(ScanIssue::Filtered {
                path: path.to_path_buf(),
                filter: ExeFilter::PathKeyword,
            });
        }

        Ok(path.to_path_buf())
    }
}

fn has_exe_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("exe"))
        .unwrap_or(false)
}
