//! Issue types collected during a scan.
//!
//! A scan never fails outright. Every per-item problem (unreadable
//! directory, malformed desktop entry, filtered executable) is recorded as a
//! [`ScanIssue`] in the scan outcome so callers and tests can see exactly
//! which candidates were dropped and why.

use std::path::PathBuf;

/// Why a `.desktop` entry was rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Type is not Application")]
    NotAnApplication,

    #[error("entry is hidden or NoDisplay")]
    Suppressed,

    #[error("Name is missing or empty")]
    MissingName,

    #[error("Exec is missing or empty")]
    MissingExec,
}

/// Which executable filter dropped a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExeFilter {
    /// The directory name matched the exclusion list; the subtree was skipped.
    ExcludedDirectory,
    /// File size below the configured minimum.
    BelowMinSize,
    /// Filename contained an installer/helper keyword.
    NameKeyword,
    /// Full path contained an excluded path segment.
    PathKeyword,
}

impl std::fmt::Display for ExeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExeFilter::ExcludedDirectory => "excluded directory",
            ExeFilter::BelowMinSize => "below minimum size",
            ExeFilter::NameKeyword => "name keyword",
            ExeFilter::PathKeyword => "path keyword",
        };
        f.write_str(name)
    }
}

/// One skipped candidate or per-item failure from a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanIssue {
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to stat {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("filtered {path} ({filter})")]
    Filtered { path: PathBuf, filter: ExeFilter },

    #[error("unreadable desktop entry {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("rejected desktop entry {path}: {reason}")]
    RejectedEntry { path: PathBuf, reason: RejectReason },

    #[error("command not runnable: {command}")]
    NotRunnable { command: String },

    #[error("duplicate of an earlier entry: {path}")]
    Duplicate { path: PathBuf },

    #[error("failed to decode image {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

impl ScanIssue {
    /// The path this issue is about, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ScanIssue::ReadDir { path, .. }
            | ScanIssue::Metadata { path, .. }
            | ScanIssue::Filtered { path, .. }
            | ScanIssue::ReadEntry { path, .. }
            | ScanIssue::RejectedEntry { path, .. }
            | ScanIssue::Duplicate { path }
            | ScanIssue::Decode { path, .. } => Some(path),
            ScanIssue::NotRunnable { .. } => None,
        }
    }
}
