//! Desktop entry parsing.
//!
//! Reads freedesktop `.desktop` files into launchable entries, rejecting
//! anything that is not a user-facing application. Only keys in the unnamed
//! leading section or in `[Desktop Entry]` are honored; keys under other
//! sections (`[Desktop Action ...]` and friends) are ignored.

use std::fs;
use std::path::Path;

use crate::error::{RejectReason, ScanIssue};

/// The fields of an accepted desktop entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesktopEntry {
    pub name: String,
    pub exec: String,
    pub icon: Option<String>,
}

/// Parse the text of one `.desktop` file.
pub fn parse_desktop_entry(content: &str) -> Result<DesktopEntry, RejectReason> {
    let mut in_main = true;
    let mut entry_type: Option<String> = None;
    let mut name: Option<String> = None;
    let mut exec: Option<String> = None;
    let mut icon: Option<String> = None;
    let mut suppressed = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            in_main = line == "[Desktop Entry]";
            continue;
        }

        if !in_main {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "Type" => entry_type = Some(value.to_string()),
            // Exact key only: localized variants like Name[es] don't match.
            // Last occurrence wins.
            "Name" => name = Some(value.to_string()),
            "Exec" => exec = Some(value.to_string()),
            "Icon" => icon = Some(value.to_string()),
            "NoDisplay" | "Hidden" => {
                if value.eq_ignore_ascii_case("true") {
                    suppressed = true;
                }
            }
            _ => {}
        }
    }

    if entry_type.as_deref() != Some("Application") {
        return Err(RejectReason::NotAnApplication);
    }
    if suppressed {
        return Err(RejectReason::Suppressed);
    }

    let name = name
        .filter(|n| !n.is_empty())
        .ok_or(RejectReason::MissingName)?;
    let exec = exec
        .filter(|e| !e.is_empty())
        .ok_or(RejectReason::MissingExec)?;

    Ok(DesktopEntry {
        name,
        exec,
        icon: icon.filter(|i| !i.is_empty()),
    })
}

/// Parse one `.desktop` file from disk.
pub fn parse_desktop_file(path: &Path) -> Result<DesktopEntry, ScanIssue> {
    let content = fs::read_to_string(path).map_err(|source| ScanIssue::ReadEntry {
        path: path.to_path_buf(),
        source,
    })?;

    parse_desktop_entry(&content).map_err(|reason| ScanIssue::RejectedEntry {
        path: path.to_path_buf(),
        reason,
    })
}

/// Reduce a raw `Exec=` value to the bare executable.
///
/// Strips launcher prefixes and leading environment assignments, takes the
/// first token, drops surrounding quotes and a self-referential `.desktop`
/// suffix. Field codes (`%u`, `%F`, ...) fall away with the argument split.
pub fn clean_exec_command(raw: &str) -> String {
    let mut rest = raw.trim();

    for prefix in ["env ", "gtk-launch ", "gio launch "] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped.trim_start();
            break;
        }
    }

    // Leading VAR=value assignments: anything with an '=' that isn't an
    // absolute or home-relative path.
    let mut rest = rest.to_string();
    while !rest.is_empty()
        && rest.contains('=')
        && !rest.starts_with('/')
        && !rest.starts_with('~')
    {
        match rest.split_once(char::is_whitespace) {
            Some((_, tail)) => rest = tail.trim_start().to_string(),
            None => rest.clear(),
        }
    }

    let token = rest.split_whitespace().next().unwrap_or("");
    let token = token.trim_matches(|c| c == '"' || c == '\'');
    let token = token.strip_suffix(".desktop").unwrap_or(token);
    token.to_string()
}
