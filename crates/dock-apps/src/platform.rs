//! Platform classification.
//!
//! Detected once at startup and passed by value to the services that need
//! it. Nothing in this crate consults the OS name a second time.

/// The discovery strategies this crate knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Unsupported,
}

impl Platform {
    /// Classify an OS name string.
    ///
    /// Substring match: "win" means Windows, "nix"/"nux" means Linux,
    /// anything else is unsupported (an empty catalog, not an error).
    pub fn from_os_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("win") {
            Platform::Windows
        } else if lower.contains("nix") || lower.contains("nux") {
            Platform::Linux
        } else {
            Platform::Unsupported
        }
    }

    /// Classify the OS the process is running on.
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os_name_windows() {
        assert_eq!(Platform::from_os_name("Windows 11"), Platform::Windows);
        assert_eq!(Platform::from_os_name("windows"), Platform::Windows);
    }

    #[test]
    fn test_from_os_name_linux() {
        assert_eq!(Platform::from_os_name("Linux"), Platform::Linux);
        assert_eq!(Platform::from_os_name("unix"), Platform::Linux);
    }

    #[test]
    fn test_from_os_name_unsupported() {
        assert_eq!(Platform::from_os_name("macos"), Platform::Unsupported);
        assert_eq!(Platform::from_os_name(""), Platform::Unsupported);
    }
}
