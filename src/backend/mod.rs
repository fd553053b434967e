//! Package-manager backends.
//!
//! A backend answers two questions: which packages are installed, and which
//! paths each one owns. Both answers are returned as the raw newline-split
//! output, so an empty final entry marks a complete listing.

mod fixed;
mod pacman;

pub use fixed::FixedBackend;
pub use pacman::{PacmanBackend, PACMAN};

use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

/// Filters passed to the package enumerator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    /// Restrict to these package names. Empty means all installed packages.
    pub only: Vec<String>,
    /// Extra backend-specific arguments, passed through verbatim.
    pub extra_args: Vec<String>,
}

/// Source of package and owned-path listings.
pub trait PackageBackend {
    /// Installed package names, newline-split, terminated by an empty entry.
    fn list_packages(&self, filter: &PackageFilter) -> Result<Vec<String>>;

    /// Absolute paths owned by `package`, parents before children,
    /// terminated by an empty entry. Paths keep their exact bytes.
    fn list_owned_paths(&self, package: &str) -> Result<Vec<OsString>>;
}

/// Split tool output into entries, keeping the empty entry after a trailing newline.
pub fn split_lines(output: &[u8]) -> Vec<OsString> {
    output
        .split(|&b| b == b'\n')
        .map(|line| OsStr::from_bytes(line).to_os_string())
        .collect()
}
