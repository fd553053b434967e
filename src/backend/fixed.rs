//! In-memory backend with canned listings.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

use super::{PackageBackend, PackageFilter};

/// Serves package and path listings from memory.
///
/// Listings are returned exactly as given; include a trailing `""` to model a
/// complete tool output.
#[derive(Debug, Clone, Default)]
pub struct FixedBackend {
    packages: Vec<String>,
    paths: HashMap<String, Vec<OsString>>,
}

impl FixedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw package listing.
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.packages = packages.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Set the raw owned-path listing for one package.
    pub fn with_paths<I, S>(mut self, package: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.paths.insert(
            package.to_string(),
            paths.into_iter().map(|s| s.as_ref().to_os_string()).collect(),
        );
        self
    }
}

impl PackageBackend for FixedBackend {
    fn list_packages(&self, filter: &PackageFilter) -> Result<Vec<String>> {
        if filter.only.is_empty() {
            return Ok(self.packages.clone());
        }
        // Like `pacman -Qq NAME...`: unknown names are an error.
        for name in &filter.only {
            if !self.packages.contains(name) {
                bail!("package '{}' was not found", name);
            }
        }
        let mut listing = filter.only.clone();
        listing.push(String::new());
        Ok(listing)
    }

    fn list_owned_paths(&self, package: &str) -> Result<Vec<OsString>> {
        match self.paths.get(package) {
            Some(paths) => Ok(paths.clone()),
            None => bail!("package '{}' was not found", package),
        }
    }
}
