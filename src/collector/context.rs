//! Remap context: which table entry currently governs where entries are written.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::remap::{is_under, RemapEntry};

/// Prefix the context starts with. No absolute path is under it, so the
/// first real directory always causes a switch.
pub const SENTINEL: &str = "//";

/// Active remap key and the output directory derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapContext {
    /// Prefix of the active table entry
    key: String,
    /// `<target_root>/<package>/<label>`
    output_dir: PathBuf,
}

impl RemapContext {
    /// Context before any switch has happened.
    pub fn new(package_root: &Path) -> Self {
        Self {
            key: SENTINEL.to_string(),
            output_dir: package_root.to_path_buf(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Make `entry` the active context. Returns the new output directory.
    pub fn switch_to(&mut self, entry: &RemapEntry, package_root: &Path) -> &Path {
        self.key = entry.prefix.clone();
        self.output_dir = package_root.join(&entry.label);
        &self.output_dir
    }

    /// True if `path` is at or below the active prefix.
    pub fn covers(&self, path: impl AsRef<OsStr>) -> bool {
        is_under(&self.key, path)
    }

    /// `path` with the active prefix stripped.
    ///
    /// Only meaningful for paths the context covers.
    pub fn relative<'p>(&self, path: &'p OsStr) -> &'p OsStr {
        match path.as_bytes().strip_prefix(self.key.as_bytes()) {
            Some(rest) => OsStr::from_bytes(rest),
            None => path,
        }
    }

    /// Where `path` lands in the package tree under this context.
    pub fn destination(&self, path: impl AsRef<OsStr>) -> PathBuf {
        self.output_dir.join(self.relative(path.as_ref()))
    }
}
