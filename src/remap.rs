//! Remap table: which top-level system directories get relabeled in a package tree.
//!
//! Entries are kept in priority order, most specific first. The catch-all `/`
//! must be the last entry so every absolute path falls under something.
//!
//! Two relations are exposed separately:
//! - [`RemapTable::exact`] - identity membership, used to decide context switches
//! - [`is_under`] - prefix relation, used to decide whether a path stays in the
//!   active context

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Prefix of the catch-all entry.
pub const CATCH_ALL: &str = "/";

/// Default mapping, most specific first.
pub const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    ("/etc/", "config"),
    ("/usr/bin/", "binaries"),
    ("/usr/share/", "share"),
    ("/usr/lib/", "libraries"),
    ("/usr/include/", "includes"),
    ("/usr/", ""),
    (CATCH_ALL, "misc"),
];

/// One prefix -> label mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapEntry {
    /// Absolute directory prefix, always ending in `/`.
    pub prefix: String,
    /// Sub-directory of the package tree. Empty means the package root itself.
    pub label: String,
}

impl RemapEntry {
    pub fn new(prefix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            label: label.into(),
        }
    }
}

/// Ordered, validated remap table. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapTable {
    entries: Vec<RemapEntry>,
}

impl Default for RemapTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES
                .iter()
                .map(|(prefix, label)| RemapEntry::new(*prefix, *label))
                .collect(),
        }
    }
}

impl RemapTable {
    /// Build a table from entries, validating ordering and shape.
    pub fn new(entries: Vec<RemapEntry>) -> Result<Self> {
        validate(&entries)?;
        Ok(Self { entries })
    }

    /// Parse a JSON array of `{"prefix": .., "label": ..}` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<RemapEntry> =
            serde_json::from_str(json).context("Remap table is not a JSON array of entries")?;
        Self::new(entries)
    }

    /// Load a table override from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read remap table: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid remap table: {}", path.display()))
    }

    pub fn entries(&self) -> &[RemapEntry] {
        &self.entries
    }

    /// Entry whose prefix equals `path` verbatim.
    pub fn exact(&self, path: impl AsRef<OsStr>) -> Option<&RemapEntry> {
        let path = path.as_ref();
        self.entries.iter().find(|e| OsStr::new(&e.prefix) == path)
    }

    /// Label for a prefix that is in the table.
    pub fn label(&self, prefix: &str) -> Option<&str> {
        self.exact(prefix).map(|e| e.label.as_str())
    }

    /// The catch-all entry. Always present after validation.
    pub fn catch_all(&self) -> &RemapEntry {
        // validate() guarantees the last entry is the catch-all
        &self.entries[self.entries.len() - 1]
    }

    /// Print the table for `--print-config`.
    pub fn print(&self) {
        println!("Remap table:");
        for entry in &self.entries {
            let label = if entry.label.is_empty() {
                "(package root)"
            } else {
                entry.label.as_str()
            };
            println!("  {:<16} -> {}", entry.prefix, label);
        }
    }
}

/// True if `path` lies at or below the directory `prefix`.
///
/// `prefix` ends in `/`, so `/usr/binaries` is not under `/usr/bin/`.
/// Compared byte-wise; `path` need not be UTF-8.
pub fn is_under(prefix: &str, path: impl AsRef<OsStr>) -> bool {
    path.as_ref().as_bytes().starts_with(prefix.as_bytes())
}

fn validate(entries: &[RemapEntry]) -> Result<()> {
    if entries.is_empty() {
        bail!("Remap table is empty; it needs at least the catch-all '{}'", CATCH_ALL);
    }

    for (i, entry) in entries.iter().enumerate() {
        if !entry.prefix.starts_with('/') || !entry.prefix.ends_with('/') {
            bail!(
                "Remap prefix '{}' must be absolute and end with '/'",
                entry.prefix
            );
        }
        if entry.label.starts_with('/') || entry.label.split('/').any(|c| c == "..") {
            bail!(
                "Remap label '{}' for '{}' must stay inside the package directory",
                entry.label,
                entry.prefix
            );
        }
        for earlier in &entries[..i] {
            if earlier.prefix == entry.prefix {
                bail!("Remap prefix '{}' appears more than once", entry.prefix);
            }
            // A later entry nested under an earlier one could never be preferred.
            if is_under(&earlier.prefix, &entry.prefix) {
                bail!(
                    "Remap prefix '{}' must come before its parent '{}'",
                    entry.prefix,
                    earlier.prefix
                );
            }
        }
    }

    let last = &entries[entries.len() - 1];
    if last.prefix != CATCH_ALL {
        bail!(
            "Remap table must end with the catch-all '{}', found '{}'",
            CATCH_ALL,
            last.prefix
        );
    }

    Ok(())
}
