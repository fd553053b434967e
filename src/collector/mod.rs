//! Per-package collector.
//!
//! Turns the owned-path listing of one package into a tree of symlinks under
//! `<target_root>/<package>/`, relabeling top-level system directories
//! through the [`RemapTable`].
//!
//! Paths are processed strictly in listing order. Directories that equal a
//! table prefix switch the context; everything else is placed relative to the
//! active context. A directory outside the active context falls back to the
//! catch-all entry.

mod classify;
mod context;

pub use classify::{classify, PathKind};
pub use context::{RemapContext, SENTINEL};

use anyhow::{bail, Context, Result};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::Level;

use crate::backend::PackageBackend;
use crate::remap::RemapTable;
use crate::report::Reporter;

/// Whether the path listing ended with its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// The empty terminator entry was reached.
    Complete,
    /// The listing ran out without a terminator.
    Truncated,
}

impl ScanStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            ScanStatus::Complete => 0,
            ScanStatus::Truncated => 1,
        }
    }

    pub fn is_complete(self) -> bool {
        self == ScanStatus::Complete
    }
}

/// Counters for one collector run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Directories created, intermediate parents included.
    pub dirs_created: usize,
    pub links_created: usize,
    pub skipped: usize,
}

/// What a collector run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOutcome {
    pub status: ScanStatus,
    pub stats: CollectStats,
}

/// Settings shared by every collector of a run.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Remap table; the built-in default unless overridden.
    pub table: RemapTable,
    /// Diagnostics more verbose than this are dropped.
    pub log_level: LevelFilter,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            table: RemapTable::default(),
            log_level: LevelFilter::INFO,
        }
    }
}

/// Builds the symlink tree of a single package. One run per instance.
pub struct Collector<'a> {
    package: String,
    package_root: PathBuf,
    table: RemapTable,
    log_level: LevelFilter,
    reporter: &'a dyn Reporter,
    context: RemapContext,
    stats: CollectStats,
}

impl<'a> Collector<'a> {
    /// Create a collector for `package` writing below `target_root`.
    pub fn new(
        package: &str,
        target_root: &Path,
        options: CollectorOptions,
        reporter: &'a dyn Reporter,
    ) -> Result<Self> {
        validate_package_name(package)?;

        let package_root = target_root.join(package);
        let context = RemapContext::new(&package_root);

        Ok(Self {
            package: package.to_string(),
            package_root,
            table: options.table,
            log_level: options.log_level,
            reporter,
            context,
            stats: CollectStats::default(),
        })
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    pub fn context(&self) -> &RemapContext {
        &self.context
    }

    /// Create the package directory, then mirror every owned path.
    ///
    /// Fails if the package directory already exists, if the backend fails,
    /// or if a directory or link cannot be created. Missing entries and dead
    /// links are reported and skipped.
    pub fn run(mut self, backend: &dyn PackageBackend) -> Result<CollectOutcome> {
        fs::create_dir(&self.package_root).with_context(|| {
            format!(
                "Failed to create package directory {}",
                self.package_root.display()
            )
        })?;

        let paths = backend
            .list_owned_paths(&self.package)
            .with_context(|| format!("Failed to list files owned by '{}'", self.package))?;

        let status = self.scan(&paths)?;
        if !status.is_complete() {
            self.emit(
                Level::ERROR,
                &self.package,
                "file listing ended without its terminator; output may be incomplete",
            );
        }

        Ok(CollectOutcome {
            status,
            stats: self.stats,
        })
    }

    /// Process entries in order until the empty terminator.
    fn scan(&mut self, paths: &[OsString]) -> Result<ScanStatus> {
        for path in paths {
            if path.is_empty() {
                return Ok(ScanStatus::Complete);
            }
            self.process(path)?;
        }
        Ok(ScanStatus::Truncated)
    }

    fn process(&mut self, path: &OsStr) -> Result<()> {
        match classify(path) {
            PathKind::Directory => self.directory(path),
            PathKind::File => self.file(path),
            PathKind::DeadLink => {
                self.skip(Level::WARN, path, "dead symbolic link, skipped");
                Ok(())
            }
            PathKind::Missing => {
                self.skip(Level::ERROR, path, "does not exist or permission denied");
                Ok(())
            }
            PathKind::Inaccessible => {
                self.skip(Level::ERROR, path, "cannot access");
                Ok(())
            }
        }
    }

    fn directory(&mut self, path: &OsStr) -> Result<()> {
        if let Some(entry) = self.table.exact(path) {
            let key = entry.prefix.clone();
            return self.switch_context(&key);
        }

        if !self.context.covers(path) {
            let catch_all = self.table.catch_all().prefix.clone();
            self.switch_context(&catch_all)?;
        }

        let dest = self.context.destination(path);
        self.ensure_dir(&dest)
    }

    fn file(&mut self, path: &OsStr) -> Result<()> {
        if !self.context.covers(path) {
            let catch_all = self.table.catch_all().prefix.clone();
            self.switch_context(&catch_all)?;
            if let Some(parent) = self.context.destination(path).parent() {
                self.ensure_dir(parent)?;
            }
        }

        let dest = self.context.destination(path);
        symlink(path, &dest).with_context(|| {
            format!(
                "Failed to link {} -> {}",
                dest.display(),
                Path::new(path).display()
            )
        })?;
        self.stats.links_created += 1;
        self.emit(Level::TRACE, path, &format!("linked at {}", dest.display()));
        Ok(())
    }

    /// Make the table entry for `key` the active context.
    ///
    /// The only place where the directory of a remap label is created.
    pub fn switch_context(&mut self, key: &str) -> Result<()> {
        let Some(entry) = self.table.exact(key) else {
            bail!("'{}' is not a prefix in the remap table", key);
        };
        let create = !entry.label.is_empty();
        let output_dir = self.context.switch_to(entry, &self.package_root).to_path_buf();

        self.emit(
            Level::DEBUG,
            key,
            &format!("switching context to {}", output_dir.display()),
        );
        if create {
            self.ensure_dir(&output_dir)?;
        }
        Ok(())
    }

    /// Create `dir` and any missing parents, counting each one created.
    fn ensure_dir(&mut self, dir: &Path) -> Result<()> {
        let missing = dir
            .ancestors()
            .take_while(|d| !d.as_os_str().is_empty() && !d.is_dir())
            .count();
        if missing == 0 {
            return Ok(());
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        self.stats.dirs_created += missing;
        Ok(())
    }

    fn skip(&mut self, level: Level, path: &OsStr, message: &str) {
        self.stats.skipped += 1;
        self.emit(level, path, message);
    }

    /// Diagnostics show paths lossily; the filesystem calls use the raw bytes.
    fn emit(&self, level: Level, path: impl AsRef<OsStr>, message: &str) {
        if level <= self.log_level {
            self.reporter
                .report(level, &path.as_ref().to_string_lossy(), message);
        }
    }
}

/// Package names become a single directory component.
fn validate_package_name(package: &str) -> Result<()> {
    if package.is_empty() {
        bail!("Package name must not be empty");
    }
    if package.contains('/') || package == "." || package == ".." {
        bail!("Package name '{}' is not a valid directory name", package);
    }
    Ok(())
}
