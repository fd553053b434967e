//! Runs one collector per installed package.
//!
//! Packages are processed one at a time, in the order the backend lists
//! them, so diagnostics always belong to the package printed last.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{PackageBackend, PackageFilter};
use crate::collector::{CollectStats, Collector, CollectorOptions, ScanStatus};
use crate::report::Reporter;
use crate::timing::Timer;

/// Package owning the bare filesystem skeleton; never worth mirroring.
pub const DEFAULT_IGNORE: &[&str] = &["filesystem"];

/// Totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packages whose listing was complete.
    pub collected: Vec<String>,
    /// Packages whose listing had no terminator.
    pub truncated: Vec<String>,
    /// Packages skipped because of the ignore-set.
    pub ignored: Vec<String>,
    /// Whether the package listing itself was terminated.
    pub listing_complete: bool,
    pub stats: CollectStats,
}

impl RunSummary {
    pub fn status(&self) -> ScanStatus {
        if self.listing_complete && self.truncated.is_empty() {
            ScanStatus::Complete
        } else {
            ScanStatus::Truncated
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.status().exit_code()
    }

    fn add(&mut self, stats: CollectStats) {
        self.stats.dirs_created += stats.dirs_created;
        self.stats.links_created += stats.links_created;
        self.stats.skipped += stats.skipped;
    }

    pub fn print(&self) {
        println!();
        println!(
            "Collected {} package(s): {} links, {} directories, {} skipped entries",
            self.collected.len() + self.truncated.len(),
            self.stats.links_created,
            self.stats.dirs_created,
            self.stats.skipped
        );
        if !self.ignored.is_empty() {
            println!("  Ignored: {}", self.ignored.join(", "));
        }
        if !self.truncated.is_empty() {
            println!("  INCOMPLETE file listings: {}", self.truncated.join(", "));
        }
        if !self.listing_complete {
            println!("  INCOMPLETE package listing");
        }
    }
}

/// Drives collectors for every selected package.
pub struct Orchestrator<'a> {
    target_root: PathBuf,
    filter: PackageFilter,
    ignore: Vec<String>,
    options: CollectorOptions,
    backend: &'a dyn PackageBackend,
    reporter: &'a dyn Reporter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        target_root: &Path,
        backend: &'a dyn PackageBackend,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            target_root: target_root.to_path_buf(),
            filter: PackageFilter::default(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            options: CollectorOptions::default(),
            backend,
            reporter,
        }
    }

    pub fn with_filter(mut self, filter: PackageFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the ignore-set.
    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Remap table and log level handed to every collector.
    pub fn with_options(mut self, options: CollectorOptions) -> Self {
        self.options = options;
        self
    }

    /// Collect every listed package.
    ///
    /// A fatal error from any collector aborts the run. A truncated listing
    /// does not; the remaining packages are still collected and the summary
    /// reports failure.
    pub fn run(&self) -> Result<RunSummary> {
        fs::create_dir_all(&self.target_root).with_context(|| {
            format!(
                "Failed to create target directory {}",
                self.target_root.display()
            )
        })?;

        let packages = self
            .backend
            .list_packages(&self.filter)
            .context("Failed to list installed packages")?;

        let mut summary = RunSummary::default();
        for package in &packages {
            if package.is_empty() {
                summary.listing_complete = true;
                break;
            }
            if self.ignore.contains(package) {
                self.reporter.debug(package, "in ignore-set, skipped");
                summary.ignored.push(package.clone());
                continue;
            }

            println!("Collecting {}...", package);
            let timer = Timer::start(package);
            let outcome = Collector::new(
                package,
                &self.target_root,
                self.options.clone(),
                self.reporter,
            )?
            .run(self.backend)
            .with_context(|| format!("Collecting '{}' failed", package))?;
            timer.finish();

            summary.add(outcome.stats);
            match outcome.status {
                ScanStatus::Complete => summary.collected.push(package.clone()),
                ScanStatus::Truncated => summary.truncated.push(package.clone()),
            }
        }

        if !summary.listing_complete {
            self.reporter.error(
                "",
                "package listing ended without its terminator; some packages may be missing",
            );
        }

        Ok(summary)
    }
}
