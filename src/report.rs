//! Diagnostic sinks.
//!
//! The collector reports skipped entries through a [`Reporter`] instead of a
//! global logger, so tests can assert on exactly what was emitted.

use std::cell::RefCell;
use tracing::Level;

/// Receives diagnostics about individual paths.
pub trait Reporter {
    fn report(&self, level: Level, path: &str, message: &str);

    fn error(&self, path: &str, message: &str) {
        self.report(Level::ERROR, path, message);
    }

    fn debug(&self, path: &str, message: &str) {
        self.report(Level::DEBUG, path, message);
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, path: &str, message: &str) {
        // tracing macros need the level as a constant
        match level {
            Level::ERROR => tracing::error!(path, "{}", message),
            Level::WARN => tracing::warn!(path, "{}", message),
            Level::INFO => tracing::info!(path, "{}", message),
            Level::DEBUG => tracing::debug!(path, "{}", message),
            _ => tracing::trace!(path, "{}", message),
        }
    }
}

/// One captured diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub path: String,
    pub message: String,
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: RefCell<Vec<Diagnostic>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Diagnostics at exactly `level`.
    pub fn at(&self, level: Level) -> Vec<Diagnostic> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.level == level)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, level: Level, path: &str, message: &str) {
        self.entries.borrow_mut().push(Diagnostic {
            level,
            path: path.to_string(),
            message: message.to_string(),
        });
    }
}
