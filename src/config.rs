//! Configuration management for pkgtree.
//!
//! Reads configuration from environment variables. `main` loads an optional
//! `.env` file first with dotenvy; variables already set in the environment
//! take precedence over it. Command-line flags override everything here.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::backend::PACMAN;
use crate::orchestrator::DEFAULT_IGNORE;

/// pkgtree configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Package-manager executable (PKGTREE_PACMAN)
    pub pacman: String,
    /// Packages never collected (PKGTREE_IGNORE, comma-separated)
    pub ignore: Vec<String>,
    /// Remap table override file (PKGTREE_REMAP)
    pub remap: Option<PathBuf>,
    /// Log threshold (PKGTREE_LOG)
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pacman: PACMAN.to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            remap: None,
            log_level: LevelFilter::INFO,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(pacman) = lookup("PKGTREE_PACMAN").filter(|s| !s.trim().is_empty()) {
            config.pacman = pacman.trim().to_string();
        }

        if let Some(ignore) = lookup("PKGTREE_IGNORE") {
            config.ignore = ignore
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.remap = lookup("PKGTREE_REMAP")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        if let Some(level) = lookup("PKGTREE_LOG") {
            config.log_level = level
                .trim()
                .parse::<LevelFilter>()
                .with_context(|| format!("Invalid PKGTREE_LOG value '{}'", level))?;
        }

        Ok(config)
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  PKGTREE_PACMAN: {}", self.pacman);
        println!("  PKGTREE_IGNORE: {}", self.ignore.join(","));
        match &self.remap {
            Some(path) => println!("  PKGTREE_REMAP: {}", path.display()),
            None => println!("  PKGTREE_REMAP: (built-in table)"),
        }
        println!("  PKGTREE_LOG: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pacman, "pacman");
        assert_eq!(config.ignore, vec!["filesystem"]);
        assert_eq!(config.log_level, LevelFilter::INFO);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PKGTREE_PACMAN", "/opt/bin/pacman"),
            ("PKGTREE_IGNORE", "filesystem, base ,,"),
            ("PKGTREE_REMAP", "remap.json"),
            ("PKGTREE_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.pacman, "/opt/bin/pacman");
        assert_eq!(config.ignore, vec!["filesystem", "base"]);
        assert_eq!(config.remap, Some(PathBuf::from("remap.json")));
        assert_eq!(config.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_empty_ignore_disables_ignore_set() {
        let config = Config::from_lookup(lookup(&[("PKGTREE_IGNORE", "")])).unwrap();
        assert!(config.ignore.is_empty());
    }

    #[test]
    fn test_invalid_log_level() {
        let err = Config::from_lookup(lookup(&[("PKGTREE_LOG", "loud")])).unwrap_err();
        assert!(err.to_string().contains("PKGTREE_LOG"));
    }

    #[test]
    #[serial]
    fn test_load_reads_process_environment() {
        std::env::set_var("PKGTREE_PACMAN", "fakepacman");
        let config = Config::load();
        std::env::remove_var("PKGTREE_PACMAN");

        assert_eq!(config.unwrap().pacman, "fakepacman");
    }
}
