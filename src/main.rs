//! pkgtree - browse what each installed package actually contains.
//!
//! Builds `<TARGET>/<package>/...` symlink trees from the pacman database,
//! with `/etc/`, `/usr/bin/` and friends relabeled to readable names.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use pkgtree::backend::{PackageFilter, PacmanBackend};
use pkgtree::collector::CollectorOptions;
use pkgtree::config::Config;
use pkgtree::orchestrator::Orchestrator;
use pkgtree::remap::RemapTable;
use pkgtree::report::TracingReporter;

#[derive(Parser, Debug)]
#[command(name = "pkgtree")]
#[command(about = "Mirror the files of installed packages as symlink trees")]
#[command(
    after_help = "EXAMPLES:\n  pkgtree ~/pkgs                     Every installed package\n  pkgtree ~/pkgs --only bash zsh     Only the named packages\n  pkgtree ~/pkgs --pacman-arg=-e     Explicitly installed packages only"
)]
struct Cli {
    /// Directory receiving one sub-directory per package
    #[arg(required_unless_present = "print_config")]
    target: Option<PathBuf>,

    /// Only collect these packages
    #[arg(long, num_args = 1.., value_name = "NAME")]
    only: Vec<String>,

    /// Extra argument for the package listing query (repeatable)
    #[arg(long = "pacman-arg", value_name = "ARG", allow_hyphen_values = true)]
    pacman_args: Vec<String>,

    /// Never collect this package (repeatable; replaces PKGTREE_IGNORE)
    #[arg(long, value_name = "NAME")]
    ignore: Vec<String>,

    /// JSON remap table replacing the built-in one
    #[arg(long, value_name = "FILE")]
    remap: Option<PathBuf>,

    /// Log threshold: off, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LevelFilter>,

    /// Print the effective configuration and remap table, then exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    fn apply(&self, mut config: Config) -> Config {
        if !self.ignore.is_empty() {
            config.ignore = self.ignore.clone();
        }
        if let Some(remap) = &self.remap {
            config.remap = Some(remap.clone());
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config
    }

    fn filter(&self) -> PackageFilter {
        PackageFilter {
            only: self.only.clone(),
            extra_args: self.pacman_args.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = cli.apply(Config::load()?);
    init_logging(config.log_level);

    let table = match &config.remap {
        Some(path) => RemapTable::from_json_file(path)?,
        None => RemapTable::default(),
    };

    let target = match &cli.target {
        Some(target) if !cli.print_config => target,
        _ => {
            config.print();
            println!();
            table.print();
            return Ok(ExitCode::SUCCESS);
        }
    };

    let backend = PacmanBackend::detect(&config.pacman)?;
    let reporter = TracingReporter;
    let summary = Orchestrator::new(target, &backend, &reporter)
        .with_filter(cli.filter())
        .with_ignore(config.ignore.clone())
        .with_options(CollectorOptions {
            table,
            log_level: config.log_level,
        })
        .run()?;
    summary.print();

    Ok(ExitCode::from(summary.exit_code() as u8))
}

/// Diagnostics go to stderr.
///
/// `level` is the threshold. Collector diagnostics above it are dropped before
/// they reach tracing, so RUST_LOG can hide more of them but never show more.
fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_filters() {
        let cli = Cli::try_parse_from([
            "pkgtree",
            "/tmp/out",
            "--pacman-arg",
            "-e",
            "--pacman-arg=--native",
            "--only",
            "bash",
            "zsh",
        ])
        .unwrap();

        assert_eq!(cli.target, Some(PathBuf::from("/tmp/out")));
        let filter = cli.filter();
        assert_eq!(filter.only, vec!["bash", "zsh"]);
        assert_eq!(filter.extra_args, vec!["-e", "--native"]);
    }

    #[test]
    fn test_target_required_unless_print_config() {
        assert!(Cli::try_parse_from(["pkgtree"]).is_err());
        let cli = Cli::try_parse_from(["pkgtree", "--print-config"]).unwrap();
        assert!(cli.print_config);
        assert!(cli.target.is_none());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "pkgtree",
            "/tmp/out",
            "--ignore",
            "base",
            "--log-level",
            "warn",
            "--remap",
            "table.json",
        ])
        .unwrap();

        let config = cli.apply(Config::default());
        assert_eq!(config.ignore, vec!["base"]);
        assert_eq!(config.log_level, LevelFilter::WARN);
        assert_eq!(config.remap, Some(PathBuf::from("table.json")));
        assert_eq!(config.pacman, "pacman");
    }
}
