//! pacman backend.
//!
//! - `pacman -Qq [ARGS...] [NAMES...]` lists installed packages
//! - `pacman -Qlq NAME` lists the paths a package owns, directories with a
//!   trailing `/` and always before their contents

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;

use super::{split_lines, PackageBackend, PackageFilter};
use crate::process::Cmd;

/// Default executable name.
pub const PACMAN: &str = "pacman";

/// Queries the local pacman database.
#[derive(Debug, Clone)]
pub struct PacmanBackend {
    program: PathBuf,
}

impl PacmanBackend {
    /// Use `program` without checking that it exists.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `program` on PATH, failing early with an install hint.
    pub fn detect(program: &str) -> Result<Self> {
        let resolved = which::which(program).with_context(|| {
            format!(
                "'{}' not found in PATH.\n\
                 pkgtree reads the pacman database; run it on an Arch-based system\n\
                 or point PKGTREE_PACMAN at the pacman executable.",
                program
            )
        })?;
        Ok(Self::new(resolved))
    }

    fn cmd(&self) -> Cmd {
        Cmd::new(self.program.to_string_lossy())
    }

    /// Arguments for the package listing query.
    pub fn package_query_args(filter: &PackageFilter) -> Vec<String> {
        let mut args = vec!["-Qq".to_string()];
        args.extend(filter.extra_args.iter().cloned());
        args.extend(filter.only.iter().cloned());
        args
    }
}

impl PackageBackend for PacmanBackend {
    fn list_packages(&self, filter: &PackageFilter) -> Result<Vec<String>> {
        let result = self
            .cmd()
            .args(Self::package_query_args(filter))
            .error_msg("Listing installed packages failed")
            .run()?;
        // package names are plain ASCII
        Ok(split_lines(&result.stdout)
            .into_iter()
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    fn list_owned_paths(&self, package: &str) -> Result<Vec<OsString>> {
        let result = self
            .cmd()
            .args(["-Qlq", package])
            .error_msg(format!("Listing files of '{}' failed", package))
            .run()?;
        Ok(split_lines(&result.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_query_args_order() {
        let filter = PackageFilter {
            only: vec!["bash".to_string(), "zsh".to_string()],
            extra_args: vec!["--explicit".to_string()],
        };
        assert_eq!(
            PacmanBackend::package_query_args(&filter),
            vec!["-Qq", "--explicit", "bash", "zsh"]
        );
    }

    #[test]
    fn test_detect_missing_program() {
        let err = PacmanBackend::detect("nonexistent_pacman_12345").unwrap_err();
        assert!(err.to_string().contains("not found in PATH"));
    }

    #[test]
    fn test_nonzero_exit_is_fatal() {
        // `false` ignores its arguments and exits 1
        let backend = PacmanBackend::new("false");
        let err = backend.list_owned_paths("bash").unwrap_err();
        assert!(err.to_string().contains("Listing files of 'bash' failed"));
    }

    #[test]
    fn test_output_keeps_terminator() {
        // `echo -Qlq bash` prints its arguments and a newline
        let backend = PacmanBackend::new("echo");
        let paths = backend.list_owned_paths("bash").unwrap();
        assert_eq!(paths, vec![OsString::from("-Qlq bash"), OsString::new()]);
    }
}
