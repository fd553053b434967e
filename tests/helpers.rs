//! Shared test utilities for pkgtree tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Test environment with a fake filesystem root and an output directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Fake filesystem the owned paths point into
    pub root: PathBuf,
    /// Target directory receiving package trees
    pub target: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with temporary directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("root");
        let target = temp_dir.path().join("target");

        fs::create_dir_all(&root).expect("Failed to create root dir");

        Self {
            _temp_dir: temp_dir,
            root,
            target,
        }
    }

    /// Absolute path of `rel` under the fake root, as a package manager prints it.
    ///
    /// A trailing `/` creates a directory, anything else a small file.
    pub fn owned(&self, rel: &str) -> String {
        let path = format!("{}/{}", self.root.display(), rel);
        if rel.ends_with('/') {
            fs::create_dir_all(&path).expect("Failed to create owned dir");
        } else {
            if let Some(parent) = Path::new(&path).parent() {
                fs::create_dir_all(parent).expect("Failed to create parent dir");
            }
            fs::write(&path, "content\n").expect("Failed to create owned file");
        }
        path
    }

    /// Absolute path of `rel` under the fake root, without creating anything.
    pub fn absent(&self, rel: &str) -> String {
        format!("{}/{}", self.root.display(), rel)
    }

    /// Output path of `rel` inside the target directory.
    pub fn out(&self, rel: &str) -> PathBuf {
        self.target.join(rel)
    }
}

/// Every node below `dir`, relative, with a trailing `/` on directories.
pub fn tree_entries(dir: &Path) -> Vec<String> {
    let mut entries: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .map(|e| e.expect("Failed to walk output tree"))
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(dir)
                .expect("walkdir entry outside root")
                .to_string_lossy()
                .into_owned();
            if e.file_type().is_dir() {
                format!("{}/", rel)
            } else {
                rel
            }
        })
        .collect();
    entries.sort();
    entries
}

/// Assert that a symlink exists and points to the expected target.
pub fn assert_symlink(path: &Path, expected_target: &str) {
    assert!(
        path.is_symlink(),
        "Expected symlink at {}, but it's not a symlink",
        path.display()
    );

    let target = fs::read_link(path).expect("Failed to read symlink");
    assert_eq!(
        target.to_string_lossy(),
        expected_target,
        "Symlink {} points to {:?}, expected {}",
        path.display(),
        target,
        expected_target
    );
}

/// Assert that a directory exists.
pub fn assert_dir_exists(path: &Path) {
    assert!(
        path.is_dir(),
        "Expected directory to exist: {}",
        path.display()
    );
}

/// Assert that nothing at all exists at `path`, not even a dangling link.
pub fn assert_absent(path: &Path) {
    assert!(
        fs::symlink_metadata(path).is_err(),
        "Expected nothing at {}",
        path.display()
    );
}
