//! pkgtree library.
//!
//! Mirrors the files owned by installed packages as per-package symlink trees:
//! - `collector` - builds the tree of one package from its owned-path listing
//! - `orchestrator` - runs one collector per installed package
//! - `remap` - which system directories get friendlier names
//! - `backend` - package-manager queries (pacman, in-memory)

pub mod backend;
pub mod collector;
pub mod config;
pub mod orchestrator;
pub mod process;
pub mod remap;
pub mod report;
pub mod timing;
