//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::core::config::ResolvedConfig;

/// Creates a temporary directory holding an empty file at each relative path.
pub fn module_tree(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for file in files {
        let path = dir.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create module dir");
        }
        fs::write(&path, "").expect("create module file");
    }
    dir
}

/// Default config scanning `root/package`, writing to `root/docs/reference`.
pub fn config_for(root: &Path, package: &str) -> ResolvedConfig {
    ResolvedConfig {
        dist_root: root.to_path_buf(),
        module_root: root.join(package),
        out_dir: root.join("docs").join("reference"),
        ..Default::default()
    }
}
