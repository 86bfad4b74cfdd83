//! # Module Discovery
//!
//! Recursive scan of the module root for source files.
//!
//! The result is sorted component-wise (`a/b.py` before `a.b/c.py`) after the
//! walk, so ordering never depends on the host's `read_dir` order.
//! Symlinked directories are not followed; symlinked files are kept.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::build::BuildError;

/// A source file found below the module root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    /// Canonical path of the file as discovered.
    pub path: PathBuf,
    /// `path` relative to the distribution root.
    pub relative: PathBuf,
}

fn discovery_error(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
    move |source| BuildError::Discovery {
        path: path.to_path_buf(),
        source,
    }
}

/// Collects every file under `module_root` whose extension is `extension`,
/// sorted, with paths made relative to `dist_root`.
pub fn discover(
    module_root: &Path,
    dist_root: &Path,
    extension: &str,
) -> Result<Vec<ModuleFile>, BuildError> {
    let module_root = fs::canonicalize(module_root).map_err(discovery_error(module_root))?;
    let dist_root = fs::canonicalize(dist_root).map_err(discovery_error(dist_root))?;

    let mut paths = Vec::new();
    walk(&module_root, extension, &mut paths)?;
    sort_paths(&mut paths);
    debug!(
        "Discovered {} .{} files under {}",
        paths.len(),
        extension,
        module_root.display()
    );

    paths
        .into_iter()
        .map(|path| {
            let relative = path
                .strip_prefix(&dist_root)
                .map_err(|_| BuildError::OutsideRoot {
                    path: path.clone(),
                    root: dist_root.clone(),
                })?
                .to_path_buf();
            Ok(ModuleFile { path, relative })
        })
        .collect()
}

fn walk(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<(), BuildError> {
    for entry in fs::read_dir(dir).map_err(discovery_error(dir))? {
        let entry = entry.map_err(discovery_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(discovery_error(&path))?;

        if file_type.is_dir() {
            walk(&path, extension, out)?;
        } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
            && path.extension().is_some_and(|ext| ext == extension)
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Sorts by path components, the order builds are reproducible against.
pub fn sort_paths(paths: &mut [PathBuf]) {
    // `Path`'s `Ord` compares component by component, unlike string order
    // where '.' (0x2E) sorts before '/' (0x2F).
    paths.sort();
}
