//! # Disk Sink
//!
//! Writes generated documents under a reference output directory.
//!
//! Every file goes through `.tmp` + `rename()` so an aborted build never
//! leaves a half-written stub behind. Edit-path associations are buffered and
//! written as a sorted JSON manifest in `finish()`, if a manifest path is set.
//!
//! The reference root belongs to the build: `finish()` also deletes every
//! `.md` file below it that this build did not write, so pages of removed or
//! renamed modules disappear with them.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::output::sink::{OutputError, OutputSink, posix};

pub struct DiskSink {
    root: PathBuf,
    manifest: Option<PathBuf>,
    written: HashSet<PathBuf>,
    edit_paths: BTreeMap<String, String>,
}

impl DiskSink {
    /// Creates a sink rooted at `root`. Nothing touches the disk until the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: None,
            written: HashSet::new(),
            edit_paths: BTreeMap::new(),
        }
    }

    /// Also write the edit-path manifest to `path` (absolute, or relative to
    /// the working directory) when the build finishes.
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Every `.md` file below `root`, relative to it and sorted. A missing root
/// has none. Symlinked directories are not followed.
pub fn markdown_files(root: &Path) -> Result<Vec<PathBuf>, OutputError> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), OutputError> {
        for entry in fs::read_dir(dir).map_err(io_error(dir))? {
            let entry = entry.map_err(io_error(dir))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(io_error(&path))?;
            if file_type.is_dir() {
                walk(root, &path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "md")
                && let Ok(relative) = path.strip_prefix(root)
            {
                out.push(relative.to_path_buf());
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    if root.is_dir() {
        walk(root, root, &mut files)?;
    }
    files.sort();
    Ok(files)
}

/// Removes now-empty directories between `file` and `root`, innermost first.
fn remove_empty_parents(root: &Path, file: &Path) {
    let mut dir = file.parent();
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) || fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

/// Atomically write `contents` to `path`, creating parent directories.
fn atomic_write(path: &Path, contents: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).map_err(io_error(path))?;
    fs::rename(&tmp_path, path).map_err(io_error(path))?;
    Ok(())
}

impl OutputSink for DiskSink {
    fn name(&self) -> &str {
        "disk"
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), OutputError> {
        if self.written.contains(path) {
            return Err(OutputError::AlreadyWritten(path.to_path_buf()));
        }
        let full = self.root.join(path);
        debug!("Writing {}", full.display());
        atomic_write(&full, contents)?;
        self.written.insert(path.to_path_buf());
        Ok(())
    }

    fn set_edit_path(&mut self, doc_path: &Path, source: &Path) -> Result<(), OutputError> {
        self.edit_paths.insert(posix(doc_path), posix(source));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        if let Some(manifest) = &self.manifest {
            let json = serde_json::to_string_pretty(&self.edit_paths)
                .map_err(OutputError::Manifest)?;
            debug!(
                "Writing edit manifest with {} entries to {}",
                self.edit_paths.len(),
                manifest.display()
            );
            atomic_write(manifest, &(json + "\n"))?;
        }
        self.prune()
    }
}

impl DiskSink {
    /// Deletes `.md` files under the root that were not written this build.
    fn prune(&self) -> Result<(), OutputError> {
        let mut removed = 0;
        for relative in markdown_files(&self.root)? {
            if self.written.contains(&relative) {
                continue;
            }
            let full = self.root.join(&relative);
            debug!("Removing stale {}", full.display());
            fs::remove_file(&full).map_err(io_error(&full))?;
            remove_empty_parents(&self.root, &full);
            removed += 1;
        }
        if removed > 0 {
            info!("Removed {removed} stale reference page(s) from {}", self.root.display());
        }
        Ok(())
    }
}
