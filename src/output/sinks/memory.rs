//! # In-Memory Sink
//!
//! Generated documents that only exist for the lifetime of the process.
//! Used for `--dry-run`, `--check`, and tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::output::sink::{OutputError, OutputSink};

#[derive(Debug, Default)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, String>,
    /// Paths in the order they were written.
    order: Vec<PathBuf>,
    edit_paths: BTreeMap<PathBuf, PathBuf>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of a generated document, if it was written.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Every written path, in write order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.order
    }

    /// All documents, sorted by path.
    pub fn files(&self) -> &BTreeMap<PathBuf, String> {
        &self.files
    }

    pub fn edit_path(&self, doc_path: impl AsRef<Path>) -> Option<&Path> {
        self.edit_paths.get(doc_path.as_ref()).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), OutputError> {
        if self.files.contains_key(path) {
            return Err(OutputError::AlreadyWritten(path.to_path_buf()));
        }
        self.files.insert(path.to_path_buf(), contents.to_string());
        self.order.push(path.to_path_buf());
        Ok(())
    }

    fn set_edit_path(&mut self, doc_path: &Path, source: &Path) -> Result<(), OutputError> {
        self.edit_paths
            .insert(doc_path.to_path_buf(), source.to_path_buf());
        Ok(())
    }
}
