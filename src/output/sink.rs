use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Errors raised while handing generated files to an output sink.
/// None of these are recoverable: the build aborts on the first one.
#[derive(Debug)]
pub enum OutputError {
    /// Filesystem failure while creating or writing `path`.
    Io { path: PathBuf, source: io::Error },
    /// The same destination was opened twice in one build.
    AlreadyWritten(PathBuf),
    /// Edit-path manifest could not be serialized.
    Manifest(serde_json::Error),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Io { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            OutputError::AlreadyWritten(path) => {
                write!(f, "{} was already written in this build", path.display())
            }
            OutputError::Manifest(e) => write!(f, "edit manifest error: {e}"),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io { source, .. } => Some(source),
            OutputError::Manifest(e) => Some(e),
            OutputError::AlreadyWritten(_) => None,
        }
    }
}

/// Where generated documents go.
///
/// All paths handed to a sink are relative to the reference root (the
/// directory that holds the navigation index). Implementations decide
/// whether the files land on disk or only exist for the current process.
pub trait OutputSink {
    /// Returns a short name for log lines.
    fn name(&self) -> &str;

    /// Writes one complete document. Each path is written at most once.
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), OutputError>;

    /// Associates a generated document with the source file it documents,
    /// for "edit this page" links.
    fn set_edit_path(&mut self, doc_path: &Path, source: &Path) -> Result<(), OutputError>;

    /// Flushes anything buffered. Called once, after the navigation index.
    fn finish(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Renders a path with forward slashes regardless of host. A root or drive
/// prefix is emitted once, never followed by a doubled separator.
pub fn posix(path: &Path) -> String {
    let mut out = String::new();
    let mut needs_separator = false;
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                out.push_str(&prefix.as_os_str().to_string_lossy());
                needs_separator = false;
            }
            Component::RootDir => {
                out.push('/');
                needs_separator = false;
            }
            other => {
                if needs_separator {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
                needs_separator = true;
            }
        }
    }
    out
}
