//! # Reference Tree Builder
//!
//! One build = discover → translate → stub + nav entry per module → nav index.
//!
//! ```text
//! discover(module_root)          sorted ModuleFiles
//!     │
//!     ├─ translate()  ── Skip ──▶ (nothing)
//!     │      │
//!     │     Page
//!     │      ├──▶ nav.insert(parts, doc_path)
//!     │      ├──▶ sink.write(doc_path, "::: pkg.mod\n")
//!     │      └──▶ sink.set_edit_path(doc_path, source)
//!     ▼
//! sink.write(SUMMARY.md, nav.build_literate_nav())
//! ```
//!
//! The navigation tree is local to each `build()` call, so building twice in
//! one process yields identical output.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::core::config::ResolvedConfig;
use crate::core::discover::{ModuleFile, discover};
use crate::core::nav::{NavError, NavigationTree};
use crate::core::translate::{ModulePage, Translation, translate};
use crate::output::sink::posix;
use crate::output::sinks::disk::markdown_files;
use crate::output::{MemorySink, OutputError, OutputSink};

/// Everything that can abort a build. All variants are fatal.
#[derive(Debug)]
pub enum BuildError {
    /// Module root missing or unreadable, or a directory below it unreadable.
    Discovery { path: PathBuf, source: io::Error },
    /// A discovered file does not lie below the distribution root.
    OutsideRoot { path: PathBuf, root: PathBuf },
    /// A module translated to an empty navigation key.
    EmptyModulePath(PathBuf),
    /// Two modules produced the same navigation key (strict mode only).
    DuplicateKey {
        identifier: String,
        previous: String,
        current: String,
    },
    /// The output sink refused a write.
    Output(OutputError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Discovery { path, source } => {
                write!(f, "cannot scan {}: {source}", path.display())
            }
            BuildError::OutsideRoot { path, root } => write!(
                f,
                "{} is not below the distribution root {}",
                path.display(),
                root.display()
            ),
            BuildError::EmptyModulePath(path) => {
                write!(f, "{} has no module path", path.display())
            }
            BuildError::DuplicateKey {
                identifier,
                previous,
                current,
            } => write!(
                f,
                "navigation key `{identifier}` registered twice ({previous}, then {current})"
            ),
            BuildError::Output(e) => write!(f, "output error: {e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Discovery { source, .. } => Some(source),
            BuildError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OutputError> for BuildError {
    fn from(e: OutputError) -> Self {
        BuildError::Output(e)
    }
}

/// Counters for one build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub discovered: usize,
    pub stubs: usize,
    /// Entry-point modules that got no page.
    pub skipped: usize,
    pub nav_entries: usize,
    /// Navigation keys replaced by a later module (last write wins).
    pub overwritten: usize,
}

pub struct ReferenceBuilder<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> ReferenceBuilder<'a> {
    pub fn new(config: &'a ResolvedConfig) -> Self {
        Self { config }
    }

    /// Runs a full build into `sink`.
    pub fn build(&self, sink: &mut dyn OutputSink) -> Result<BuildReport, BuildError> {
        let config = self.config;
        let files = discover(&config.module_root, &config.dist_root, &config.extension)?;

        let mut nav = NavigationTree::new();
        let mut report = BuildReport {
            discovered: files.len(),
            ..Default::default()
        };

        for file in &files {
            debug!("Module file = {}", file.path.display());
            match translate(&file.relative, &config.conventions) {
                Translation::Skip => {
                    debug!("Skipping entry point {}", file.relative.display());
                    report.skipped += 1;
                }
                Translation::Page(page) => {
                    self.emit(file, &page, &mut nav, sink, &mut report)?;
                }
            }
        }

        let summary = nav.build_literate_nav(config.nav_indent);
        sink.write(&config.summary, &summary)?;
        sink.finish()?;

        report.nav_entries = nav.len();
        info!(
            "Generated {} reference pages ({} skipped) into {} sink",
            report.stubs,
            report.skipped,
            sink.name()
        );
        Ok(report)
    }

    fn emit(
        &self,
        file: &ModuleFile,
        page: &ModulePage,
        nav: &mut NavigationTree,
        sink: &mut dyn OutputSink,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let identifier = page.identifier();
        let doc_link = posix(&page.doc_path);
        debug!(
            "Module path = {identifier}, doc path = {doc_link}, parts = {:?}",
            page.parts
        );

        let previous = nav
            .insert(page.nav_key(), doc_link.clone())
            .map_err(|NavError::EmptyKey| BuildError::EmptyModulePath(file.path.clone()))?;
        if let Some(previous) = previous {
            if self.config.strict {
                return Err(BuildError::DuplicateKey {
                    identifier,
                    previous,
                    current: doc_link,
                });
            }
            warn!("Navigation entry `{identifier}` ({previous}) replaced by {doc_link}");
            report.overwritten += 1;
        }

        let stub = format!("{} {}\n", self.config.marker, identifier);
        sink.write(&page.doc_path, &stub)?;
        sink.set_edit_path(&page.doc_path, &file.path)?;
        report.stubs += 1;
        Ok(())
    }
}

/// Builds into a fresh in-memory sink.
pub fn build_in_memory(config: &ResolvedConfig) -> Result<(MemorySink, BuildReport), BuildError> {
    let mut sink = MemorySink::new();
    let report = ReferenceBuilder::new(config).build(&mut sink)?;
    Ok((sink, report))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Missing,
    Changed,
    /// A page on disk that the current module tree no longer produces.
    Extra,
}

/// A generated file whose on-disk copy is out of date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFile {
    pub path: PathBuf,
    pub staleness: Staleness,
}

/// Builds in memory and compares every generated file with its copy under
/// `config.out_dir`, then flags `.md` files there that the build would not
/// produce. An empty result means the reference tree is current.
pub fn check(config: &ResolvedConfig) -> Result<Vec<StaleFile>, BuildError> {
    let (sink, _) = build_in_memory(config)?;
    let mut stale = Vec::new();
    for (path, expected) in sink.files() {
        let staleness = match read_existing(&config.out_dir.join(path))? {
            None => Some(Staleness::Missing),
            Some(actual) if actual != *expected => Some(Staleness::Changed),
            Some(_) => None,
        };
        if let Some(staleness) = staleness {
            debug!("{} is {:?}", path.display(), staleness);
            stale.push(StaleFile {
                path: path.clone(),
                staleness,
            });
        }
    }
    for path in markdown_files(&config.out_dir)? {
        if sink.get(&path).is_none() {
            debug!("{} is {:?}", path.display(), Staleness::Extra);
            stale.push(StaleFile {
                path,
                staleness: Staleness::Extra,
            });
        }
    }
    Ok(stale)
}

fn read_existing(path: &Path) -> Result<Option<String>, BuildError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(BuildError::Discovery {
            path: path.to_path_buf(),
            source,
        }),
    }
}
