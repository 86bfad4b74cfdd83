//! # Path Translator
//!
//! Maps one discovered module file to the page that documents it.
//!
//! ```text
//! pkg/sub/name.py      →  ::: pkg.sub.name   pkg/sub/name.md    [pkg, sub, name]
//! pkg/sub/__init__.py  →  ::: pkg.sub        pkg/sub/index.md   [pkg, sub]
//! pkg/__main__.py      →  (skipped)
//! ```
//!
//! Pure computation: no filesystem access, no logging.

use std::path::{Path, PathBuf};

/// File-naming rules of the documented language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConventions {
    /// Stem of the module that turns a directory into a package.
    pub init_stem: String,
    /// Stem of the package entry-point module, which gets no page.
    pub main_stem: String,
    /// File name a package's own page is written to.
    pub index_name: String,
}

pub const DEFAULT_INIT_STEM: &str = "__init__";
pub const DEFAULT_MAIN_STEM: &str = "__main__";
pub const DEFAULT_INDEX_NAME: &str = "index.md";

impl Default for ModuleConventions {
    fn default() -> Self {
        Self {
            init_stem: DEFAULT_INIT_STEM.to_string(),
            main_stem: DEFAULT_MAIN_STEM.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
        }
    }
}

/// A module that gets a reference page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePage {
    /// Identifier segments, root to leaf. Doubles as the navigation key.
    pub parts: Vec<String>,
    /// Output path relative to the reference root.
    pub doc_path: PathBuf,
}

impl ModulePage {
    /// Dotted import identifier, e.g. `pkg.sub.name`.
    pub fn identifier(&self) -> String {
        self.parts.join(".")
    }

    pub fn nav_key(&self) -> &[String] {
        &self.parts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Page(ModulePage),
    /// Package entry point: no stub, no navigation entry.
    Skip,
}

/// Translates a module path relative to the distribution root.
///
/// The caller guarantees `relative` is a file path with a source extension;
/// anything else is a precondition violation and yields an unspecified page.
pub fn translate(relative: &Path, conventions: &ModuleConventions) -> Translation {
    let module_path = relative.with_extension("");
    let mut doc_path = relative.with_extension("md");

    let mut parts: Vec<String> = module_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let last = parts.last().cloned().unwrap_or_default();
    if last == conventions.init_stem {
        parts.pop();
        doc_path.set_file_name(&conventions.index_name);
    } else if last == conventions.main_stem {
        return Translation::Skip;
    }

    Translation::Page(ModulePage { parts, doc_path })
}
