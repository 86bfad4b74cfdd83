//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `refgen.toml` in the working directory unless `--config`
//! points elsewhere. Every field is optional; `refgen --init-config` writes a
//! commented-out default so users can discover all options.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::translate::{
    DEFAULT_INDEX_NAME, DEFAULT_INIT_STEM, DEFAULT_MAIN_STEM, ModuleConventions,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RefgenConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub modules: ModulesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PathsConfig {
    pub dist_root: Option<String>,
    pub module_root: Option<String>,
    pub out_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ModulesConfig {
    pub extension: Option<String>,
    pub init_stem: Option<String>,
    pub main_stem: Option<String>,
    pub index_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub marker: Option<String>,
    pub summary: Option<String>,
    pub nav_indent: Option<usize>,
    pub strict: Option<bool>,
    pub edit_manifest: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_CONFIG_FILE: &str = "refgen.toml";
pub const DEFAULT_DIST_ROOT: &str = ".";
pub const DEFAULT_OUT_DIR: &str = "docs/reference";
pub const DEFAULT_EXTENSION: &str = "py";
pub const DEFAULT_MARKER: &str = ":::";
pub const DEFAULT_SUMMARY: &str = "SUMMARY.md";

const DEFAULT_CONFIG_CONTENT: &str = r#"# refgen configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [paths]
# dist_root = "."                    # Module identifiers are relative to this (REFGEN_DIST_ROOT)
# module_root = "./mypackage"        # Directory that is scanned (REFGEN_MODULE_ROOT)
# out_dir = "docs/reference"         # Reference root: stubs and SUMMARY.md (REFGEN_OUT_DIR)

# [modules]
# extension = "py"
# init_stem = "__init__"             # Rendered as the package's index page
# main_stem = "__main__"             # Never documented
# index_name = "index.md"

# [output]
# marker = ":::"                     # Stub line is "<marker> <module.identifier>"
# summary = "SUMMARY.md"
# nav_indent = 0
# strict = false                     # Fail when two modules share a navigation key
# edit_manifest = "docs/reference/edit_paths.json"
"#;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub dist_root: PathBuf,
    pub module_root: PathBuf,
    pub out_dir: PathBuf,
    pub extension: String,
    pub conventions: ModuleConventions,
    pub marker: String,
    /// Navigation index path, relative to `out_dir`.
    pub summary: PathBuf,
    pub nav_indent: usize,
    pub strict: bool,
    pub edit_manifest: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&RefgenConfig::default(), &CliOverrides::default(), |_| None)
    }
}

/// Values given on the command line. `None`/`false` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub dist_root: Option<PathBuf>,
    pub module_root: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub strict: bool,
    pub edit_manifest: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "config I/O error ({}): {e}", path.display()),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load config from `explicit`, or from `refgen.toml` in the working directory.
///
/// A missing default file yields `RefgenConfig::default()`; a missing
/// explicitly requested file is an error. A malformed file returns
/// `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<RefgenConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(RefgenConfig::default());
            }
            default
        }
    };

    let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
    let config: RefgenConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Writes a commented-out default config to `path` unless one already exists.
/// Returns whether a file was written.
pub fn generate_default_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
    }
    fs::write(path, DEFAULT_CONFIG_CONTENT).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    Ok(true)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RefgenConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

fn resolve_with(
    config: &RefgenConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Path: CLI → env → config → default
    let path_setting = |cli_value: &Option<PathBuf>, var: &str, file_value: &Option<String>| {
        cli_value
            .clone()
            .or_else(|| env(var).map(PathBuf::from))
            .or_else(|| file_value.as_ref().map(PathBuf::from))
    };

    let dist_root = path_setting(&cli.dist_root, "REFGEN_DIST_ROOT", &config.paths.dist_root)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_ROOT));

    // Without an explicit module root the whole distribution is scanned.
    let module_root = path_setting(
        &cli.module_root,
        "REFGEN_MODULE_ROOT",
        &config.paths.module_root,
    )
    .unwrap_or_else(|| dist_root.clone());

    let out_dir = path_setting(&cli.out_dir, "REFGEN_OUT_DIR", &config.paths.out_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    let modules = &config.modules;
    let conventions = ModuleConventions {
        init_stem: modules
            .init_stem
            .clone()
            .unwrap_or_else(|| DEFAULT_INIT_STEM.to_string()),
        main_stem: modules
            .main_stem
            .clone()
            .unwrap_or_else(|| DEFAULT_MAIN_STEM.to_string()),
        index_name: modules
            .index_name
            .clone()
            .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
    };

    let output = &config.output;
    ResolvedConfig {
        dist_root,
        module_root,
        out_dir,
        extension: modules
            .extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        conventions,
        marker: output
            .marker
            .clone()
            .unwrap_or_else(|| DEFAULT_MARKER.to_string()),
        summary: PathBuf::from(output.summary.as_deref().unwrap_or(DEFAULT_SUMMARY)),
        nav_indent: output.nav_indent.unwrap_or(0),
        strict: cli.strict || output.strict.unwrap_or(false),
        edit_manifest: cli
            .edit_manifest
            .clone()
            .or_else(|| output.edit_manifest.as_ref().map(PathBuf::from)),
    }
}
