//! refgen library exports
//!
//! Plans API-reference pages for a module tree: one stub per module plus a
//! literate navigation index, handed to an [`OutputSink`].

pub mod core;
pub mod output;

#[cfg(test)]
pub mod test_support;

pub use crate::core::build::{
    BuildError, BuildReport, ReferenceBuilder, StaleFile, Staleness, build_in_memory, check,
};
pub use crate::core::config::{CliOverrides, ConfigError, RefgenConfig, ResolvedConfig};
pub use crate::core::nav::NavigationTree;
pub use crate::core::translate::{ModuleConventions, ModulePage, Translation, translate};
pub use crate::output::{DiskSink, MemorySink, OutputError, OutputSink};
