//! # Core Reference Planning
//!
//! Decides which reference pages exist and how they are linked. It never
//! parses source code; the rendering plugin expands each stub later.
//!
//! ```text
//!   module root ──▶ discover ──▶ translate ──▶ build ──▶ OutputSink
//!                  (sorted)     (per file)    (stubs +     (memory /
//!                                              nav tree)    disk)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: layered settings collapsed into a `ResolvedConfig`
//! - [`discover`]: the sorted recursive scan
//! - [`translate`]: module file → identifier, doc path, nav key
//! - [`nav`]: the ordered navigation trie and its literate serializer
//! - [`build`]: the orchestrating build and the stale-output check

pub mod build;
pub mod config;
pub mod discover;
pub mod nav;
pub mod translate;
