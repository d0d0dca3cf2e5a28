//! Template composition and custom element expansion.
//!
//! This crate turns page files into finished documents:
//! - [`PageComposer`]: merges a page into its layout and runs the pipeline
//! - [`PageMeta`]: page metadata extracted from `<meta>` tags
//! - [`ElementHandler`]: pluggable expansion of custom elements
//!
//! Composition loads the page, loads the layout its `cms:template` meta
//! names, merges head into head and body into the layout's content slot,
//! expands custom elements to fixpoint, and resolves placement directives
//! like `append-to` afterwards.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use graft_renderer::{ComposerConfig, PageComposer};
//! use graft_storage::FsStorage;
//!
//! let pages = Arc::new(FsStorage::new(PathBuf::from("pages")));
//! let designs = Arc::new(FsStorage::new(PathBuf::from("designs")));
//! let composer = PageComposer::new(pages, designs).with_config(ComposerConfig {
//!     locale: Some("cs-CZ".to_owned()),
//!     ..ComposerConfig::default()
//! });
//!
//! let result = composer.compose("products/index.html")?;
//! let html = graft_dom::serialize(&result.document);
//! # Ok(())
//! # }
//! ```

mod composer;
mod error;
mod expand;
mod handler;
mod handlers;
mod loader;
mod merge;
mod meta;
mod reshuffle;

pub use composer::{ComposeResult, ComposerConfig, PageComposer};
pub use error::RenderError;
pub use expand::{ElementExpander, ExpansionReport, MAX_EXPANSION_PASSES};
pub use handler::{
    ElementHandler, Expansion, ExpansionRequest, EVENT_PREFIX, HandlerRegistry, event_name,
};
pub use handlers::{IncludeHandler, VarsHandler};
pub use loader::{Substitutions, load_document};
pub use merge::merge_children;
pub use meta::{PageMeta, RIGHT_NOT_IMPLEMENTED, normalize_name};
pub use reshuffle::reshuffle;
