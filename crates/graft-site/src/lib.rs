//! Page tree indexing and navigation rendering.
//!
//! This crate maintains the site-wide view of a page corpus:
//! - [`PageTree`]: cached tree of [`PageRecord`]s with breadcrumb queries
//! - [`MenuRenderer`]: expansion handler turning `<cms-menu>` elements
//!   into `<menu>` lists
//!
//! The tree is built by scanning the corpus for `.html` files, ordering
//! siblings by their `cms.priority` meta tag, and is persisted per locale
//! as a JSON cache file. Queries check the records they visit against live
//! file mtimes and rebuild the whole tree when an edit is detected.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use graft_site::{MenuRenderer, PageTree};
//! use graft_storage::{FsStorage, Storage};
//!
//! let pages: Arc<dyn Storage> = Arc::new(FsStorage::new(PathBuf::from("pages")));
//! let tree = Arc::new(PageTree::new(pages, Some(PathBuf::from("cache"))));
//!
//! for record in tree.breadcrumbs(None, "/products/phones")? {
//!     println!("{} {}", record.url_path, record.title);
//! }
//!
//! let menu = MenuRenderer::new(Arc::clone(&tree), "/products/phones");
//! # let _ = menu;
//! # Ok(())
//! # }
//! ```

mod builder;
mod cache;
mod error;
mod menu;
mod record;
mod tree;

pub use cache::{FileTreeCache, NullTreeCache, TreeCache};
pub use error::SiteError;
pub use menu::MenuRenderer;
pub use record::{PageRecord, Visibility};
pub use tree::PageTree;
