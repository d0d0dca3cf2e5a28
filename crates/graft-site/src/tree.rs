//! Cached page tree index.
//!
//! The tree answers breadcrumb queries from a per-locale cache file and
//! detects edits lazily: only the records a query actually surfaces are
//! compared against live file mtimes. One mismatch anywhere invalidates
//! every cached locale, because an edit to a shared page changes all of
//! them.

use std::path::PathBuf;
use std::sync::Arc;

use graft_storage::Storage;

use crate::builder::build_tree;
use crate::cache::{FileTreeCache, NullTreeCache, TreeCache};
use crate::error::SiteError;
use crate::record::{PageRecord, segments};

/// Page tree index over one corpus storage.
pub struct PageTree {
    storage: Arc<dyn Storage>,
    cache: Box<dyn TreeCache>,
}

impl PageTree {
    /// Index the corpus in `storage`, caching built trees under
    /// `cache_dir`. `None` disables caching; every query then walks the
    /// corpus.
    pub fn new(storage: Arc<dyn Storage>, cache_dir: Option<PathBuf>) -> Self {
        let cache: Box<dyn TreeCache> = match cache_dir {
            Some(dir) => Box::new(FileTreeCache::new(dir)),
            None => Box::new(NullTreeCache),
        };
        Self { storage, cache }
    }

    /// Root record for a locale, from cache when possible.
    ///
    /// The cached tree is served as stored; staleness is only checked by
    /// [`PageTree::breadcrumbs`] for the records it visits.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Storage`] when a rebuild cannot read a page and
    /// [`SiteError::CacheWrite`] when the rebuilt tree cannot be persisted.
    pub fn load(&self, locale: Option<&str>) -> Result<PageRecord, SiteError> {
        if let Some(root) = self.cache.load(locale) {
            return Ok(root);
        }
        self.rebuild(locale)
    }

    /// Breadcrumb trail for a URL path, shallowest first, root excluded.
    ///
    /// The root and every child enumerated while matching segments are
    /// checked against live mtimes. Any mismatch flushes the whole cache,
    /// rebuilds for this query, and answers from the fresh tree.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PageTree::load`].
    pub fn breadcrumbs(
        &self,
        locale: Option<&str>,
        url_path: &str,
    ) -> Result<Vec<PageRecord>, SiteError> {
        let root = self.load(locale)?;
        if let Some(trail) = self.fresh_trail(&root, url_path) {
            return Ok(trail);
        }

        tracing::info!("Page tree cache is stale, rebuilding");
        self.cache.flush();
        let root = self.rebuild(locale)?;
        Ok(root.breadcrumbs(url_path).into_iter().cloned().collect())
    }

    /// Drop every cached locale; returns the number of files removed.
    pub fn flush_cache(&self) -> usize {
        self.cache.flush()
    }

    fn rebuild(&self, locale: Option<&str>) -> Result<PageRecord, SiteError> {
        tracing::info!(locale = locale.unwrap_or("C"), "Building page tree index");
        let root = build_tree(self.storage.as_ref(), locale)?;
        self.cache.store(locale, &root)?;
        Ok(root)
    }

    /// Walk the trail, staleness-checking every record surfaced on the way.
    /// `None` means a stale record turned up and the tree must be rebuilt.
    fn fresh_trail(&self, root: &PageRecord, url_path: &str) -> Option<Vec<PageRecord>> {
        if self.is_stale(root) {
            return None;
        }
        let mut trail = Vec::new();
        let mut node = root;
        for segment in segments(url_path) {
            for child in &node.children {
                if self.is_stale(child) {
                    return None;
                }
            }
            let Some(child) = node.child(segment) else {
                break;
            };
            trail.push(child.clone());
            node = child;
        }
        Some(trail)
    }

    fn is_stale(&self, record: &PageRecord) -> bool {
        let live = self.storage.mtime(&record.path).unwrap_or(0);
        if live == record.modified {
            return false;
        }
        tracing::info!(path = %record.path, "Page changed since index build");
        true
    }
}
