//! Error types for the site tree index.

use std::path::PathBuf;

use graft_storage::StorageError;

/// Error from tree building or cache persistence.
///
/// A stale or corrupt cache file is not an error: it is treated as a miss
/// and the tree is rebuilt. Only an unreadable corpus or an unwritable
/// cache stops a query.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// A page file could not be read while building the tree.
    #[error("storage error")]
    Storage(#[from] StorageError),

    /// A rebuilt tree could not be persisted to its cache file.
    #[error("failed to write tree cache {path}")]
    CacheWrite {
        /// Cache file the write was aimed at.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}
