//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading a page corpus from a local directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::storage::{DirEntry, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a corpus directory.
///
/// All corpus paths resolve relative to the root; paths containing parent
/// directory components are rejected.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use graft_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("pages"));
/// let html = storage.read("index.html")?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory of the corpus.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage.
    ///
    /// # Arguments
    ///
    /// * `root` - Root directory containing the page files
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Validate that a path doesn't escape the root directory.
    ///
    /// Rejects paths containing parent directory components (`..`) to prevent
    /// path traversal (e.g., `../../../etc/passwd`).
    fn validate_path(path: &str) -> Result<(), StorageError> {
        let has_parent_dir = Path::new(path)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));

        if has_parent_dir {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    /// Resolve a corpus path against the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        Self::validate_path(path)?;
        Ok(self.root.join(path))
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full)
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(path))).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|full| full.is_file())
    }

    fn mtime(&self, path: &str) -> Result<i64, StorageError> {
        let full = self.resolve(path)?;
        let modified = fs::metadata(&full)
            .and_then(|m| m.modified())
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(path))).with_backend(BACKEND))?;
        let secs = modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
        Ok(secs)
    }

    fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StorageError> {
        let full = self.resolve(dir)?;
        let entries = fs::read_dir(&full)
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(dir))).with_backend(BACKEND))?;

        let mut listing: Vec<DirEntry> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                // Skip hidden files and directories
                if name.starts_with('.') {
                    return None;
                }
                let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
                Some(DirEntry { name, is_dir })
            })
            .collect();

        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }
}
