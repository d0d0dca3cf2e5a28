//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::{DirEntry, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores file contents and modification times in memory; directory listings
/// are derived from the stored paths. Files without an explicit mtime report
/// `0`. Use the builder methods to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use graft_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("index.html", "<html><body>Home</body></html>")
///     .with_mtime("index.html", 1_700_000_000);
///
/// let html = storage.read("index.html").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<HashMap<String, String>>,
    mtimes: RwLock<HashMap<String, i64>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given corpus path and content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.write().unwrap().insert(path.into(), content.into());
        self
    }

    /// Set the modification time for a path.
    ///
    /// # Arguments
    ///
    /// * `path` - Corpus path of the file
    /// * `mtime` - Modification time as whole seconds since the Unix epoch
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_mtime(self, path: impl Into<String>, mtime: i64) -> Self {
        self.mtimes.write().unwrap().insert(path.into(), mtime);
        self
    }

    /// Overwrite a file in place (post-construction mutation for tests).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn put(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files.write().unwrap().insert(path.into(), content.into());
    }

    /// Update a file's modification time in place.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn touch(&self, path: impl Into<String>, mtime: i64) {
        self.mtimes.write().unwrap().insert(path.into(), mtime);
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        self.files.read().unwrap().get(path).cloned().ok_or_else(|| {
            StorageError::new(StorageErrorKind::NotFound)
                .with_path(path)
                .with_backend(BACKEND)
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    fn mtime(&self, path: &str) -> Result<i64, StorageError> {
        let mtimes = self.mtimes.read().unwrap();
        if let Some(mtime) = mtimes.get(path) {
            return Ok(*mtime);
        }
        if self.exists(path) {
            return Ok(0);
        }
        Err(StorageError::new(StorageErrorKind::NotFound)
            .with_path(path)
            .with_backend(BACKEND))
    }

    fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StorageError> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let files = self.files.read().unwrap();
        let mut seen: HashMap<String, bool> = HashMap::new();
        for path in files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.split_once('/') {
                Some((name, _)) => {
                    seen.insert(name.to_owned(), true);
                }
                None => {
                    seen.entry(rest.to_owned()).or_insert(false);
                }
            }
        }

        if seen.is_empty() && !dir.is_empty() {
            return Err(StorageError::new(StorageErrorKind::NotFound)
                .with_path(dir)
                .with_backend(BACKEND));
        }

        let mut listing: Vec<DirEntry> = seen
            .into_iter()
            .map(|(name, is_dir)| DirEntry { name, is_dir })
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_mock_storage_is_send_sync() {
        assert_send_sync::<MockStorage>();
    }

    #[test]
    fn test_read_and_exists() {
        let storage = MockStorage::new().with_file("index.html", "<html></html>");

        assert_eq!(storage.read("index.html").unwrap(), "<html></html>");
        assert!(storage.exists("index.html"));
        assert!(!storage.exists("missing.html"));
    }

    #[test]
    fn test_read_missing() {
        let storage = MockStorage::new();

        let err = storage.read("missing.html").unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Mock"));
    }

    #[test]
    fn test_mtime_defaults_to_zero() {
        let storage = MockStorage::new().with_file("index.html", "x");

        assert_eq!(storage.mtime("index.html").unwrap(), 0);
    }

    #[test]
    fn test_mtime_configured() {
        let storage = MockStorage::new()
            .with_file("index.html", "x")
            .with_mtime("index.html", 1_700_000_000);

        assert_eq!(storage.mtime("index.html").unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_touch_changes_mtime() {
        let storage = MockStorage::new()
            .with_file("index.html", "x")
            .with_mtime("index.html", 100);

        storage.touch("index.html", 200);

        assert_eq!(storage.mtime("index.html").unwrap(), 200);
    }

    #[test]
    fn test_list_root() {
        let storage = MockStorage::new()
            .with_file("index.html", "i")
            .with_file("about.html", "a")
            .with_file("products/index.html", "p");

        let listing = storage.list("").unwrap();
        assert_eq!(
            listing,
            vec![
                DirEntry {
                    name: "about.html".to_owned(),
                    is_dir: false
                },
                DirEntry {
                    name: "index.html".to_owned(),
                    is_dir: false
                },
                DirEntry {
                    name: "products".to_owned(),
                    is_dir: true
                },
            ]
        );
    }

    #[test]
    fn test_list_subdirectory() {
        let storage = MockStorage::new()
            .with_file("products/index.html", "p")
            .with_file("products/phone.html", "ph")
            .with_file("products/phone/index.html", "phi");

        let listing = storage.list("products").unwrap();
        assert_eq!(listing.len(), 3);
        assert_eq!(listing[0].name, "index.html");
        assert_eq!(listing[1].name, "phone");
        assert!(listing[1].is_dir);
        assert_eq!(listing[2].name, "phone.html");
        assert!(!listing[2].is_dir);
    }

    #[test]
    fn test_list_missing_dir() {
        let storage = MockStorage::new().with_file("index.html", "i");

        assert!(storage.list("nowhere").is_err());
    }

    #[test]
    fn test_localize_uses_exists() {
        let storage = MockStorage::new()
            .with_file("about.html", "en")
            .with_file("about.cs-CZ.html", "cs");

        assert_eq!(storage.localize("about.html", "cs-CZ"), "about.cs-CZ.html");
        assert_eq!(storage.localize("about.html", "de-DE"), "about.html");
    }
}
