//! Tree cache persistence.
//!
//! Built trees are cached as one pretty-printed JSON file per locale so
//! later requests skip the corpus walk. Cache files are read
//! optimistically: an unreadable or corrupt file is a miss, never an
//! error. Writes overwrite whole files; racing rebuilds are harmless
//! because both write the same content for unchanged sources.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SiteError;
use crate::record::PageRecord;

/// Cache file name for a locale, `C` standing in when none is set.
fn cache_file_name(locale: Option<&str>) -> String {
    format!("menu.cache.{}.json", locale.unwrap_or("C"))
}

/// Persistence for built trees, one slot per locale.
pub trait TreeCache: Send + Sync {
    /// Load the cached tree for a locale; `None` on miss or unusable data.
    fn load(&self, locale: Option<&str>) -> Option<PageRecord>;

    /// Persist a freshly built tree.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::CacheWrite`] when the tree cannot be written.
    fn store(&self, locale: Option<&str>, root: &PageRecord) -> Result<(), SiteError>;

    /// Drop every cached locale; returns the number of files removed.
    fn flush(&self) -> usize;
}

/// File-backed cache directory.
pub struct FileTreeCache {
    dir: PathBuf,
}

impl FileTreeCache {
    /// Cache trees under the given directory, created on first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_path(&self, locale: Option<&str>) -> PathBuf {
        self.dir.join(cache_file_name(locale))
    }

    fn write(&self, path: &Path, root: &PageRecord) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(root).map_err(std::io::Error::other)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, json)
    }
}

impl TreeCache for FileTreeCache {
    fn load(&self, locale: Option<&str>) -> Option<PageRecord> {
        let path = self.file_path(locale);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "Tree cache miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(root) => {
                tracing::debug!(path = %path.display(), "Tree cache hit");
                Some(root)
            }
            Err(err) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %err,
                    "Ignoring corrupt tree cache file"
                );
                None
            }
        }
    }

    fn store(&self, locale: Option<&str>, root: &PageRecord) -> Result<(), SiteError> {
        let path = self.file_path(locale);
        match self.write(&path, root) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Tree cache written");
                Ok(())
            }
            Err(source) => Err(SiteError::CacheWrite { path, source }),
        }
    }

    fn flush(&self) -> usize {
        let pattern = self.dir.join("menu.cache.*.json");
        let Some(pattern) = pattern.to_str() else {
            return 0;
        };
        let Ok(paths) = glob::glob(pattern) else {
            return 0;
        };
        let mut removed = 0;
        for path in paths.flatten() {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Failed to remove tree cache file"
                    );
                }
            }
        }
        if removed > 0 {
            tracing::info!(removed, "Flushed tree cache files");
        }
        removed
    }
}

/// Disabled cache; every load misses.
pub struct NullTreeCache;

impl TreeCache for NullTreeCache {
    fn load(&self, _locale: Option<&str>) -> Option<PageRecord> {
        None
    }

    fn store(&self, _locale: Option<&str>, _root: &PageRecord) -> Result<(), SiteError> {
        Ok(())
    }

    fn flush(&self) -> usize {
        0
    }
}
