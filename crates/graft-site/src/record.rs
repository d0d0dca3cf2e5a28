//! Cached page tree records.

use serde::{Deserialize, Serialize};

/// Visibility of a page in rendered menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed in menus.
    Visible,
    /// Indexed but never listed.
    Hidden,
}

/// One page in the tree index.
///
/// Records serialize into the per-locale cache file; the serde attributes
/// below pin the cache format. `priority` orders siblings at build time
/// only and is not persisted, children are stored pre-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// Resolved page title.
    pub title: String,
    /// Page description, when any of the description metas is set.
    pub description: Option<String>,
    /// Corpus path of the page file.
    pub path: String,
    /// Extensionless URL path; `/` for the corpus root.
    pub url_path: String,
    /// Canonical URL when the page declares one.
    pub canonical: Option<String>,
    /// Menu visibility.
    pub visibility: Visibility,
    /// Access right expression (carried, not yet enforced).
    pub right: String,
    /// Source file mtime at build, seconds since the epoch, `0` unknown.
    pub modified: i64,
    /// CSS classes for the page's menu entry.
    pub classes: Vec<String>,
    /// Child pages, descending priority.
    pub children: Vec<PageRecord>,
    /// Sibling ordering weight.
    #[serde(skip)]
    pub priority: f64,
}

impl PageRecord {
    /// True when the page may appear in menus.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Child whose URL path ends in `segment`.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&PageRecord> {
        self.children
            .iter()
            .find(|child| last_segment(&child.url_path) == segment)
    }

    /// Breadcrumb trail for a URL path, shallowest first, this record
    /// excluded.
    ///
    /// Each path segment is matched against the final segment of a child's
    /// URL path, descending one level per segment. A miss on the first
    /// segment gives an empty trail; a deeper miss gives the partial trail
    /// up to the last match.
    #[must_use]
    pub fn breadcrumbs(&self, url_path: &str) -> Vec<&PageRecord> {
        let mut trail = Vec::new();
        let mut node = self;
        for segment in segments(url_path) {
            let Some(child) = node.child(segment) else {
                break;
            };
            trail.push(child);
            node = child;
        }
        trail
    }
}

/// Path segments of a URL, query and fragment stripped, empties skipped.
pub(crate) fn segments(url: &str) -> impl Iterator<Item = &str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

/// Final segment of a URL path.
pub(crate) fn last_segment(url_path: &str) -> &str {
    url_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url_path)
}
