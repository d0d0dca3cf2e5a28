//! Tree construction by corpus walk.
//!
//! The corpus is a directory tree of `.html` files. `index.html` is a
//! directory's own page; a directory named after a sibling file's base name
//! holds that file's children. Children of `dir/base.html` come from
//! `dir/base/` when that directory exists; children of `dir/index.html`
//! come from `dir/` itself. Locale variants (`name.xx-YY.html`) never
//! enumerate as children; they only affect which file is read for a page's
//! metadata.

use std::collections::HashSet;
use std::sync::LazyLock;

use graft_renderer::PageMeta;
use graft_storage::Storage;
use regex::Regex;

use crate::error::SiteError;
use crate::record::{PageRecord, Visibility};

static LOCALE_VARIANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[a-z]{2}-[A-Z]{2}\.html$").expect("invalid variant pattern"));

/// Build the full tree rooted at the corpus `index.html`.
///
/// # Errors
///
/// Returns [`SiteError::Storage`] when any enumerated page cannot be read.
pub(crate) fn build_tree(
    storage: &dyn Storage,
    locale: Option<&str>,
) -> Result<PageRecord, SiteError> {
    record(storage, locale, "index.html")
}

/// Build the record for one page, children included.
fn record(storage: &dyn Storage, locale: Option<&str>, path: &str) -> Result<PageRecord, SiteError> {
    let read_path = match locale {
        Some(locale) => storage.localize(path, locale),
        None => path.to_owned(),
    };
    let raw = storage.read(&read_path)?;
    let meta = PageMeta::parse(&raw);
    let modified = storage.mtime(path).unwrap_or(0);
    let children = children(storage, locale, path)?;

    Ok(PageRecord {
        title: meta.title().to_owned(),
        description: meta.description().map(str::to_owned),
        path: path.to_owned(),
        url_path: url_path(path),
        canonical: meta.canonical().map(str::to_owned),
        visibility: if meta.is_hidden() {
            Visibility::Hidden
        } else {
            Visibility::Visible
        },
        right: meta.right().to_owned(),
        modified,
        classes: meta.classes().to_vec(),
        children,
        priority: meta.priority(),
    })
}

/// Enumerate and build the children of the page at `path`.
fn children(
    storage: &dyn Storage,
    locale: Option<&str>,
    path: &str,
) -> Result<Vec<PageRecord>, SiteError> {
    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", path),
    };
    let base = file.strip_suffix(".html").unwrap_or(file);

    // A page's own directory takes precedence; an index page otherwise
    // shares its parent directory with its siblings.
    let own_dir = join(dir, base);
    let (search_dir, entries) = match storage.list(&own_dir) {
        Ok(entries) => (own_dir, entries),
        Err(_) if base == "index" => match storage.list(dir) {
            Ok(entries) => (dir.to_owned(), entries),
            Err(_) => return Ok(Vec::new()),
        },
        Err(_) => return Ok(Vec::new()),
    };

    let file_names: HashSet<&str> = entries
        .iter()
        .filter(|entry| !entry.is_dir)
        .map(|entry| entry.name.as_str())
        .collect();

    let mut records = Vec::new();
    for entry in &entries {
        if entry.name == "index.html" {
            continue;
        }
        let entry_path = join(&search_dir, &entry.name);
        if entry.is_dir {
            // A sibling page file owns the directory as its child container.
            if file_names.contains(format!("{}.html", entry.name).as_str()) {
                continue;
            }
            let index = format!("{entry_path}/index.html");
            if storage.exists(&index) {
                records.push(record(storage, locale, &index)?);
            }
        } else if entry.name.ends_with(".html") && !LOCALE_VARIANT.is_match(&entry.name) {
            records.push(record(storage, locale, &entry_path)?);
        }
    }

    records.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    Ok(records)
}

/// URL path for a corpus path: the extensionless path, the containing
/// directory for index pages, `/` for the root.
fn url_path(path: &str) -> String {
    let base = if path == "index.html" || path.ends_with("/index.html") {
        &path[..path.len() - "index.html".len()]
    } else {
        path.strip_suffix(".html").unwrap_or(path)
    };
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        "/".to_owned()
    } else {
        format!("/{base}")
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}
