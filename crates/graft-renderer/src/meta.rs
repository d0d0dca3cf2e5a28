//! Page metadata extracted from `<meta>` tags.
//!
//! Pages carry their configuration inline: template selection, menu
//! priority, title, description, access right and menu classes all come
//! from meta tags in the page source. Names are normalized (lowercased,
//! non-alphanumeric characters become `_`), so `cms.template` is addressed
//! as `cms_template`. All fields are computed eagerly at parse time from
//! the raw page text.

use std::collections::HashMap;

use graft_dom::{Document, NodeKind, parse_document};

/// Placeholder access right for pages that declare none.
pub const RIGHT_NOT_IMPLEMENTED: &str = "**not-implemented**";

/// Priority bounds; pages never sort fully first or fully last.
const PRIORITY_MIN: f64 = 0.000_001;
const PRIORITY_MAX: f64 = 0.999_999;

/// Parsed page metadata with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    template: Option<String>,
    priority: f64,
    title: String,
    description: Option<String>,
    right: String,
    hidden: bool,
    classes: Vec<String>,
    canonical: Option<String>,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            template: None,
            priority: 0.5,
            title: "Untitled Page".to_owned(),
            description: None,
            right: RIGHT_NOT_IMPLEMENTED.to_owned(),
            hidden: false,
            classes: Vec::new(),
            canonical: None,
        }
    }
}

impl PageMeta {
    /// Extract metadata from raw page text.
    ///
    /// Unparseable input yields the defaults; metadata never aborts page
    /// handling.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let Ok(doc) = parse_document(raw) else {
            return Self::default();
        };
        Self::from_document(&doc)
    }

    /// Extract metadata from an already parsed document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let mut meta: HashMap<String, String> = HashMap::new();
        let mut doc_title: Option<String> = None;
        let mut canonical: Option<String> = None;

        for id in doc.descendants(doc.root()) {
            let NodeKind::Element(element) = doc.kind(id) else {
                continue;
            };
            match element.name() {
                "meta" => {
                    if let (Some(name), Some(content)) =
                        (element.attr("name"), element.attr("content"))
                    {
                        // Later occurrences win, like repeated meta tags do.
                        meta.insert(normalize_name(name), content.to_owned());
                    }
                }
                "title" if doc_title.is_none() => {
                    doc_title = Some(doc.text_content(id));
                }
                "link" if canonical.is_none() => {
                    if element.attr("rel") == Some("canonical")
                        && let Some(href) = element.attr("href").filter(|h| !h.is_empty())
                    {
                        canonical = Some(href.to_owned());
                    }
                }
                _ => {}
            }
        }

        let get = |key: &str| meta.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let title = get("cms_title")
            .map(str::to_owned)
            .or_else(|| get("dc_title").map(str::to_owned))
            .or_else(|| doc_title.filter(|t| !t.is_empty()))
            .unwrap_or_else(|| "Untitled Page".to_owned());

        let description = get("cms_description")
            .or_else(|| get("dc_description"))
            .or_else(|| get("description"))
            .map(str::to_owned);

        Self {
            template: get("cms_template").map(str::to_owned),
            priority: parse_priority(get("cms_priority")),
            title,
            description,
            right: get("cms_right").unwrap_or(RIGHT_NOT_IMPLEMENTED).to_owned(),
            hidden: get("cms_visibility") == Some("hidden"),
            classes: get("cms_class")
                .map(|v| v.split_whitespace().map(str::to_owned).collect())
                .unwrap_or_default(),
            canonical,
        }
    }

    /// Layout reference (`design/layout`), when the page names one.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Menu ordering priority, clamped to (0, 1) exclusive.
    #[must_use]
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// Page title after the fallback chain.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page description after the fallback chain.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Access right tag; [`RIGHT_NOT_IMPLEMENTED`] when the page sets none.
    #[must_use]
    pub fn right(&self) -> &str {
        &self.right
    }

    /// True when the page is excluded from menus.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// CSS classes for the page's menu item.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Canonical URL from `<link rel="canonical">`.
    #[must_use]
    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }
}

/// Normalize a meta tag name: lowercase, non-alphanumeric becomes `_`.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Parse and clamp a priority value; anything unusable is the 0.5 default.
fn parse_priority(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .unwrap_or(0.5)
        .clamp(PRIORITY_MIN, PRIORITY_MAX)
}
