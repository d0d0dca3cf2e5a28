//! Navigation menu expansion handler.
//!
//! Renders `<cms-menu>` elements into nested `<menu>` lists from the page
//! tree. The output is wrapped in a `cms-menu` element frozen with
//! `render="client"`, so the expander leaves the rendered markup in place
//! and client code may still re-render it live.

use std::sync::Arc;

use graft_dom::{Element, Node};
use graft_renderer::{ElementHandler, Expansion, ExpansionRequest};

use crate::record::PageRecord;
use crate::tree::PageTree;

/// Expansion handler producing navigation menus from the page tree.
///
/// The element's `level` attribute picks the breadcrumb trail record whose
/// children are listed (`1` is the site root) and `depth` bounds submenu
/// nesting. Both default to `1`. A level past the end of the trail leaves
/// the element unexpanded.
pub struct MenuRenderer {
    tree: Arc<PageTree>,
    locale: Option<String>,
    current_path: String,
}

impl MenuRenderer {
    /// Render menus against `tree` for the page at `current_path`.
    pub fn new(tree: Arc<PageTree>, current_path: impl Into<String>) -> Self {
        Self {
            tree,
            locale: None,
            current_path: current_path.into(),
        }
    }

    /// Use the tree built from this locale's page variants.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl ElementHandler for MenuRenderer {
    fn handle(&self, request: &ExpansionRequest) -> Expansion {
        let locale = self.locale.as_deref();
        // Breadcrumbs first: it performs the staleness checks, so a rebuild
        // is already persisted by the time the root is loaded.
        let chain = match self.tree.breadcrumbs(locale, &self.current_path) {
            Ok(chain) => chain,
            Err(err) => return Expansion::Failed(format!("page tree unavailable: {err}")),
        };
        let root = match self.tree.load(locale) {
            Ok(root) => root,
            Err(err) => return Expansion::Failed(format!("page tree unavailable: {err}")),
        };
        let mut trail = Vec::with_capacity(chain.len() + 1);
        trail.push(root);
        trail.extend(chain);

        let level = parse_level(request.input.attr("level"));
        let depth = parse_level(request.input.attr("depth"));
        let Some(start) = level
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| trail.get(index))
        else {
            return Expansion::NotFound;
        };

        let trail_paths: Vec<&str> = trail.iter().map(|record| record.url_path.as_str()).collect();
        let menu = build_menu(start, depth, &trail_paths);

        let mut wrapper = Element::new("cms-menu")
            .with_attr("render", "client")
            .with_attr("hidden", "true");
        for name in ["id", "class"] {
            if let Some(value) = request.input.attr(name) {
                wrapper.set_attr(name, value);
            }
        }
        wrapper.children.push(menu.into());
        Expansion::Expanded(vec![Node::Element(wrapper)])
    }
}

/// Parse a `level`/`depth` attribute; absent, zero and garbage mean `1`.
fn parse_level(value: Option<&str>) -> i64 {
    match value.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(0) | None => 1,
        Some(level) => level,
    }
}

/// One `<menu>` list of the node's visible children, recursing while
/// `depth` allows and the child has visible children of its own.
fn build_menu(node: &PageRecord, depth: i64, trail_paths: &[&str]) -> Element {
    let mut menu = Element::new("menu");
    for child in node.children.iter().filter(|child| child.is_visible()) {
        let mut classes = child.classes.clone();
        if trail_paths.contains(&child.url_path.as_str()) {
            classes.push("active".to_owned());
        }
        let mut item = Element::new("li");
        if !classes.is_empty() {
            item.set_attr("class", classes.join(" "));
        }
        let link = Element::new("a")
            .with_attr("href", child.canonical.as_deref().unwrap_or(&child.url_path))
            .with_text(child.title.clone());
        item.children.push(link.into());
        if depth > 1 && child.children.iter().any(PageRecord::is_visible) {
            item.children.push(build_menu(child, depth - 1, trail_paths).into());
        }
        menu.children.push(item.into());
    }
    menu
}
