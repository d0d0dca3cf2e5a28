//! Expansion handler contract and registry.
//!
//! Custom elements are turned into markup by handlers resolved through a
//! tag-keyed registry. Handlers never touch the live tree: they receive a
//! detached clone of the element and answer with a replacement fragment or
//! a refusal. Everything pluggable in the pipeline goes through this one
//! seam, the menu renderer included.

use std::collections::HashMap;
use std::sync::Arc;

use graft_dom::{Element, Node};

/// Event name prefix for element expansion.
pub const EVENT_PREFIX: &str = "cms:content:";

/// Full event name for a custom element's local name.
#[must_use]
pub fn event_name(local: &str) -> String {
    format!("{EVENT_PREFIX}{local}")
}

/// One element's expansion request.
#[derive(Debug, Clone)]
pub struct ExpansionRequest {
    /// Full event name, [`EVENT_PREFIX`] plus the element's local name.
    pub name: String,
    /// Detached deep clone of the element under expansion.
    ///
    /// Mutating it has no effect on the document; only the returned
    /// fragment matters.
    pub input: Element,
    /// Directory context for handlers that resolve relative paths.
    pub base_dir: Option<String>,
}

/// Handler verdict for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Replace the element with these nodes, in order.
    ///
    /// An empty fragment removes the element without replacement.
    Expanded(Vec<Node>),
    /// No content exists for this element; it is frozen for the client.
    NotFound,
    /// The handler failed; the element is frozen for the client.
    Failed(String),
}

/// A custom element expansion handler.
pub trait ElementHandler: Send + Sync {
    /// Produce the replacement fragment for one element.
    fn handle(&self, request: &ExpansionRequest) -> Expansion;
}

/// Tag-keyed handler registry.
///
/// One handler per tag; registering a tag again replaces the earlier
/// handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ElementHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a custom element tag (local name).
    pub fn register(&mut self, tag: impl Into<String>, handler: Arc<dyn ElementHandler>) {
        self.handlers.insert(tag.into(), handler);
    }

    /// Resolve an event name to its handler.
    ///
    /// Returns `None` for names outside the [`EVENT_PREFIX`] namespace and
    /// for tags with no registered handler.
    #[must_use]
    pub fn resolve(&self, event: &str) -> Option<&dyn ElementHandler> {
        let tag = event.strip_prefix(EVENT_PREFIX)?;
        self.handlers.get(tag).map(AsRef::as_ref)
    }
}
