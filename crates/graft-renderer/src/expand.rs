//! Fixpoint expansion of custom elements.
//!
//! A pass scans the live tree for elements whose local name contains a
//! hyphen and which are not marked `render="client"`, then dispatches each
//! to its handler and splices the returned fragment in place. Because a
//! fragment may itself contain custom elements, passes repeat until a scan
//! finds nothing left to do or the pass ceiling is hit. The ceiling is the
//! only guard against self-reproducing elements.

use graft_dom::{Document, Node, NodeId};

use crate::handler::{Expansion, ExpansionRequest, HandlerRegistry, event_name};

/// Pass ceiling for one expansion run.
pub const MAX_EXPANSION_PASSES: u32 = 32;

/// Outcome of one expansion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Scan passes executed, the final empty scan included.
    pub passes: u32,
    /// Elements replaced by handler fragments.
    pub expanded: usize,
    /// Elements frozen with `render="client"`.
    pub skipped: usize,
    /// True when the ceiling was hit with unexpanded elements remaining.
    pub ceiling_reached: bool,
}

/// Drives expansion passes over one document.
pub struct ElementExpander<'a> {
    registry: &'a HandlerRegistry,
    base_dir: Option<String>,
    max_passes: u32,
}

impl<'a> ElementExpander<'a> {
    /// Create an expander using the given handler registry.
    #[must_use]
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self {
            registry,
            base_dir: None,
            max_passes: MAX_EXPANSION_PASSES,
        }
    }

    /// Set the directory context passed to handlers.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<String>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Override the pass ceiling.
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Expand the document to fixpoint or to the pass ceiling.
    ///
    /// Elements whose handler answers [`Expansion::NotFound`] or
    /// [`Expansion::Failed`], and elements with no handler at all, are
    /// frozen with `render="client"` and never retried. Elements still
    /// pending when the ceiling strikes keep their original markup,
    /// unmarked.
    pub fn expand(&self, doc: &mut Document) -> ExpansionReport {
        let mut report = ExpansionReport::default();
        if self.max_passes == 0 {
            return report;
        }
        let mut remaining = self.max_passes;
        loop {
            let progressed = self.run_pass(doc, &mut report);
            report.passes += 1;
            remaining -= 1;
            if !progressed {
                break;
            }
            if remaining == 0 {
                if !collect_expandable(doc).is_empty() {
                    report.ceiling_reached = true;
                    tracing::warn!(
                        passes = report.passes,
                        "Expansion ceiling reached with elements pending"
                    );
                }
                break;
            }
        }
        report
    }

    /// One scan-and-expand sweep; true when at least one element expanded.
    fn run_pass(&self, doc: &mut Document, report: &mut ExpansionReport) -> bool {
        let matches = collect_expandable(doc);
        let mut progressed = false;
        // Reverse document order: descendants expand before their ancestor
        // is dispatched, so the ancestor's clone sees resolved children.
        for id in matches.into_iter().rev() {
            if !doc.is_attached(id) {
                continue;
            }
            let Node::Element(input) = doc.export(id) else {
                continue;
            };
            let request = ExpansionRequest {
                name: event_name(input.local_name()),
                input,
                base_dir: self.base_dir.clone(),
            };
            let verdict = match self.registry.resolve(&request.name) {
                Some(handler) => handler.handle(&request),
                None => Expansion::NotFound,
            };
            match verdict {
                Expansion::Expanded(fragment) => {
                    splice(doc, id, fragment);
                    report.expanded += 1;
                    progressed = true;
                }
                Expansion::NotFound => {
                    tracing::debug!(event = %request.name, "No expansion found, freezing element");
                    doc.set_attr(id, "render", "client");
                    report.skipped += 1;
                }
                Expansion::Failed(reason) => {
                    tracing::warn!(event = %request.name, error = %reason, "Expansion failed, freezing element");
                    doc.set_attr(id, "render", "client");
                    report.skipped += 1;
                }
            }
        }
        progressed
    }
}

/// Expandable elements in document order; the root is never expandable.
fn collect_expandable(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&id| {
            doc.element(id).is_some_and(|element| {
                element.local_name().contains('-') && element.attr("render") != Some("client")
            })
        })
        .collect()
}

/// Replace an element with a fragment at its position among its siblings.
fn splice(doc: &mut Document, id: NodeId, fragment: Vec<Node>) {
    for node in fragment {
        let imported = doc.import(node);
        doc.insert_before(id, imported);
    }
    doc.detach(id);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use graft_dom::{Element, parse_document, serialize};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handler::ElementHandler;

    struct FragmentHandler(Vec<Node>);

    impl ElementHandler for FragmentHandler {
        fn handle(&self, _request: &ExpansionRequest) -> Expansion {
            Expansion::Expanded(self.0.clone())
        }
    }

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
        verdict: Expansion,
    }

    impl ElementHandler for CountingHandler {
        fn handle(&self, _request: &ExpansionRequest) -> Expansion {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict.clone()
        }
    }

    #[test]
    fn test_no_custom_elements_is_noop() {
        let registry = HandlerRegistry::new();
        let mut doc = parse_document("<html><body><p>plain</p></body></html>").unwrap();
        let before = serialize(&doc);

        let report = ElementExpander::new(&registry).expand(&mut doc);

        assert_eq!(serialize(&doc), before);
        assert_eq!(report.passes, 1);
        assert_eq!(report.expanded, 0);
        assert!(!report.ceiling_reached);
    }

    #[test]
    fn test_expands_fragment_in_place() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "acme-box",
            Arc::new(FragmentHandler(vec![
                Node::text("1"),
                Element::new("b").with_text("2").into(),
            ])),
        );
        let mut doc = parse_document("<div>a<acme-box></acme-box>z</div>").unwrap();

        let report = ElementExpander::new(&registry).expand(&mut doc);

        assert_eq!(serialize(&doc), "<div>a1<b>2</b>z</div>");
        assert_eq!(report.expanded, 1);
        assert_eq!(report.passes, 2);
    }

    #[test]
    fn test_empty_fragment_removes_element() {
        let mut registry = HandlerRegistry::new();
        registry.register("acme-box", Arc::new(FragmentHandler(vec![])));
        let mut doc = parse_document("<div>a<acme-box></acme-box>z</div>").unwrap();

        ElementExpander::new(&registry).expand(&mut doc);

        assert_eq!(serialize(&doc), "<div>az</div>");
    }

    #[test]
    fn test_client_rendered_never_dispatched() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            "my-widget",
            Arc::new(CountingHandler {
                calls: Arc::clone(&calls),
                verdict: Expansion::Expanded(vec![]),
            }),
        );
        let mut doc =
            parse_document("<div><my-widget render=\"client\"></my-widget></div>").unwrap();

        let report = ElementExpander::new(&registry).expand(&mut doc);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.expanded, 0);
        assert_eq!(
            serialize(&doc),
            "<div><my-widget render=\"client\"></my-widget></div>"
        );
    }

    #[test]
    fn test_not_found_freezes_element_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            "acme-box",
            Arc::new(CountingHandler {
                calls: Arc::clone(&calls),
                verdict: Expansion::NotFound,
            }),
        );
        // A sibling that expands keeps the pass loop going one more round.
        registry.register("other-box", Arc::new(FragmentHandler(vec![Node::text("x")])));
        let mut doc =
            parse_document("<div><acme-box></acme-box><other-box></other-box></div>").unwrap();

        let report = ElementExpander::new(&registry).expand(&mut doc);

        // Frozen on pass one, skipped on pass two.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            serialize(&doc),
            "<div><acme-box render=\"client\"></acme-box>x</div>"
        );
    }

    #[test]
    fn test_missing_handler_freezes_element() {
        let registry = HandlerRegistry::new();
        let mut doc = parse_document("<div><no-handler></no-handler></div>").unwrap();

        let report = ElementExpander::new(&registry).expand(&mut doc);

        assert_eq!(report.skipped, 1);
        assert_eq!(
            serialize(&doc),
            "<div><no-handler render=\"client\"></no-handler></div>"
        );
    }

    #[test]
    fn test_failed_freezes_element() {
        let mut registry = HandlerRegistry::new();
        struct Failing;
        impl ElementHandler for Failing {
            fn handle(&self, _request: &ExpansionRequest) -> Expansion {
                Expansion::Failed("boom".to_owned())
            }
        }
        registry.register("acme-box", Arc::new(Failing));
        let mut doc = parse_document("<div><acme-box></acme-box></div>").unwrap();

        let report = ElementExpander::new(&registry).expand(&mut doc);

        assert_eq!(report.skipped, 1);
        assert_eq!(doc.attr(doc.find_element("acme-box").unwrap(), "render"), Some("client"));
    }

    #[test]
    fn test_fragment_with_custom_element_expands_next_pass() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "outer-box",
            Arc::new(FragmentHandler(vec![
                Element::new("inner-box").into(),
            ])),
        );
        registry.register("inner-box", Arc::new(FragmentHandler(vec![Node::text("deep")])));
        let mut doc = parse_document("<div><outer-box></outer-box></div>").unwrap();

        let report = ElementExpander::new(&registry).expand(&mut doc);

        assert_eq!(serialize(&doc), "<div>deep</div>");
        assert_eq!(report.expanded, 2);
        assert_eq!(report.passes, 3);
    }

    #[test]
    fn test_descendants_expand_before_ancestor_dispatch() {
        let seen = Arc::new(std::sync::Mutex::new(None::<Element>));
        struct Capture {
            seen: Arc<std::sync::Mutex<Option<Element>>>,
        }
        impl ElementHandler for Capture {
            fn handle(&self, request: &ExpansionRequest) -> Expansion {
                *self.seen.lock().unwrap() = Some(request.input.clone());
                Expansion::Expanded(vec![Node::text("outer")])
            }
        }
        let mut registry = HandlerRegistry::new();
        registry.register("x-outer", Arc::new(Capture { seen: Arc::clone(&seen) }));
        registry.register("x-inner", Arc::new(FragmentHandler(vec![Node::text("inner")])));
        let mut doc = parse_document("<div><x-outer><x-inner></x-inner></x-outer></div>").unwrap();

        ElementExpander::new(&registry).expand(&mut doc);

        let input = seen.lock().unwrap().clone().unwrap();
        assert_eq!(input.children, vec![Node::text("inner")]);
        assert_eq!(serialize(&doc), "<div>outer</div>");
    }

    #[test]
    fn test_self_reproducing_element_hits_ceiling() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "loop-box",
            Arc::new(FragmentHandler(vec![Element::new("loop-box").into()])),
        );
        let mut doc = parse_document("<div><loop-box></loop-box></div>").unwrap();

        let report = ElementExpander::new(&registry).expand(&mut doc);

        assert!(report.ceiling_reached);
        assert_eq!(report.passes, MAX_EXPANSION_PASSES);
        assert_eq!(report.expanded, MAX_EXPANSION_PASSES as usize);
        // The last introduced element is neither expanded nor frozen.
        let pending = doc.find_element("loop-box").unwrap();
        assert_eq!(doc.attr(pending, "render"), None);
    }

    #[test]
    fn test_expansion_is_idempotent_once_converged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            "acme-box",
            Arc::new(CountingHandler {
                calls: Arc::clone(&calls),
                verdict: Expansion::NotFound,
            }),
        );
        registry.register("other-box", Arc::new(FragmentHandler(vec![Node::text("x")])));
        let mut doc =
            parse_document("<div><acme-box></acme-box><other-box></other-box></div>").unwrap();
        let expander = ElementExpander::new(&registry);

        expander.expand(&mut doc);
        let settled = serialize(&doc);
        let report = expander.expand(&mut doc);

        assert_eq!(serialize(&doc), settled);
        assert_eq!(report.expanded, 0);
        assert_eq!(report.skipped, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
