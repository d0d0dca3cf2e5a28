//! Post-expansion relocation directives.
//!
//! After expansion settles, reserved attributes relocate nodes to an
//! id-addressed target elsewhere in the tree. Each directive pair has a
//! self variant (the element itself moves, only the directive attribute is
//! stripped) and a contents variant (all child nodes move, the emptied
//! owner is discarded). Targets are resolved against the live tree per
//! directive, never cached, so a directive observes every mutation made by
//! the ones before it. A directive whose target id does not exist is left
//! untouched, attribute included; partially assembled templates are legal.

use graft_dom::{Document, NodeId};

/// Where moved nodes land relative to the target element.
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// As last children of the target.
    Append,
    /// As first children of the target.
    Prepend,
    /// In place of the target, which is removed.
    Replace,
    /// As the target's only children, former children dropped.
    ReplaceContents,
    /// As immediately preceding siblings of the target.
    Before,
    /// As immediately following siblings of the target.
    After,
}

/// Directive pairs in resolution order: (self attribute, contents attribute).
const DIRECTIVE_PAIRS: &[(&str, &str, Placement)] = &[
    ("append-to", "append-contents-to", Placement::Append),
    ("prepend-to", "prepend-contents-to", Placement::Prepend),
    ("replace", "replace-with-contents", Placement::Replace),
    (
        "replace-contents",
        "replace-contents-with-contents",
        Placement::ReplaceContents,
    ),
    ("move-before", "move-contents-before", Placement::Before),
    ("move-after", "move-contents-after", Placement::After),
];

/// One collected directive instance.
struct Directive {
    owner: NodeId,
    attr: String,
    target_id: String,
    move_contents: bool,
}

/// Resolve all relocation directives in the document.
///
/// Pairs run in table order; within a pair, instances run in the order the
/// attributes appear in the document at collection time.
pub fn reshuffle(doc: &mut Document) {
    for &(self_attr, contents_attr, placement) in DIRECTIVE_PAIRS {
        for directive in collect_pair(doc, self_attr, contents_attr) {
            apply_directive(doc, &directive, placement);
        }
    }
}

/// Collect both attribute variants of one pair in document order.
fn collect_pair(doc: &Document, self_attr: &str, contents_attr: &str) -> Vec<Directive> {
    let root = doc.root();
    let mut out = Vec::new();
    for id in std::iter::once(root).chain(doc.descendants(root)) {
        let Some(element) = doc.element(id) else {
            continue;
        };
        for (name, value) in element.attrs() {
            if name != self_attr && name != contents_attr {
                continue;
            }
            out.push(Directive {
                owner: id,
                attr: name.clone(),
                target_id: value.clone(),
                move_contents: name == contents_attr,
            });
        }
    }
    out
}

fn apply_directive(doc: &mut Document, directive: &Directive, placement: Placement) {
    let Some(target) = doc.element_by_id(&directive.target_id) else {
        // Target may not be composed in yet; leave the directive as is.
        return;
    };
    let nodes: Vec<NodeId> = if directive.move_contents {
        doc.children(directive.owner).to_vec()
    } else {
        vec![directive.owner]
    };
    // A target inside the moved subtree cannot host it.
    if nodes.iter().any(|&node| doc.contains(node, target)) {
        tracing::debug!(
            target_id = %directive.target_id,
            attr = %directive.attr,
            "Directive target inside moved subtree, skipping"
        );
        return;
    }
    match placement {
        Placement::Append => {
            for node in nodes {
                doc.append_child(target, node);
            }
        }
        Placement::Prepend => {
            for node in nodes.into_iter().rev() {
                doc.prepend_child(target, node);
            }
        }
        Placement::Replace => {
            for node in nodes {
                doc.insert_before(target, node);
            }
            doc.detach(target);
        }
        Placement::ReplaceContents => {
            doc.clear_children(target);
            for node in nodes {
                doc.append_child(target, node);
            }
        }
        Placement::Before => {
            for node in nodes {
                doc.insert_before(target, node);
            }
        }
        Placement::After => {
            let mut reference = target;
            for node in nodes {
                doc.insert_after(reference, node);
                reference = node;
            }
        }
    }
    if directive.move_contents {
        doc.detach(directive.owner);
    } else {
        doc.remove_attr(directive.owner, &directive.attr);
    }
}

#[cfg(test)]
mod tests {
    use graft_dom::{parse_document, serialize};
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(html: &str) -> String {
        let mut doc = parse_document(html).unwrap();
        reshuffle(&mut doc);
        serialize(&doc)
    }

    #[test]
    fn test_append_to_moves_element() {
        let out = run(
            r#"<html><body><p append-to="sink" class="x">a</p><div id="sink"><b>b</b></div></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body><div id="sink"><b>b</b><p class="x">a</p></div></body></html>"#
        );
    }

    #[test]
    fn test_append_contents_to_discards_owner() {
        let out = run(
            r#"<html><body><div append-contents-to="sink">one<!-- c --><b>two</b></div><div id="sink"></div></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body><div id="sink">one<!-- c --><b>two</b></div></body></html>"#
        );
    }

    #[test]
    fn test_append_variants_keep_document_order() {
        let out = run(
            r#"<html><body><p append-to="sink">1</p><div append-contents-to="sink"><i>2</i>3</div><p append-to="sink">4</p><div id="sink"></div></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body><div id="sink"><p>1</p><i>2</i>3<p>4</p></div></body></html>"#
        );
    }

    #[test]
    fn test_prepend_to_keeps_order_before_existing() {
        // Each instance prepends its group intact, so the later instance
        // lands in front of the earlier one.
        let out = run(
            r#"<html><body><div id="sink"><b>old</b></div><p prepend-to="sink">1</p><div prepend-contents-to="sink">2<i>3</i></div></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body><div id="sink">2<i>3</i><p>1</p><b>old</b></div></body></html>"#
        );
    }

    #[test]
    fn test_replace_removes_target() {
        let out = run(
            r#"<html><body><p replace="old">new</p><div id="old">gone</div></body></html>"#,
        );

        assert_eq!(out, r#"<html><body><p>new</p></body></html>"#);
    }

    #[test]
    fn test_replace_with_contents() {
        let out = run(
            r#"<html><body><div replace-with-contents="old"><b>n1</b>n2</div><div id="old">gone</div></body></html>"#,
        );

        assert_eq!(out, r#"<html><body><b>n1</b>n2</body></html>"#);
    }

    #[test]
    fn test_replace_contents_drops_former_children() {
        let out = run(
            r#"<html><body><p replace-contents="box">new</p><div id="box"><b>old</b>text</div></body></html>"#,
        );

        assert_eq!(out, r#"<html><body><div id="box"><p>new</p></div></body></html>"#);
    }

    #[test]
    fn test_move_before_and_after_preserve_order() {
        let out = run(
            r#"<html><body><div move-contents-before="mark">a<b>b</b></div><div move-contents-after="mark">c<i>d</i></div><p id="mark">M</p></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body>a<b>b</b><p id="mark">M</p>c<i>d</i></body></html>"#
        );
    }

    #[test]
    fn test_move_after_single_element() {
        let out = run(
            r#"<html><body><p id="mark">M</p><div><span move-after="mark">tail</span></div></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body><p id="mark">M</p><span>tail</span><div></div></body></html>"#
        );
    }

    #[test]
    fn test_missing_target_leaves_directive_untouched() {
        let html =
            r#"<html><body><p append-to="nowhere" class="x">a</p></body></html>"#;

        assert_eq!(run(html), html);
    }

    #[test]
    fn test_target_removed_by_earlier_directive_is_skipped() {
        // The first replace consumes #t; the second finds nothing and stays.
        let out = run(
            r#"<html><body><a-el replace="t">A</a-el><b-el replace="t">B</b-el><div id="t">x</div></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body><b-el replace="t">B</b-el><a-el>A</a-el></body></html>"#
        );
    }

    #[test]
    fn test_target_inside_moved_subtree_is_skipped() {
        let html =
            r#"<html><body><section append-to="inner"><div id="inner"></div></section></body></html>"#;

        assert_eq!(run(html), html);
    }

    #[test]
    fn test_reshuffle_is_deterministic() {
        let html = r#"<html><body><p append-to="sink">1</p><div move-before="sink">2</div><div id="sink"></div></body></html>"#;

        assert_eq!(run(html), run(html));
    }

    #[test]
    fn test_directive_attr_order_decides_within_pair() {
        // Both variants on one element run in attribute order: the element
        // moves first, then its contents move out and the shell is dropped.
        let out = run(
            r#"<html><body><div append-to="a" append-contents-to="b">x</div><div id="a"></div><div id="b"></div></body></html>"#,
        );

        assert_eq!(
            out,
            r#"<html><body><div id="a"></div><div id="b">x</div></body></html>"#
        );
    }
}
