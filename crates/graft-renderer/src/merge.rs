//! Merging a content document into a layout document.

use graft_dom::Document;

/// Move every child of the first `src_tag` element in `src` to the end of
/// the first `dest_tag` element in `dest`, preserving order.
///
/// Children of all kinds move, text and comments included. Each child is
/// imported into the destination tree and detached from the source. When
/// either side has no matching element the call is a silent no-op; a layout
/// without a content insertion point simply drops that content.
pub fn merge_children(dest: &mut Document, src: &mut Document, src_tag: &str, dest_tag: &str) {
    let Some(src_parent) = src.find_element(src_tag) else {
        return;
    };
    let Some(dest_parent) = dest.find_element(dest_tag) else {
        return;
    };
    for child in src.clear_children(src_parent) {
        let imported = dest.import_from(src, child);
        dest.append_child(dest_parent, imported);
    }
}

#[cfg(test)]
mod tests {
    use graft_dom::{parse_document, serialize};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_merge_head_and_body() {
        let mut layout =
            parse_document("<html><head></head><body><cms-content></cms-content></body></html>")
                .unwrap();
        let mut content =
            parse_document("<html><head><title>T</title></head><body><p>Hi</p></body></html>")
                .unwrap();

        merge_children(&mut layout, &mut content, "head", "head");
        merge_children(&mut layout, &mut content, "body", "cms-content");

        assert_eq!(
            serialize(&layout),
            "<html><head><title>T</title></head>\
             <body><cms-content><p>Hi</p></cms-content></body></html>"
        );
    }

    #[test]
    fn test_merge_preserves_child_order_and_kinds() {
        let mut layout = parse_document("<html><main></main></html>").unwrap();
        let mut content = parse_document("<body>one<!-- two --><b>three</b></body>").unwrap();

        merge_children(&mut layout, &mut content, "body", "main");

        assert_eq!(
            serialize(&layout),
            "<html><main>one<!-- two --><b>three</b></main></html>"
        );
    }

    #[test]
    fn test_merge_missing_target_is_noop() {
        let mut layout = parse_document("<html><body></body></html>").unwrap();
        let mut content = parse_document("<body><p>Hi</p></body>").unwrap();

        merge_children(&mut layout, &mut content, "body", "cms-content");

        assert_eq!(serialize(&layout), "<html><body></body></html>");
    }

    #[test]
    fn test_merge_missing_source_is_noop() {
        let mut layout = parse_document("<html><main></main></html>").unwrap();
        let mut content = parse_document("<div>x</div>").unwrap();

        merge_children(&mut layout, &mut content, "body", "main");

        assert_eq!(serialize(&layout), "<html><main></main></html>");
    }

    #[test]
    fn test_merge_appends_after_existing_children() {
        let mut layout = parse_document("<html><head><meta charset=\"utf-8\"></head></html>")
            .unwrap();
        let mut content = parse_document("<html><head><title>T</title></head></html>").unwrap();

        merge_children(&mut layout, &mut content, "head", "head");

        assert_eq!(
            serialize(&layout),
            "<html><head><meta charset=\"utf-8\"><title>T</title></head></html>"
        );
    }

    #[test]
    fn test_merge_source_children_leave_source() {
        let mut layout = parse_document("<html><main></main></html>").unwrap();
        let mut content = parse_document("<html><body><p>Hi</p></body></html>").unwrap();

        merge_children(&mut layout, &mut content, "body", "main");

        let body = content.find_element("body").unwrap();
        assert!(content.children(body).is_empty());
    }
}
