//! Lenient HTML parsing.
//!
//! Parses page markup into a [`Document`] on a best-effort basis: unclosed
//! elements are auto-closed, stray end tags are ignored, void elements never
//! take children, and `script`/`style` bodies are read as raw text. Named
//! HTML entities are converted up front; the remaining references are decoded
//! per event. Only input from which no element at all can be recovered fails.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{convert_html_entities, decode_entity};
use crate::error::ParseError;
use crate::node::{Document, Element, Node, is_raw_text, is_void};

/// Parse an HTML source into a [`Document`].
///
/// Tag and attribute names are lowercased. When the input holds more than one
/// top-level node, everything is wrapped in a synthesized `html` root; when
/// it holds exactly one element, that element becomes the root and loose
/// top-level text is discarded.
///
/// # Errors
///
/// Returns [`ParseError::NoRoot`] when no element can be recovered.
pub fn parse_document(html: &str) -> Result<Document, ParseError> {
    let prepared = convert_html_entities(html);

    let mut reader = Reader::from_str(&prepared);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut top_level: Vec<Node> = Vec::new();
    let mut doctype = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            // Unrecoverable syntax error: keep what was parsed so far
            Err(_) => break,
        };
        match event {
            Event::Start(e) => {
                let name = decode_name(&reader, e.name().as_ref());
                let element = element_from_start(&reader, &e, name);
                if is_void(&element.name) {
                    append_node(&mut stack, &mut top_level, Node::Element(element));
                } else if is_raw_text(&element.name) {
                    let mut element = element;
                    if let Ok(raw) = reader.read_text(e.name())
                        && !raw.is_empty()
                    {
                        element.children.push(Node::Text(raw.into_owned()));
                    }
                    append_node(&mut stack, &mut top_level, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Event::Empty(e) => {
                let name = decode_name(&reader, e.name().as_ref());
                let element = element_from_start(&reader, &e, name);
                append_node(&mut stack, &mut top_level, Node::Element(element));
            }
            Event::End(e) => {
                let name = decode_name(&reader, e.name().as_ref());
                close_element(&mut stack, &mut top_level, &name);
            }
            Event::Text(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_or_else(|_| String::from_utf8_lossy(&e).into_owned(), |t| t.into_owned());
                append_text(&mut stack, &mut top_level, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader
                    .decoder()
                    .decode(&e)
                    .map_or_else(|_| String::from_utf8_lossy(&e).into_owned(), |t| t.into_owned());
                append_text(&mut stack, &mut top_level, &decode_entity(&entity));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(&mut stack, &mut top_level, &text);
            }
            Event::Comment(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_or_else(|_| String::from_utf8_lossy(&e).into_owned(), |t| t.into_owned());
                append_node(&mut stack, &mut top_level, Node::Comment(text));
            }
            Event::DocType(_) => doctype = true,
            Event::Decl(_) | Event::PI(_) => {}
            Event::Eof => break,
        }
    }

    // Auto-close whatever is still open
    while let Some(element) = stack.pop() {
        append_node(&mut stack, &mut top_level, Node::Element(element));
    }

    let root = select_root(top_level)?;
    let mut doc = Document::from_root(root);
    doc.set_doctype(doctype);
    Ok(doc)
}

/// Decode a tag or attribute name and lowercase it.
fn decode_name(reader: &Reader<&[u8]>, raw: &[u8]) -> String {
    reader
        .decoder()
        .decode(raw)
        .map_or_else(|_| String::from_utf8_lossy(raw).into_owned(), |n| n.into_owned())
        .to_lowercase()
}

/// Build a value element from a start tag, first attribute occurrence wins.
fn element_from_start(reader: &Reader<&[u8]>, e: &BytesStart, name: String) -> Element {
    let mut element = Element::new(name);
    for attr in e.html_attributes().with_checks(false).flatten() {
        let key = decode_name(reader, attr.key.as_ref());
        if element.attr(&key).is_some() {
            continue;
        }
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        element.attrs.push((key, value));
    }
    element
}

/// Append a node to the innermost open element, or to the top level.
fn append_node(stack: &mut Vec<Element>, top_level: &mut Vec<Node>, node: Node) {
    if let Some(open) = stack.last_mut() {
        open.children.push(node);
    } else {
        top_level.push(node);
    }
}

/// Append text, merging with a preceding text sibling.
fn append_text(stack: &mut Vec<Element>, top_level: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = stack
        .last_mut()
        .map_or(&mut *top_level, |open| &mut open.children);
    if let Some(Node::Text(last)) = siblings.last_mut() {
        last.push_str(text);
    } else {
        siblings.push(Node::Text(text.to_owned()));
    }
}

/// Close the innermost open element with the given name.
///
/// Elements left open above it are auto-closed into their parent; an end tag
/// matching nothing on the stack is ignored.
fn close_element(stack: &mut Vec<Element>, top_level: &mut Vec<Node>, name: &str) {
    let Some(pos) = stack.iter().rposition(|open| open.name == name) else {
        return;
    };
    while stack.len() > pos {
        let element = stack.pop().unwrap_or_default();
        append_node(stack, top_level, Node::Element(element));
    }
}

/// Pick the document root from the parsed top-level nodes.
fn select_root(top_level: Vec<Node>) -> Result<Element, ParseError> {
    let element_count = top_level
        .iter()
        .filter(|n| matches!(n, Node::Element(_)))
        .count();
    match element_count {
        0 => Err(ParseError::NoRoot),
        1 => top_level
            .into_iter()
            .find_map(|n| match n {
                Node::Element(el) => Some(el),
                _ => None,
            })
            .ok_or(ParseError::NoRoot),
        _ => {
            let mut root = Element::new("html");
            root.children = top_level;
            Ok(root)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let doc = parse_document("<html><body><p>Hello</p></body></html>").unwrap();

        let root = doc.root();
        assert_eq!(doc.element(root).unwrap().name(), "html");
        let p = doc.find_element("p").unwrap();
        assert_eq!(doc.text_content(p), "Hello");
    }

    #[test]
    fn test_parse_attributes() {
        let doc = parse_document(r#"<div id="main" class="wide box">x</div>"#).unwrap();

        let div = doc.root();
        assert_eq!(doc.attr(div, "id"), Some("main"));
        assert_eq!(doc.attr(div, "class"), Some("wide box"));
    }

    #[test]
    fn test_parse_unquoted_attribute() {
        let doc = parse_document("<p class=note>x</p>").unwrap();

        assert_eq!(doc.attr(doc.root(), "class"), Some("note"));
    }

    #[test]
    fn test_parse_lowercases_names() {
        let doc = parse_document(r#"<DIV CLASS="a">x</DIV>"#).unwrap();

        assert_eq!(doc.element(doc.root()).unwrap().name(), "div");
        assert_eq!(doc.attr(doc.root(), "class"), Some("a"));
    }

    #[test]
    fn test_parse_void_elements() {
        let doc = parse_document("<p>a<br>b<img src=\"x.png\">c</p>").unwrap();

        let children = doc.children(doc.root()).to_vec();
        assert_eq!(children.len(), 5);
        assert_eq!(doc.element(children[1]).unwrap().name(), "br");
        assert!(doc.children(children[1]).is_empty());
        assert_eq!(doc.attr(children[3], "src"), Some("x.png"));
        assert_eq!(doc.text(children[4]), Some("c"));
    }

    #[test]
    fn test_parse_self_closing() {
        let doc = parse_document("<p>Before<widget-box />After</p>").unwrap();

        let children = doc.children(doc.root()).to_vec();
        assert_eq!(doc.element(children[1]).unwrap().name(), "widget-box");
        assert_eq!(doc.text(children[2]), Some("After"));
    }

    #[test]
    fn test_parse_unclosed_auto_closes() {
        let doc = parse_document("<html><body><p>a<div>b</body></html>").unwrap();

        // p and div are auto-closed when body ends
        let p = doc.find_element("p").unwrap();
        assert_eq!(doc.text_content(p), "ab");
        let div = doc.find_element("div").unwrap();
        assert!(doc.contains(p, div));
    }

    #[test]
    fn test_parse_stray_end_ignored() {
        let doc = parse_document("<div>a</span>b</div>").unwrap();

        assert_eq!(doc.text_content(doc.root()), "ab");
    }

    #[test]
    fn test_parse_comment() {
        let doc = parse_document("<div><!-- note --></div>").unwrap();

        let children = doc.children(doc.root()).to_vec();
        assert_eq!(
            doc.kind(children[0]),
            &crate::node::NodeKind::Comment(" note ".to_owned())
        );
    }

    #[test]
    fn test_parse_entities() {
        let doc = parse_document("<p>a &amp; b&nbsp;&lt;c&gt; &#65;</p>").unwrap();

        assert_eq!(doc.text_content(doc.root()), "a & b\u{00a0}<c> A");
    }

    #[test]
    fn test_parse_bare_ampersand() {
        let doc = parse_document("<p>cats & dogs</p>").unwrap();

        assert_eq!(doc.text_content(doc.root()), "cats & dogs");
    }

    #[test]
    fn test_parse_script_raw_text() {
        let doc = parse_document("<div><script>if (a < b) { go(); }</script></div>").unwrap();

        let script = doc.find_element("script").unwrap();
        assert_eq!(doc.text_content(script), "if (a < b) { go(); }");
    }

    #[test]
    fn test_parse_doctype() {
        let doc = parse_document("<!DOCTYPE html><html><body></body></html>").unwrap();

        assert!(doc.has_doctype());
        assert_eq!(doc.element(doc.root()).unwrap().name(), "html");
    }

    #[test]
    fn test_parse_fragment_wraps_multiple_roots() {
        let doc = parse_document("<p>a</p><p>b</p>").unwrap();

        let root = doc.root();
        assert_eq!(doc.element(root).unwrap().name(), "html");
        assert_eq!(doc.children(root).len(), 2);
    }

    #[test]
    fn test_parse_single_element_fragment() {
        let doc = parse_document("<footer>done</footer>").unwrap();

        assert_eq!(doc.element(doc.root()).unwrap().name(), "footer");
    }

    #[test]
    fn test_parse_empty_fails() {
        assert_eq!(parse_document("").unwrap_err(), ParseError::NoRoot);
        assert_eq!(parse_document("   just text   ").unwrap_err(), ParseError::NoRoot);
    }

    #[test]
    fn test_parse_preserves_whitespace_in_elements() {
        let doc = parse_document("<pre>  two  spaces  </pre>").unwrap();

        assert_eq!(doc.text_content(doc.root()), "  two  spaces  ");
    }

    #[test]
    fn test_parse_namespaced_name() {
        let doc = parse_document("<app:widget>x</app:widget>").unwrap();

        let root = doc.root();
        assert_eq!(doc.element(root).unwrap().name(), "app:widget");
        assert_eq!(doc.element(root).unwrap().local_name(), "widget");
    }
}
