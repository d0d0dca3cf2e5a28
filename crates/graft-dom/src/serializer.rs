//! HTML serialization.

use std::fmt::Write;

use crate::node::{Document, NodeId, NodeKind, is_raw_text, is_void};

/// Serialize a whole document to HTML.
///
/// A doctype line is emitted when the source document carried one. Void
/// elements are written without a closing tag and `script`/`style` bodies
/// are written verbatim.
#[must_use]
pub fn serialize(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    if doc.has_doctype() {
        out.push_str("<!DOCTYPE html>\n");
    }
    write_node(doc, doc.root(), &mut out);
    out
}

/// Serialize a single subtree to HTML.
#[must_use]
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::with_capacity(256);
    write_node(doc, id, &mut out);
    out
}

/// Serialize a node recursively.
fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(element.name());
            for (key, value) in element.attrs() {
                let _ = write!(out, r#" {key}="{}""#, escape_attr(value));
            }
            out.push('>');
            if is_void(element.name()) {
                return;
            }
            if is_raw_text(element.name()) {
                for child in doc.children(id) {
                    if let Some(text) = doc.text(*child) {
                        out.push_str(text);
                    }
                }
            } else {
                for child in doc.children(id) {
                    write_node(doc, *child, out);
                }
            }
            let _ = write!(out, "</{}>", element.name());
        }
    }
}

/// Escape text content.
fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

/// Escape an attribute value.
fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

/// Escape HTML special characters.
fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
