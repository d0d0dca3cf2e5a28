//! Tree model: arena-backed [`Document`] plus owned value-tree [`Node`]s.
//!
//! The arena form gives every node a stable [`NodeId`] so relocation
//! operations can move subtrees without invalidating references to other
//! nodes. The value form is a plain recursive enum used at handler
//! boundaries: expansion input is exported as a detached value tree and
//! replacement fragments are built as value trees, then imported back.
//!
//! Ownership is strict single-parent: moving a node between parents is
//! detach-then-attach, never duplication. Copies happen only through the
//! explicit `export`/`import` pair.

use std::collections::HashMap;

/// Handle to one node in a [`Document`] arena.
///
/// Ids are only valid for the document that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Elements whose content model forbids children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is raw text, never markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// True for HTML void elements (`<br>`, `<meta>`, ...).
pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// True for elements whose content is read and written verbatim.
pub(crate) fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// The local part of a possibly prefixed tag name (`ac:layout` -> `layout`).
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Element payload: tag name plus ordered attributes with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    fn new(name: String, attrs: Vec<(String, String)>) -> Self {
        Self { name, attrs }
    }

    /// Tag name as parsed (lowercased, prefix included).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local part of the tag name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in insertion order.
    #[must_use]
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_owned();
        } else {
            self.attrs.push((name.to_owned(), value.to_owned()));
        }
    }

    fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(k, _)| k != name);
        self.attrs.len() != before
    }
}

/// Node payload stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a tag name and attributes.
    Element(ElementData),
    /// A text node.
    Text(String),
    /// A comment node (text without the `<!--` `-->` markers).
    Comment(String),
}

/// One arena slot: payload plus tree links.
#[derive(Debug)]
struct NodeSlot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned document tree.
///
/// Owns exactly one root element; detached subtrees stay in the arena until
/// the document is dropped (documents are per-request and short-lived).
/// Structural mutations and `id` attribute changes invalidate the internal
/// id index, which is rebuilt lazily on the next [`Document::element_by_id`].
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeId,
    doctype: bool,
    id_index: Option<HashMap<String, NodeId>>,
}

impl Document {
    /// Create a document whose root is an empty element with the given name.
    #[must_use]
    pub fn new(root_name: &str) -> Self {
        Self::from_root(Element::new(root_name))
    }

    /// Create a document from an owned value tree.
    #[must_use]
    pub fn from_root(root: Element) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            doctype: false,
            id_index: None,
        };
        doc.root = doc.import(Node::Element(root));
        doc
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether the source carried a doctype declaration.
    #[must_use]
    pub fn has_doctype(&self) -> bool {
        self.doctype
    }

    pub fn set_doctype(&mut self, doctype: bool) {
        self.doctype = doctype;
    }

    fn slot(&self, id: NodeId) -> &NodeSlot {
        &self.nodes[id.index()]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut NodeSlot {
        &mut self.nodes[id.index()]
    }

    fn push_slot(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NodeSlot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Node payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.slot(id).kind
    }

    /// Element payload, `None` for text and comment nodes.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.slot(id).kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Text of a text node, `None` otherwise.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.slot(id).kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Parent node, `None` for the root and for detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    /// True when `node` is `subtree` itself or lives under it.
    #[must_use]
    pub fn contains(&self, subtree: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == subtree {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// True when the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// All descendants of `id` in document (preorder) order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// First element with the given tag name, in document order, root included.
    #[must_use]
    pub fn find_element(&self, name: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&id| self.element(id).is_some_and(|e| e.name() == name))
    }

    /// Concatenated text of the node and all its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(t) = self.text(id) {
            out.push_str(t);
        }
        for child in self.descendants(id) {
            if let Some(t) = self.text(child) {
                out.push_str(t);
            }
        }
        out
    }

    /// Look up an element by its `id` attribute against the current tree.
    ///
    /// The index is rebuilt lazily after any mutation, so the result always
    /// reflects the present tree shape. Duplicate ids resolve to the first
    /// element in document order; detached subtrees are not indexed.
    pub fn element_by_id(&mut self, id: &str) -> Option<NodeId> {
        if self.id_index.is_none() {
            let mut index = HashMap::new();
            let root = self.root;
            for node in std::iter::once(root).chain(self.descendants(root)) {
                if let Some(value) = self.element(node).and_then(|e| e.attr("id")) {
                    index.entry(value.to_owned()).or_insert(node);
                }
            }
            self.id_index = Some(index);
        }
        self.id_index.as_ref().and_then(|m| m.get(id).copied())
    }

    /// Attribute lookup on an element node.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if name == "id" {
            self.id_index = None;
        }
        if let NodeKind::Element(data) = &mut self.slot_mut(id).kind {
            data.set_attr(name, value);
        }
    }

    /// Remove an attribute; returns true when it was present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        if name == "id" {
            self.id_index = None;
        }
        match &mut self.slot_mut(id).kind {
            NodeKind::Element(data) => data.remove_attr(name),
            _ => false,
        }
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push_slot(NodeKind::Element(ElementData::new(
            name.to_owned(),
            Vec::new(),
        )))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_slot(NodeKind::Text(text.to_owned()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_slot(NodeKind::Comment(text.to_owned()))
    }

    /// Detach a node from its parent; the subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slot(id).parent {
            self.slot_mut(parent).children.retain(|&c| c != id);
            self.slot_mut(id).parent = None;
            self.id_index = None;
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// The caller must not attach a node inside its own subtree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(!self.contains(child, parent));
        self.detach(child);
        self.slot_mut(parent).children.push(child);
        self.slot_mut(child).parent = Some(parent);
        self.id_index = None;
    }

    /// Insert `child` as the first child of `parent`, detaching it first.
    ///
    /// The caller must not attach a node inside its own subtree.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(!self.contains(child, parent));
        self.detach(child);
        self.slot_mut(parent).children.insert(0, child);
        self.slot_mut(child).parent = Some(parent);
        self.id_index = None;
    }

    /// Insert `node` immediately before `reference` among its siblings.
    ///
    /// No-op when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.insert_at(reference, node, 0);
    }

    /// Insert `node` immediately after `reference` among its siblings.
    ///
    /// No-op when `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        self.insert_at(reference, node, 1);
    }

    fn insert_at(&mut self, reference: NodeId, node: NodeId, offset: usize) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        debug_assert!(!self.contains(node, parent));
        self.detach(node);
        let siblings = &self.slot(parent).children;
        let Some(pos) = siblings.iter().position(|&c| c == reference) else {
            return;
        };
        self.slot_mut(parent).children.insert(pos + offset, node);
        self.slot_mut(node).parent = Some(parent);
        self.id_index = None;
    }

    /// Detach every child of `id`; returns them in former order.
    pub fn clear_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self.slot(id).children.clone();
        for &child in &children {
            self.slot_mut(child).parent = None;
        }
        self.slot_mut(id).children.clear();
        if !children.is_empty() {
            self.id_index = None;
        }
        children
    }

    /// Import an owned value tree as a detached arena subtree.
    pub fn import(&mut self, node: Node) -> NodeId {
        match node {
            Node::Element(element) => {
                let id = self.push_slot(NodeKind::Element(ElementData::new(
                    element.name,
                    element.attrs,
                )));
                for child in element.children {
                    let child_id = self.import(child);
                    self.slot_mut(id).children.push(child_id);
                    self.slot_mut(child_id).parent = Some(id);
                }
                id
            }
            Node::Text(text) => self.push_slot(NodeKind::Text(text)),
            Node::Comment(text) => self.push_slot(NodeKind::Comment(text)),
        }
    }

    /// Deep-copy a subtree of another document into this one, detached.
    pub fn import_from(&mut self, other: &Self, id: NodeId) -> NodeId {
        self.import(other.export(id))
    }

    /// Export a subtree as an owned value tree (deep copy).
    #[must_use]
    pub fn export(&self, id: NodeId) -> Node {
        match &self.slot(id).kind {
            NodeKind::Element(data) => {
                let children = self
                    .children(id)
                    .iter()
                    .map(|&child| self.export(child))
                    .collect();
                Node::Element(Element {
                    name: data.name.clone(),
                    attrs: data.attrs.clone(),
                    children,
                })
            }
            NodeKind::Text(t) => Node::Text(t.clone()),
            NodeKind::Comment(t) => Node::Comment(t.clone()),
        }
    }
}

/// An owned tree node, used for handler fragments and expansion input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element subtree.
    Element(Element),
    /// A text node.
    Text(String),
    /// A comment node.
    Comment(String),
}

impl Node {
    /// Convenience constructor for a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The element payload, if this is an element.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An owned element with builder-style constructors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name (lowercased by the parser).
    pub name: String,
    /// Attributes in insertion order with unique keys.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(&name.into(), value.into());
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Local part of the tag name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace an attribute in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.into();
        } else {
            self.attrs.push((name.to_owned(), value.into()));
        }
    }
}
