//! HTML document model for page composition.
//!
//! Pages and templates are parsed leniently into an arena-backed
//! [`Document`] whose nodes are addressed by stable [`NodeId`]s, so
//! composition steps can relocate whole subtrees without invalidating
//! handles held elsewhere. Handler boundaries use the owned value tree
//! ([`Node`], [`Element`]) instead, exported from and imported back into
//! the arena. [`serialize`] writes the final tree back out as HTML.

mod entities;
mod error;
mod node;
mod parser;
mod serializer;

pub use error::ParseError;
pub use node::{Document, Element, ElementData, Node, NodeId, NodeKind, local_name};
pub use parser::parse_document;
pub use serializer::{serialize, serialize_node};
