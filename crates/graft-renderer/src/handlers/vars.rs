//! Placeholder substitution for `replace-vars` elements.

use std::collections::HashMap;
use std::sync::LazyLock;

use graft_dom::{Element, Node};
use regex::{Captures, Regex};

use crate::handler::{ElementHandler, Expansion, ExpansionRequest};

static VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9]+):([^}]+)\}\}").expect("invalid var pattern"));

/// Expands `replace-vars` elements by substituting `{{SCOPE:name}}` tokens.
///
/// Tokens are replaced in every descendant text node and attribute value.
/// A token whose scope or name is unknown stays in the output verbatim.
/// The wrapper element itself is dropped and its children take its place.
#[derive(Debug, Default)]
pub struct VarsHandler {
    scopes: HashMap<String, HashMap<String, String>>,
}

impl VarsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whole scope of variables, replacing any previous one.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>, vars: HashMap<String, String>) -> Self {
        self.scopes.insert(scope.into(), vars);
        self
    }

    /// Register a single variable.
    #[must_use]
    pub fn with_var(
        mut self,
        scope: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.scopes
            .entry(scope.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    fn replace(&self, text: &str) -> String {
        VAR_PATTERN
            .replace_all(text, |caps: &Captures<'_>| {
                self.scopes
                    .get(&caps[1])
                    .and_then(|vars| vars.get(&caps[2]))
                    .map_or_else(|| caps[0].to_owned(), Clone::clone)
            })
            .into_owned()
    }

    fn replace_in_element(&self, element: &mut Element) {
        for (_, value) in &mut element.attrs {
            *value = self.replace(value);
        }
        for child in &mut element.children {
            match child {
                Node::Element(inner) => self.replace_in_element(inner),
                Node::Text(text) => *text = self.replace(text),
                Node::Comment(_) => {}
            }
        }
    }
}

impl ElementHandler for VarsHandler {
    fn handle(&self, request: &ExpansionRequest) -> Expansion {
        let mut element = request.input.clone();
        self.replace_in_element(&mut element);
        Expansion::Expanded(element.children)
    }
}
