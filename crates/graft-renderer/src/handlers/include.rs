//! Fragment inclusion for `cms-include` elements.

use std::sync::Arc;

use graft_storage::Storage;

use crate::handler::{ElementHandler, Expansion, ExpansionRequest};
use crate::loader::{load_document, Substitutions};

/// Expands `cms-include` elements by embedding another template fragment.
///
/// The `src` attribute names the fragment to load. Relative sources are
/// resolved against the requesting document's directory when the request
/// carries one, otherwise against the storage root. The fragment passes
/// through the same placeholder substitutions as the including document.
pub struct IncludeHandler {
    storage: Arc<dyn Storage>,
    substitutions: Substitutions,
    locale: Option<String>,
}

impl IncludeHandler {
    pub fn new(storage: Arc<dyn Storage>, substitutions: Substitutions) -> Self {
        Self {
            storage,
            substitutions,
            locale: None,
        }
    }

    /// Prefer locale variants of included fragments when they exist.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl ElementHandler for IncludeHandler {
    fn handle(&self, request: &ExpansionRequest) -> Expansion {
        let Some(src) = request.input.attr("src").filter(|s| !s.is_empty()) else {
            return Expansion::Failed("missing src attribute on include element".to_owned());
        };
        let path = match &request.base_dir {
            Some(base) => format!("{base}/{src}"),
            None => src.to_owned(),
        };
        let path = match &self.locale {
            Some(locale) => self.storage.localize(&path, locale),
            None => path,
        };
        match load_document(self.storage.as_ref(), &path, &self.substitutions) {
            Ok(fragment) => {
                let root = fragment.export(fragment.root());
                Expansion::Expanded(vec![root])
            }
            Err(err) => Expansion::Failed(format!("failed to include {path}: {err}")),
        }
    }
}
