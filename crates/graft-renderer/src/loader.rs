//! Document loading with placeholder substitution.
//!
//! Page and template sources carry three literal placeholder tokens
//! (`{{designPath}}`, `{{locale}}`, `{{lang}}`) that are replaced on the raw
//! text before parsing. Replacement is plain substring substitution;
//! replacement values containing the placeholder syntax are the caller's
//! problem.

use graft_dom::{Document, parse_document};
use graft_storage::Storage;

use crate::error::RenderError;

/// Replacement values for the placeholder tokens.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    design_path: String,
    locale: String,
    lang: String,
}

impl Substitutions {
    /// Create an empty substitution table; unknown tokens become empty strings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for `{{designPath}}`.
    #[must_use]
    pub fn with_design_path(mut self, design_path: impl Into<String>) -> Self {
        self.design_path = design_path.into();
        self
    }

    /// Set the value for `{{locale}}`.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the value for `{{lang}}`.
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Replace every placeholder token in `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        text.replace("{{designPath}}", &self.design_path)
            .replace("{{locale}}", &self.locale)
            .replace("{{lang}}", &self.lang)
    }
}

/// Read a document from storage, substitute placeholders, and parse it.
///
/// # Errors
///
/// Returns [`RenderError::Storage`] when the path cannot be read and
/// [`RenderError::Parse`] when no element tree can be recovered from it.
pub fn load_document(
    storage: &dyn Storage,
    path: &str,
    substitutions: &Substitutions,
) -> Result<Document, RenderError> {
    let raw = storage.read(path)?;
    let prepared = substitutions.apply(&raw);
    parse_document(&prepared).map_err(|source| RenderError::Parse {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use graft_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_apply_replaces_all_tokens() {
        let substitutions = Substitutions::new()
            .with_design_path("/design/acme")
            .with_locale("cs-CZ")
            .with_lang("cs");

        let out = substitutions.apply(
            r#"<link href="{{designPath}}/main.css"><html lang="{{lang}}">{{locale}}</html>"#,
        );

        assert_eq!(
            out,
            r#"<link href="/design/acme/main.css"><html lang="cs">cs-CZ</html>"#
        );
    }

    #[test]
    fn test_apply_repeated_tokens() {
        let substitutions = Substitutions::new().with_lang("en");

        assert_eq!(substitutions.apply("{{lang}}-{{lang}}"), "en-en");
    }

    #[test]
    fn test_empty_table_blanks_tokens() {
        let substitutions = Substitutions::new();

        assert_eq!(substitutions.apply("a{{locale}}b"), "ab");
    }

    #[test]
    fn test_load_document_substitutes_before_parse() {
        let storage = MockStorage::new()
            .with_file("page.html", r#"<html lang="{{lang}}"><body>x</body></html>"#);
        let substitutions = Substitutions::new().with_lang("en");

        let doc = load_document(&storage, "page.html", &substitutions).unwrap();

        assert_eq!(doc.attr(doc.root(), "lang"), Some("en"));
    }

    #[test]
    fn test_load_document_missing_file() {
        let storage = MockStorage::new();

        let err = load_document(&storage, "nope.html", &Substitutions::new()).unwrap_err();

        assert!(matches!(err, RenderError::Storage(_)));
    }

    #[test]
    fn test_load_document_unparseable() {
        let storage = MockStorage::new().with_file("empty.html", "");

        let err = load_document(&storage, "empty.html", &Substitutions::new()).unwrap_err();

        assert!(matches!(err, RenderError::Parse { .. }));
    }
}
