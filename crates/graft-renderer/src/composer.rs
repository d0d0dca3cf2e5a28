//! Page composition pipeline.
//!
//! A page file carries its own metadata and body; its `cms:template` meta
//! names a layout as `<design>/<layout>`. Composition loads both documents,
//! merges the page into the layout, expands custom elements, and resolves
//! placement directives. The result is one finished document plus any
//! warnings the pipeline produced along the way.

use std::sync::Arc;

use graft_dom::{Document, parse_document};
use graft_storage::Storage;

use crate::error::RenderError;
use crate::expand::{ElementExpander, MAX_EXPANSION_PASSES};
use crate::handler::{ElementHandler, HandlerRegistry, event_name};
use crate::handlers::IncludeHandler;
use crate::loader::{Substitutions, load_document};
use crate::merge::merge_children;
use crate::meta::PageMeta;
use crate::reshuffle::reshuffle;

/// Tag of the built-in include element.
const INCLUDE_TAG: &str = "cms-include";

/// Settings for a [`PageComposer`].
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Locale tag in `xx-YY` form, used for file negotiation and the
    /// `{{locale}}` and `{{lang}}` placeholders. `None` disables both.
    pub locale: Option<String>,
    /// Directory inside the design storage that holds the designs.
    /// Empty means the storage root.
    pub design_root: String,
    /// Public URL prefix under which design directories are served.
    pub design_url_root: String,
    /// Tag of the layout element that receives the page body.
    pub content_slot: String,
    /// Upper bound on expansion passes per document.
    pub max_passes: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            locale: None,
            design_root: String::new(),
            design_url_root: "/designs".to_owned(),
            content_slot: "cms-content".to_owned(),
            max_passes: MAX_EXPANSION_PASSES,
        }
    }
}

/// Finished composition output.
#[derive(Debug)]
pub struct ComposeResult {
    /// The composed document, ready for serialization.
    pub document: Document,
    /// Human-readable warnings; composition succeeded despite them.
    pub warnings: Vec<String>,
}

/// A resolved layout reference.
struct Layout {
    /// Storage path of the layout file, locale negotiated.
    file: String,
    /// Directory of the design, for resolving relative includes.
    dir: String,
    /// Public URL of the design directory, the `{{designPath}}` value.
    url: String,
}

/// Composes page files into finished documents.
///
/// Pages and designs live in separate storages so a private page tree can
/// reference layouts from a public asset tree. Handlers registered through
/// [`PageComposer::with_handler`] expand custom elements; an include
/// handler for `cms-include` is supplied automatically unless the caller
/// registers their own.
pub struct PageComposer {
    pages: Arc<dyn Storage>,
    designs: Arc<dyn Storage>,
    registry: HandlerRegistry,
    config: ComposerConfig,
}

impl PageComposer {
    /// Create a composer with default configuration and no handlers.
    pub fn new(pages: Arc<dyn Storage>, designs: Arc<dyn Storage>) -> Self {
        Self {
            pages,
            designs,
            registry: HandlerRegistry::new(),
            config: ComposerConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an expansion handler for a custom element tag.
    #[must_use]
    pub fn with_handler(mut self, tag: impl Into<String>, handler: Arc<dyn ElementHandler>) -> Self {
        self.registry.register(tag, handler);
        self
    }

    /// Map a request URL path to a page storage path.
    ///
    /// A path without an `.html` suffix is treated as a directory request
    /// and probed for an index file first, then as a bare page name. Returns
    /// `None` when no page file exists for the path.
    #[must_use]
    pub fn find_page(&self, url_path: &str) -> Option<String> {
        let path = url_path.split(['?', '#']).next().unwrap_or(url_path);
        let trimmed = path.trim_matches('/');

        if !trimmed.ends_with(".html") {
            let index = if trimmed.is_empty() {
                "index.html".to_owned()
            } else {
                format!("{trimmed}/index.html")
            };
            if self.pages.exists(&index) {
                return Some(index);
            }
            if trimmed.is_empty() {
                return None;
            }
        }

        let file = if trimmed.ends_with(".html") {
            trimmed.to_owned()
        } else {
            format!("{trimmed}.html")
        };
        self.pages.exists(&file).then_some(file)
    }

    /// Compose the page at `path` into a finished document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Storage`] when the page cannot be read,
    /// [`RenderError::TemplateNotFound`] when the page names a layout that
    /// does not exist, and [`RenderError::Parse`] when either document
    /// yields no element tree.
    pub fn compose(&self, path: &str) -> Result<ComposeResult, RenderError> {
        let content_path = self.localize(self.pages.as_ref(), path);
        let raw = self.pages.read(&content_path)?;
        let meta = PageMeta::parse(&raw);

        let layout = match meta.template() {
            Some(template) => Some(self.locate_layout(template)?),
            None => None,
        };
        let substitutions = self.substitutions(layout.as_ref());

        let mut content =
            parse_document(&substitutions.apply(&raw)).map_err(|source| RenderError::Parse {
                path: content_path.clone(),
                source,
            })?;

        let (mut document, base_dir) = match &layout {
            Some(layout) => {
                let mut document =
                    load_document(self.designs.as_ref(), &layout.file, &substitutions)?;
                merge_children(&mut document, &mut content, "head", "head");
                merge_children(&mut document, &mut content, "body", &self.config.content_slot);
                (document, Some(layout.dir.clone()))
            }
            None => (content, None),
        };

        let root = document.root();
        document.set_attr(root, "lang", self.config.locale.as_deref().unwrap_or("en"));

        let registry = self.request_registry(&substitutions);
        let mut expander =
            ElementExpander::new(&registry).with_max_passes(self.config.max_passes);
        if let Some(dir) = base_dir {
            expander = expander.with_base_dir(dir);
        }
        let report = expander.expand(&mut document);

        let mut warnings = Vec::new();
        if report.ceiling_reached {
            warnings.push(format!(
                "expansion stopped after {} passes with custom elements still pending",
                report.passes
            ));
        }

        reshuffle(&mut document);

        Ok(ComposeResult {
            document,
            warnings,
        })
    }

    /// Resolve a `<design>/<layout>` template reference to a layout file.
    ///
    /// Only the first two path segments count and each is reduced to its
    /// base name, so a reference cannot climb out of the design root. A
    /// reference without a layout segment falls back to `index`.
    fn locate_layout(&self, template: &str) -> Result<Layout, RenderError> {
        let mut segments = template.splitn(3, '/');
        let design = basename(segments.next().unwrap_or_default());
        let layout = basename(segments.next().unwrap_or("index"));

        let dir = if self.config.design_root.is_empty() {
            design.to_owned()
        } else {
            format!("{}/{design}", self.config.design_root)
        };
        let file = format!("{dir}/{layout}.html");
        if !self.designs.exists(&file) {
            return Err(RenderError::TemplateNotFound(file));
        }

        Ok(Layout {
            file: self.localize(self.designs.as_ref(), &file),
            dir,
            url: format!("{}/{design}", self.config.design_url_root),
        })
    }

    fn localize(&self, storage: &dyn Storage, path: &str) -> String {
        match &self.config.locale {
            Some(locale) => storage.localize(path, locale),
            None => path.to_owned(),
        }
    }

    fn substitutions(&self, layout: Option<&Layout>) -> Substitutions {
        let locale = self.config.locale.as_deref();
        let mut substitutions = Substitutions::new()
            .with_locale(locale.unwrap_or("en-US"))
            .with_lang(primary_language(locale.unwrap_or("en")));
        if let Some(layout) = layout {
            substitutions = substitutions.with_design_path(layout.url.clone());
        }
        substitutions
    }

    /// Registry for one composition, with the include handler filled in
    /// unless the caller claimed the tag.
    fn request_registry(&self, substitutions: &Substitutions) -> HandlerRegistry {
        let mut registry = self.registry.clone();
        if registry.resolve(&event_name(INCLUDE_TAG)).is_none() {
            let mut include =
                IncludeHandler::new(Arc::clone(&self.designs), substitutions.clone());
            if let Some(locale) = &self.config.locale {
                include = include.with_locale(locale.clone());
            }
            registry.register(INCLUDE_TAG, Arc::new(include));
        }
        registry
    }
}

/// Last path segment, `basename` style.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Primary language subtag of a locale tag.
fn primary_language(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}
