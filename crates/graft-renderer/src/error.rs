//! Error types for page composition.

use graft_dom::ParseError;
use graft_storage::StorageError;

/// Error from the composition pipeline.
///
/// Handler failures are not errors at this level: a failed or unresolved
/// expansion freezes the element in place and the pipeline continues.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A page or template could not be read from storage.
    #[error("storage error")]
    Storage(#[from] StorageError),

    /// A document could not be parsed into a tree at all.
    #[error("parse error in {path}")]
    Parse {
        /// Storage path of the unparseable document.
        path: String,
        /// Underlying parse failure.
        source: ParseError,
    },

    /// The layout template named by the page does not exist.
    #[error("template not found: {0}")]
    TemplateNotFound(String),
}
