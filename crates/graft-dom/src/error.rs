//! Parse error type.

use thiserror::Error;

/// Error returned when no usable tree can be recovered from the input.
///
/// The parser is lenient by design: malformed markup degrades to a
/// best-effort tree. Only input from which no element at all can be
/// recovered fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input contained no elements.
    #[error("document contains no elements")]
    NoRoot,
}
