//! Built-in expansion handlers.

mod include;
mod vars;

pub use include::IncludeHandler;
pub use vars::VarsHandler;
