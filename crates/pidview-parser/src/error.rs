//! Error and diagnostic system for the PIDView loader.
//!
//! The loader reports problems as [`Diagnostic`]s carrying a severity, an
//! [`ErrorCode`], a message and optional help text. Fatal diagnostics are
//! wrapped in a [`ParseError`] and returned from [`parse`](crate::parse);
//! warnings (an unparseable `transform`, a malformed `d` attribute) are logged
//! and the affected attribute degrades gracefully.
//!
//! # Example
//!
//! ```
//! # use pidview_parser::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("document has no root frame")
//!     .with_code(ErrorCode::E101)
//!     .with_help("add a `viewBox` or `width`/`height` to the root `<svg>`");
//!
//! assert_eq!(diag.code(), Some(ErrorCode::E101));
//! ```

mod diagnostic;
mod error_code;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use parse_error::ParseError;
pub use severity::Severity;
