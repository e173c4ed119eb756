//! # PIDView Parser
//!
//! Loads P&ID diagram markup (SVG) into a [`Scene`] graph. This crate owns
//! everything that reads text: the document loader, the `transform`
//! attribute grammar, and path-data measurement.
//!
//! ## Usage
//!
//! ```
//! # use pidview_parser::{parse, ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50">
//!             <rect id="P-101" x="10" y="10" width="20" height="10"/>
//!         </svg>
//!     "#;
//!
//!     let scene = parse(source)?;
//!     assert_eq!(scene.frame().width(), 100.0);
//!     Ok(())
//! }
//! ```

pub mod error;
mod loader;
#[cfg(test)]
mod loader_tests;
mod number;
mod path_data;
mod transform;

pub use error::{Diagnostic, ErrorCode, ParseError, Severity};
pub use path_data::path_bounds;
pub use transform::parse_transform;

use pidview_core::scene::Scene;

/// Parse SVG markup into a scene graph.
///
/// Every element of the document becomes a scene element with its
/// attributes, its parsed `transform`, and, where the element has a
/// measurable shape, its local bounding box. The root `<svg>` must declare
/// a coordinate frame through `viewBox` or `width`/`height`.
///
/// # Errors
///
/// Returns a [`ParseError`] if the markup is malformed, has no single
/// `<svg>` root, or the root frame is missing or invalid. Problems confined
/// to one attribute are logged as warnings instead.
pub fn parse(source: &str) -> Result<Scene, ParseError> {
    loader::load(source).map_err(ParseError::from)
}
