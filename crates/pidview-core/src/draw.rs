//! Drawing primitives shared by exporters.
//!
//! The [`layer`] system groups SVG nodes into z-ordered `data-layer` groups
//! so that overlay decorations always render above diagram content.

mod layer;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
