//! Overlay composition.
//!
//! An [`Overlay`] names elements to highlight, badges to place and
//! warnings to pass through to the host. Composition is split in two:
//!
//! - [`compose`] is a pure function from a scene and an overlay to an
//!   [`OverlayRender`]: per-element [`Marker`]s, a badge layer description,
//!   and the deduplicated warnings.
//! - [`MountedDiagram`] is the thin mutable boundary that stores the applied
//!   result. It always clears the previous overlay before applying a new
//!   one, so stale annotations never survive a re-application.

mod compose;
mod model;
mod mount;

pub use compose::{Badge, ComposeOptions, Marker, OverlayRender, compose};
pub use model::{BadgeKind, BadgeSpec, Overlay, PathHighlight};
pub use mount::{MountedDiagram, apply_overlay};

pub(crate) use model::dedup;
