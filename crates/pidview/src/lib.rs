//! PIDView - A pan/zoom viewport and overlay compositor for P&ID diagrams
//!
//! This library loads large schematic diagrams (SVG), resolves the bounding
//! box of every element, and keeps an interactive view over them: pan and
//! zoom with a debounced visibility tile, plus overlays that highlight
//! elements, trace paths and place badges on behalf of an upstream
//! selection system.
//!
//! The entry point is [`DiagramViewport`]. The host drives it: it fetches
//! diagram markup and overlay data, forwards input events with a timestamp,
//! and calls [`DiagramViewport::tick`] to run deferred work.
//!
//! # Examples
//!
//! ```
//! use std::time::Instant;
//!
//! use pidview::{
//!     DiagramViewport,
//!     geometry::Size,
//!     overlay::Overlay,
//!     source::{MemorySource, SourceId},
//! };
//!
//! let source = MemorySource::new().with(
//!     "P-001",
//!     r#"<svg viewBox="0 0 100 50"><rect id="V201A" width="10" height="10"/></svg>"#,
//! );
//!
//! let mut view = DiagramViewport::default();
//! view.set_container_size(Size::new(200.0, 100.0), Instant::now());
//! view.load_from(&source, SourceId::new("P-001")).unwrap();
//!
//! let warnings = view.set_overlay(&Overlay::new().with_highlight("#V201A"));
//! assert!(warnings.is_empty());
//! assert_eq!(view.viewport().scale(), 2.0);
//! ```

pub mod accessibility;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod export;
pub mod overlay;
pub mod resolve;
pub mod source;
pub mod tiler;
pub mod validate;
pub mod viewport;

mod error;

pub use pidview_core::{color, draw, geometry, scene, selector};

pub use controller::{DiagramViewport, InputEvent, LoadOutcome, LoadTicket, OverlayTicket};
pub use error::PidviewError;
