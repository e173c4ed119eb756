//! PIDView Core Types
//!
//! This crate provides the foundational types shared by the PIDView loader,
//! viewport and overlay compositor:
//!
//! - **Geometry**: points, sizes, bounding boxes and affine transforms ([`geometry`])
//! - **Scene**: the arena-backed scene graph of a loaded diagram ([`scene`])
//! - **Selectors**: opaque element selectors used by overlay data ([`selector`])
//! - **Colors**: CSS color handling for overlay styling ([`color::Color`])
//! - **Draw**: z-ordered SVG layer output ([`draw`])

pub mod color;
pub mod draw;
pub mod geometry;
pub mod scene;
pub mod selector;
