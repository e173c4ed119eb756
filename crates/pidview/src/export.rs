//! Export of the current view.
//!
//! This module provides the [`Exporter`] trait that converts a
//! [`ViewSnapshot`] into an output format. The snapshot borrows everything
//! a backend needs: the mounted diagram with its applied overlay, the tile
//! of visible elements, and the viewport state.
//!
//! # Available Backends
//!
//! - [`svg`]: a standalone SVG document via [`svg::SvgExporter`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering rendering failures and I/O
//! errors. [`Error`] converts into [`PidviewError::Export`] at the crate
//! boundary.
//!
//! [`PidviewError::Export`]: crate::PidviewError::Export

/// SVG export backend.
pub mod svg;

use pidview_core::geometry::Size;

use crate::{overlay::MountedDiagram, tiler::Tile, viewport::Viewport};

/// Borrowed view state handed to an exporter.
#[derive(Debug, Clone, Copy)]
pub struct ViewSnapshot<'a> {
    diagram: &'a MountedDiagram,
    tile: &'a Tile,
    viewport: &'a Viewport,
    container: Size,
}

impl<'a> ViewSnapshot<'a> {
    pub fn new(
        diagram: &'a MountedDiagram,
        tile: &'a Tile,
        viewport: &'a Viewport,
        container: Size,
    ) -> Self {
        Self {
            diagram,
            tile,
            viewport,
            container,
        }
    }

    pub fn diagram(&self) -> &'a MountedDiagram {
        self.diagram
    }

    pub fn tile(&self) -> &'a Tile {
        self.tile
    }

    pub fn viewport(&self) -> &'a Viewport {
        self.viewport
    }

    /// Returns the output size: the container, or the diagram frame if the
    /// container has no area.
    pub fn output_size(&self) -> Size {
        if self.container.is_empty() {
            self.diagram.scene().frame().to_size()
        } else {
            self.container
        }
    }
}

/// Abstraction for view export backends.
pub trait Exporter {
    /// Exports a view snapshot to the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the view cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_view(&mut self, view: &ViewSnapshot<'_>) -> Result<(), Error>;
}

/// Errors that can occur during export.
///
/// This type is converted into [`PidviewError::Export`] at the crate
/// boundary via the [`From`] implementation in [`crate::error`].
///
/// [`PidviewError::Export`]: crate::PidviewError::Export
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
