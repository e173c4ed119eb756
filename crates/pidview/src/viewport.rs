//! Pan/zoom state mapping document coordinates to screen pixels.
//!
//! A [`Viewport`] represents the affine map `screen = document * scale + translate`.
//! The scale is kept inside the configured `[min_scale, max_scale]` range by
//! every operation; the translation is unconstrained, and
//! [`fit_to_screen`](Viewport::fit_to_screen) or [`reset`](Viewport::reset)
//! recover from any off-screen state.
//!
//! # Example
//!
//! ```
//! # use pidview::viewport::Viewport;
//! # use pidview::config::ViewportConfig;
//! # use pidview_core::geometry::{Bounds, Point, Size};
//! let mut viewport = Viewport::new(&ViewportConfig::default());
//! let frame = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 50.0));
//!
//! viewport.fit_to_screen(Size::new(200.0, 100.0), frame);
//! assert_eq!(viewport.scale(), 2.0);
//! assert_eq!(viewport.translate(), Point::new(0.0, 0.0));
//! ```

use log::trace;

use pidview_core::geometry::{Bounds, Point, Size, Transform};

use crate::config::ViewportConfig;

/// Direction of a zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Magnify: multiplies the scale by the zoom step.
    In,
    /// Shrink: divides the scale by the zoom step.
    Out,
}

/// Pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
    translate: Point,
    min_scale: f32,
    max_scale: f32,
    zoom_step: f32,
}

impl Viewport {
    /// Creates an identity viewport with the configured limits.
    pub fn new(config: &ViewportConfig) -> Self {
        let mut viewport = Self {
            scale: 1.0,
            translate: Point::default(),
            min_scale: config.min_scale(),
            max_scale: config.max_scale(),
            zoom_step: config.zoom_step(),
        };
        viewport.scale = viewport.clamp(1.0);
        viewport
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    /// Returns the document-to-screen transform.
    pub fn transform(&self) -> Transform {
        Transform::new(
            self.scale,
            0.0,
            0.0,
            self.scale,
            self.translate.x(),
            self.translate.y(),
        )
    }

    /// Scales and centres `frame` to fit inside `container`.
    ///
    /// The scale is the smaller of the two axis ratios, so the whole frame is
    /// visible without distortion and fills the container exactly along the
    /// limiting axis. Returns `false` and leaves the state unchanged if the
    /// container or frame has no area.
    pub fn fit_to_screen(&mut self, container: Size, frame: Bounds) -> bool {
        if container.is_empty() || frame.to_size().is_empty() {
            trace!(container:?, frame:?; "Skipping fit for degenerate size");
            return false;
        }

        let scale = self.clamp(
            (container.width() / frame.width()).min(container.height() / frame.height()),
        );
        let offset_x = (container.width() - frame.width() * scale) / 2.0;
        let offset_y = (container.height() - frame.height() * scale) / 2.0;

        self.scale = scale;
        self.translate = Point::new(
            offset_x - frame.min_x() * scale,
            offset_y - frame.min_y() * scale,
        );
        true
    }

    /// Returns to scale 1 with no translation.
    pub fn reset(&mut self) {
        self.scale = self.clamp(1.0);
        self.translate = Point::default();
    }

    /// Zooms one step while keeping the document point under `anchor` fixed.
    ///
    /// `anchor` is in screen coordinates. At the scale limits the step is
    /// clamped, and a step that cannot change the scale is a no-op.
    pub fn zoom_at(&mut self, anchor: Point, direction: ZoomDirection) {
        let target = match direction {
            ZoomDirection::In => self.scale * self.zoom_step,
            ZoomDirection::Out => self.scale / self.zoom_step,
        };
        let scale = self.clamp(target);
        if scale == self.scale {
            return;
        }
        let ratio = scale / self.scale;

        // t' = p - ratio * (p - t)
        self.translate = anchor.sub_point(anchor.sub_point(self.translate).scale(ratio));
        self.scale = scale;
    }

    /// Moves the view by a screen-space delta.
    pub fn pan_by(&mut self, delta: Point) {
        self.translate = self.translate.add_point(delta);
    }

    /// Zooms one step anchored at the screen origin.
    pub fn keyboard_zoom(&mut self, direction: ZoomDirection) {
        self.zoom_at(Point::default(), direction);
    }

    /// Maps a screen point to document coordinates.
    pub fn screen_to_document(&self, point: Point) -> Point {
        point.sub_point(self.translate).scale(1.0 / self.scale)
    }

    /// Maps a document point to screen coordinates.
    pub fn document_to_screen(&self, point: Point) -> Point {
        point.scale(self.scale).add_point(self.translate)
    }

    fn clamp(&self, scale: f32) -> f32 {
        if scale.is_finite() {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            self.max_scale
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}
