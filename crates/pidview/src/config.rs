//! Configuration types for PIDView viewports and overlays.
//!
//! All types implement [`serde::Deserialize`] and default every field, so a
//! partial TOML file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ViewportConfig`] - Zoom limits, zoom step and tile rebuild debounce.
//! - [`OverlayConfig`] - Overlay marker classes and selector-miss reporting.
//! - [`StyleConfig`] - Colors for the exported background, badges and highlights.
//!
//! # Example
//!
//! ```
//! # use pidview::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [viewport]
//!     max_scale = 4.0
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.viewport().max_scale(), 4.0);
//! assert_eq!(config.viewport().min_scale(), 0.1);
//! assert!(config.style().badge_fill().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use pidview_core::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Viewport configuration section.
    #[serde(default)]
    viewport: ViewportConfig,

    /// Overlay configuration section.
    #[serde(default)]
    overlay: OverlayConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(viewport: ViewportConfig, overlay: OverlayConfig, style: StyleConfig) -> Self {
        Self {
            viewport,
            overlay,
            style,
        }
    }

    /// Returns a copy with the viewport section replaced.
    pub fn with_viewport(self, viewport: ViewportConfig) -> Self {
        Self { viewport, ..self }
    }

    /// Returns the viewport configuration.
    pub fn viewport(&self) -> &ViewportConfig {
        &self.viewport
    }

    /// Returns the overlay configuration.
    pub fn overlay(&self) -> &OverlayConfig {
        &self.overlay
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Pan/zoom limits and tile rebuild timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    min_scale: f32,
    max_scale: f32,
    zoom_step: f32,
    debounce_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            zoom_step: 1.1,
            debounce_ms: 50,
        }
    }
}

impl ViewportConfig {
    /// Creates a new [`ViewportConfig`].
    ///
    /// # Arguments
    ///
    /// * `min_scale` - Smallest allowed scale, must be positive.
    /// * `max_scale` - Largest allowed scale.
    /// * `zoom_step` - Factor applied by one zoom step, greater than one.
    /// * `debounce_ms` - Delay before a tile rebuild after the last viewport change.
    pub fn new(min_scale: f32, max_scale: f32, zoom_step: f32, debounce_ms: u64) -> Self {
        Self {
            min_scale,
            max_scale,
            zoom_step,
            debounce_ms,
        }
    }

    pub fn min_scale(&self) -> f32 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f32 {
        self.max_scale
    }

    pub fn zoom_step(&self) -> f32 {
        self.zoom_step
    }

    /// Returns the tile rebuild debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Checks that the limits describe a usable, non-empty scale range.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return Err(format!(
                "viewport.min_scale must be positive, got {}",
                self.min_scale
            ));
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            return Err(format!(
                "viewport.max_scale must be at least min_scale ({}), got {}",
                self.min_scale, self.max_scale
            ));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(format!(
                "viewport.zoom_step must be greater than 1, got {}",
                self.zoom_step
            ));
        }
        Ok(())
    }
}

/// Overlay marker naming and selector-miss reporting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Append `missing selector '<sel>'` warnings for selectors matching nothing.
    record_selector_misses: bool,
    highlight_class: String,
    path_class: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            record_selector_misses: false,
            highlight_class: "pid-highlight".to_string(),
            path_class: "pid-path".to_string(),
        }
    }
}

impl OverlayConfig {
    /// Creates a new [`OverlayConfig`] with the default marker classes.
    pub fn new(record_selector_misses: bool) -> Self {
        Self {
            record_selector_misses,
            ..Self::default()
        }
    }

    pub fn record_selector_misses(&self) -> bool {
        self.record_selector_misses
    }

    /// Returns the class added to highlighted elements on export.
    pub fn highlight_class(&self) -> &str {
        &self.highlight_class
    }

    /// Returns the class added to elements on a highlighted path on export.
    pub fn path_class(&self) -> &str {
        &self.path_class
    }
}

/// Visual styling for exported views.
///
/// Colors are kept as strings and parsed on access so a bad value is
/// reported where it is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    badge_fill: String,
    badge_text: String,
    highlight_stroke: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            badge_fill: "#ffbf00".to_string(),
            badge_text: "black".to_string(),
            highlight_stroke: "#e4002b".to_string(),
        }
    }
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the badge fill [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn badge_fill(&self) -> Result<Color, String> {
        Color::new(&self.badge_fill).map_err(|err| format!("Invalid badge fill in config: {err}"))
    }

    /// Returns the badge label [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn badge_text(&self) -> Result<Color, String> {
        Color::new(&self.badge_text).map_err(|err| format!("Invalid badge text in config: {err}"))
    }

    /// Returns the highlight outline [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn highlight_stroke(&self) -> Result<Color, String> {
        Color::new(&self.highlight_stroke)
            .map_err(|err| format!("Invalid highlight stroke in config: {err}"))
    }
}
