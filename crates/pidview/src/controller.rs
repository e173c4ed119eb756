//! The diagram viewport controller.
//!
//! [`DiagramViewport`] wires the loader, viewport, tiler and overlay
//! compositor together behind a host-driven API. The host owns the event
//! loop and the clock: it forwards input with a timestamp, calls
//! [`tick`](DiagramViewport::tick) to run deferred tile rebuilds, and
//! performs fetches itself.
//!
//! Fetches are modelled as tickets. A ticket records the key and generation
//! current when the fetch started; a completion whose ticket has been
//! superseded (a newer load or overlay started, or the controller was torn
//! down) is discarded instead of overwriting fresher state.

use std::time::Instant;

use log::{debug, info, warn};

use pidview_core::geometry::{Point, Size};

use crate::{
    config::{AppConfig, ViewportConfig},
    debounce::Debouncer,
    error::PidviewError,
    export::{Exporter, ViewSnapshot, svg::SvgExporter},
    overlay::{ComposeOptions, MountedDiagram, Overlay, apply_overlay},
    source::{DiagramSource, FetchError, SourceId},
    tiler::{self, Tile},
    viewport::{Viewport, ZoomDirection},
};

/// Pointer and keyboard input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Wheel scroll at a screen position. Negative `delta_y` zooms in.
    Wheel { position: Point, delta_y: f32 },
    /// Pointer pressed at a screen position.
    DragStart(Point),
    /// Pointer moved to a screen position while pressed.
    DragMove(Point),
    DragEnd,
    /// Key press: `+`/`=` zoom in, `-` zoom out, `0` reset, `f` fit.
    Key(char),
}

/// Handle for an in-flight diagram fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    source: SourceId,
    generation: u64,
}

impl LoadTicket {
    pub fn source(&self) -> &SourceId {
        &self.source
    }
}

/// Handle for an in-flight overlay fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTicket {
    version: u64,
    generation: u64,
}

impl OverlayTicket {
    /// Returns the upstream data version the fetch was started for.
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Result of completing a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was applied.
    Applied,
    /// The ticket was superseded; the result was discarded.
    Stale,
}

/// An interactive diagram view.
///
/// Every instance owns its own scene, viewport and overlay; instances share
/// no state.
#[derive(Debug)]
pub struct DiagramViewport {
    config: AppConfig,
    viewport: Viewport,
    container: Size,
    mounted: Option<MountedDiagram>,
    overlay: Option<Overlay>,
    warnings: Vec<String>,
    tile: Tile,
    debouncer: Debouncer,
    drag_anchor: Option<Point>,
    source: Option<SourceId>,
    load_generation: u64,
    overlay_generation: u64,
    tile_rebuilds: usize,
    torn_down: bool,
}

impl Default for DiagramViewport {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl DiagramViewport {
    /// Creates an empty view with an identity viewport.
    pub fn new(config: AppConfig) -> Self {
        let config = match config.viewport().validate() {
            Ok(()) => config,
            Err(err) => {
                warn!(err:% = err; "Invalid viewport settings, using defaults");
                config.with_viewport(ViewportConfig::default())
            }
        };
        let viewport = Viewport::new(config.viewport());
        let debouncer = Debouncer::new(config.viewport().debounce());
        Self {
            config,
            viewport,
            container: Size::default(),
            mounted: None,
            overlay: None,
            warnings: Vec::new(),
            tile: Tile::default(),
            debouncer,
            drag_anchor: None,
            source: None,
            load_generation: 0,
            overlay_generation: 0,
            tile_rebuilds: 0,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Returns the mounted diagram, if a load has completed.
    pub fn mounted(&self) -> Option<&MountedDiagram> {
        self.mounted.as_ref()
    }

    /// Returns the source of the current or in-flight load.
    pub fn source(&self) -> Option<&SourceId> {
        self.source.as_ref()
    }

    /// Returns the warnings of the applied overlay, for display by the host.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    /// Returns how many times the tile has been rebuilt.
    pub fn tile_rebuilds(&self) -> usize {
        self.tile_rebuilds
    }

    /// Returns `true` if a tile rebuild is scheduled.
    pub fn rebuild_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Starts loading `source`.
    ///
    /// The current scene, its overlay and any in-flight overlay fetch are
    /// discarded immediately; nothing carries over to the new scene.
    pub fn begin_load(&mut self, source: SourceId) -> LoadTicket {
        if self.torn_down {
            return LoadTicket {
                source,
                generation: self.load_generation,
            };
        }

        self.load_generation += 1;
        self.overlay_generation += 1;
        self.overlay = None;
        self.unmount();
        info!(source = source.as_str(), generation = self.load_generation; "Loading diagram");

        self.source = Some(source.clone());
        LoadTicket {
            source,
            generation: self.load_generation,
        }
    }

    /// Completes a load started with [`begin_load`](Self::begin_load).
    ///
    /// On success the scene is mounted, fitted to the container and tiled.
    /// An overlay accepted while the fetch was in flight is applied to it.
    ///
    /// # Errors
    ///
    /// Returns [`PidviewError::Fetch`] or [`PidviewError::Parse`] if the
    /// load failed. The diagram area is left empty.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        markup: Result<String, FetchError>,
    ) -> Result<LoadOutcome, PidviewError> {
        if self.is_stale_load(&ticket) {
            debug!(source = ticket.source.as_str(); "Discarding stale diagram fetch");
            return Ok(LoadOutcome::Stale);
        }

        let markup = markup.inspect_err(|err| {
            warn!(source = ticket.source.as_str(), err:% = err; "Diagram fetch failed");
        })?;
        let scene = pidview_parser::parse(&markup)?;

        let mounted = MountedDiagram::new(scene);
        let frame = mounted.scene().frame();
        self.mounted = Some(mounted);
        if let Some(overlay) = self.overlay.take() {
            self.warnings = self.apply(&overlay);
            self.overlay = Some(overlay);
        }
        self.viewport.fit_to_screen(self.container, frame);
        self.rebuild_tile();

        info!(source = ticket.source.as_str(); "Diagram mounted");
        Ok(LoadOutcome::Applied)
    }

    /// Fetches and completes a load in one step.
    ///
    /// # Errors
    ///
    /// See [`finish_load`](Self::finish_load).
    pub fn load_from(
        &mut self,
        source: &dyn DiagramSource,
        id: SourceId,
    ) -> Result<LoadOutcome, PidviewError> {
        let ticket = self.begin_load(id);
        let markup = source.fetch(ticket.source());
        self.finish_load(ticket, markup)
    }

    /// Starts fetching overlay data for an upstream data `version`,
    /// superseding any overlay fetch already in flight.
    pub fn begin_overlay(&mut self, version: u64) -> OverlayTicket {
        if !self.torn_down {
            self.overlay_generation += 1;
        }
        OverlayTicket {
            version,
            generation: self.overlay_generation,
        }
    }

    /// Completes an overlay fetch and applies the overlay.
    ///
    /// Without a mounted diagram the overlay is kept and applied once the
    /// in-flight load completes.
    ///
    /// # Errors
    ///
    /// Returns [`PidviewError::Fetch`] if the overlay could not be fetched.
    /// The previous overlay is cleared and the diagram stays usable.
    pub fn finish_overlay(
        &mut self,
        ticket: OverlayTicket,
        overlay: Result<Overlay, FetchError>,
    ) -> Result<LoadOutcome, PidviewError> {
        if self.torn_down || ticket.generation != self.overlay_generation {
            debug!(version = ticket.version; "Discarding stale overlay fetch");
            return Ok(LoadOutcome::Stale);
        }

        let overlay = match overlay {
            Ok(overlay) => overlay,
            Err(err) => {
                warn!(version = ticket.version, err:% = err; "Overlay fetch failed");
                self.clear_overlay();
                return Err(err.into());
            }
        };

        self.warnings = self.apply(&overlay);
        self.overlay = Some(overlay);
        Ok(LoadOutcome::Applied)
    }

    /// Applies an overlay immediately, superseding any in-flight overlay fetch.
    ///
    /// Returns the overlay's warnings.
    pub fn set_overlay(&mut self, overlay: &Overlay) -> &[String] {
        if !self.torn_down {
            self.overlay_generation += 1;
            self.warnings = self.apply(overlay);
            self.overlay = Some(overlay.clone());
        }
        &self.warnings
    }

    /// Handles one input event and schedules a tile rebuild.
    ///
    /// Returns `false` if the event was ignored.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }

        let handled = match event {
            InputEvent::Wheel { position, delta_y } => {
                if delta_y < 0.0 {
                    self.viewport.zoom_at(position, ZoomDirection::In);
                } else if delta_y > 0.0 {
                    self.viewport.zoom_at(position, ZoomDirection::Out);
                }
                delta_y != 0.0
            }
            InputEvent::DragStart(position) => {
                self.drag_anchor = Some(position);
                false
            }
            InputEvent::DragMove(position) => match self.drag_anchor.replace(position) {
                Some(previous) => {
                    self.viewport.pan_by(position.sub_point(previous));
                    true
                }
                None => {
                    self.drag_anchor = None;
                    false
                }
            },
            InputEvent::DragEnd => {
                self.drag_anchor = None;
                false
            }
            InputEvent::Key('+' | '=') => {
                self.viewport.keyboard_zoom(ZoomDirection::In);
                true
            }
            InputEvent::Key('-') => {
                self.viewport.keyboard_zoom(ZoomDirection::Out);
                true
            }
            InputEvent::Key('0') => {
                self.viewport.reset();
                true
            }
            InputEvent::Key('f' | 'F') => self.fit_viewport(),
            InputEvent::Key(_) => false,
        };

        if handled {
            self.debouncer.trigger(now);
        }
        handled
    }

    /// Fits the diagram frame into the container.
    pub fn fit(&mut self, now: Instant) {
        if !self.torn_down && self.fit_viewport() {
            self.debouncer.trigger(now);
        }
    }

    /// Returns to scale 1 with no translation.
    pub fn reset(&mut self, now: Instant) {
        if !self.torn_down {
            self.viewport.reset();
            self.debouncer.trigger(now);
        }
    }

    /// Records a new container size.
    pub fn set_container_size(&mut self, size: Size, now: Instant) {
        if !self.torn_down {
            self.container = size;
            self.debouncer.trigger(now);
        }
    }

    /// Runs the pending tile rebuild if its deadline has passed.
    ///
    /// Returns `true` if the tile was rebuilt.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.torn_down || !self.debouncer.poll(now) {
            return false;
        }
        self.rebuild_tile();
        true
    }

    /// Stops the controller. Pending rebuilds are cancelled and every
    /// outstanding ticket becomes stale; later calls change nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.debouncer.cancel();
        self.load_generation += 1;
        self.overlay_generation += 1;
        self.drag_anchor = None;
        self.overlay = None;
        self.unmount();
        self.torn_down = true;
        info!("Diagram viewport torn down");
    }

    /// Exports the current view as an SVG document.
    ///
    /// # Errors
    ///
    /// Returns [`PidviewError::Export`] if no diagram is mounted or the
    /// configured styles are invalid.
    pub fn render_svg(&self) -> Result<String, PidviewError> {
        let Some(diagram) = self.mounted.as_ref() else {
            return Err(crate::export::Error::Render("no diagram mounted".to_string()).into());
        };

        let view = ViewSnapshot::new(diagram, &self.tile, &self.viewport, self.container);
        let mut exporter = SvgExporter::new(&self.config);
        exporter.export_view(&view)?;
        Ok(exporter.into_string())
    }

    fn is_stale_load(&self, ticket: &LoadTicket) -> bool {
        self.torn_down
            || ticket.generation != self.load_generation
            || self.source.as_ref() != Some(&ticket.source)
    }

    fn apply(&mut self, overlay: &Overlay) -> Vec<String> {
        let options = ComposeOptions {
            record_selector_misses: self.config.overlay().record_selector_misses(),
        };
        apply_overlay(self.mounted.as_mut(), overlay, options)
    }

    fn clear_overlay(&mut self) {
        self.overlay = None;
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.clear_overlay();
        }
        self.warnings.clear();
    }

    fn fit_viewport(&mut self) -> bool {
        match self.mounted.as_ref() {
            Some(mounted) => {
                let frame = mounted.scene().frame();
                self.viewport.fit_to_screen(self.container, frame)
            }
            None => false,
        }
    }

    fn unmount(&mut self) {
        self.mounted = None;
        self.warnings.clear();
        self.tile = Tile::default();
        self.debouncer.cancel();
    }

    fn rebuild_tile(&mut self) {
        self.tile = match self.mounted.as_ref() {
            Some(mounted) => tiler::build_tile(mounted.index(), &self.viewport, self.container),
            None => Tile::default(),
        };
        self.tile_rebuilds += 1;
    }
}
