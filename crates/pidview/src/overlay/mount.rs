//! Mounted diagrams: the mutable boundary the compositor writes into.

use std::collections::BTreeMap;

use log::{debug, info};

use pidview_core::scene::{ElementIndex, Scene};

use super::{
    compose::{Badge, ComposeOptions, Marker, compose},
    model::Overlay,
};
use crate::{
    accessibility::{self, AccessibleLabel},
    resolve::BoundsIndex,
};

/// A loaded scene together with its derived per-load state and the
/// currently applied overlay.
///
/// Everything here is rebuilt from scratch on every load; nothing carries
/// over from a previous scene.
#[derive(Debug)]
pub struct MountedDiagram {
    scene: Scene,
    index: BoundsIndex,
    labels: Vec<AccessibleLabel>,
    markers: BTreeMap<ElementIndex, Vec<Marker>>,
    badge_layer: Option<Vec<Badge>>,
}

impl MountedDiagram {
    /// Mounts a scene, resolving its bounds and accessibility labels.
    pub fn new(scene: Scene) -> Self {
        let index = BoundsIndex::build(&scene);
        let labels = accessibility::annotate(&scene);
        Self {
            scene,
            index,
            labels,
            markers: BTreeMap::new(),
            badge_layer: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn index(&self) -> &BoundsIndex {
        &self.index
    }

    /// Returns the accessibility labels computed at mount time.
    pub fn labels(&self) -> &[AccessibleLabel] {
        &self.labels
    }

    /// Returns the overlay markers on an element.
    pub fn markers(&self, element: ElementIndex) -> &[Marker] {
        self.markers.get(&element).map_or(&[], Vec::as_slice)
    }

    /// Returns every marked element in document order.
    pub fn marked_elements(&self) -> impl Iterator<Item = ElementIndex> + '_ {
        self.markers.keys().copied()
    }

    /// Returns the badge layer, if an overlay has been applied.
    pub fn badge_layer(&self) -> Option<&[Badge]> {
        self.badge_layer.as_deref()
    }

    /// Removes every marker and the badge layer.
    pub fn clear_overlay(&mut self) {
        self.markers.clear();
        self.badge_layer = None;
    }

    /// Replaces the applied overlay with `overlay` and returns its warnings.
    ///
    /// Prior markers and the prior badge layer are cleared first, so applying
    /// the same overlay twice leaves the same state as applying it once.
    pub fn apply_overlay(&mut self, overlay: &Overlay, options: ComposeOptions) -> Vec<String> {
        self.clear_overlay();

        let render = compose(&self.scene, &self.index, overlay, options);
        let (markers, badges, warnings) = render.into_parts();
        info!(
            marked = markers.len(),
            badges = badges.len(),
            warnings = warnings.len();
            "Applied overlay"
        );

        self.markers = markers;
        self.badge_layer = Some(badges);
        warnings
    }
}

/// Applies `overlay` to a possibly absent mounted diagram.
///
/// Without a mounted diagram the call does nothing and returns no warnings.
pub fn apply_overlay(
    mounted: Option<&mut MountedDiagram>,
    overlay: &Overlay,
    options: ComposeOptions,
) -> Vec<String> {
    match mounted {
        Some(diagram) => diagram.apply_overlay(overlay, options),
        None => {
            debug!("No diagram mounted, skipping overlay");
            Vec::new()
        }
    }
}
