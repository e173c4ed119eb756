//! Root-space bounding boxes for scene elements.
//!
//! An element's root-space box is its local box mapped through its own
//! transform and then through each ancestor's transform, outward to the
//! root. [`BoundsIndex`] computes the cumulative transform matrix (CTM) of
//! every element once per load, walking the arena in document order so each
//! parent's CTM is ready before its children need it.

use std::fmt;

use log::debug;

use pidview_core::{
    geometry::{Bounds, Transform},
    scene::{ElementIndex, Scene},
};

/// One measurable element and its root-space box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    element: ElementIndex,
    bounds: Bounds,
}

impl IndexEntry {
    pub fn element(&self) -> ElementIndex {
        self.element
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Flattened index of resolved bounding boxes, in document order.
///
/// Only rendered, measurable elements have entries. The index is immutable
/// and belongs to the scene it was built from.
#[derive(Clone, Default)]
pub struct BoundsIndex {
    ctm: Vec<Transform>,
    resolved: Vec<Option<Bounds>>,
    entries: Vec<IndexEntry>,
}

impl fmt::Debug for BoundsIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundsIndex")
            .field("elements", &self.ctm.len())
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl BoundsIndex {
    /// Resolves every element of `scene`.
    pub fn build(scene: &Scene) -> Self {
        let mut ctm: Vec<Transform> = Vec::with_capacity(scene.len());
        let mut resolved = Vec::with_capacity(scene.len());
        let mut entries = Vec::new();

        for (index, element) in scene.iter() {
            let inherited = element
                .parent()
                .map_or_else(Transform::identity, |parent| ctm[parent.get()]);
            let own = inherited.then_apply(&element.transform());
            ctm.push(own);

            let bounds = element
                .local_bounds()
                .filter(|_| element.is_rendered())
                .map(|local| own.apply_to_bounds(local));
            if let Some(bounds) = bounds {
                entries.push(IndexEntry {
                    element: index,
                    bounds,
                });
            }
            resolved.push(bounds);
        }

        debug!(
            elements = scene.len(),
            indexed = entries.len(),
            excluded = scene.len() - entries.len();
            "Resolved element bounds"
        );

        Self {
            ctm,
            resolved,
            entries,
        }
    }

    /// Returns the root-space box of an element, or `None` if it is not indexed.
    pub fn bounds(&self, element: ElementIndex) -> Option<Bounds> {
        self.resolved.get(element.get()).copied().flatten()
    }

    /// Returns the cumulative transform mapping an element's local
    /// coordinates to root coordinates.
    pub fn ctm(&self, element: ElementIndex) -> Transform {
        self.ctm
            .get(element.get())
            .copied()
            .unwrap_or_default()
    }

    /// Returns the indexed elements in document order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves a single element by walking its ancestor chain.
///
/// Equivalent to [`BoundsIndex::bounds`] without the cache. Returns `None`
/// for unmeasurable and non-rendered elements.
pub fn resolve(scene: &Scene, element: ElementIndex) -> Option<Bounds> {
    let target = scene.element(element);
    if !target.is_rendered() {
        return None;
    }
    let local = target.local_bounds()?;

    let ctm = scene
        .ancestors(element)
        .fold(target.transform(), |acc, ancestor| {
            scene.element(ancestor).transform().then_apply(&acc)
        });
    Some(ctm.apply_to_bounds(local))
}
