//! Visibility culling: which elements fall inside the current view.
//!
//! The visible rectangle is the container mapped back into document space.
//! A [`Tile`] is the subsequence of the [`BoundsIndex`] whose boxes overlap
//! that rectangle, kept in document order so stacking is unchanged.

use log::debug;

use pidview_core::{
    geometry::{Bounds, Point, Size},
    scene::ElementIndex,
};

use crate::{resolve::BoundsIndex, viewport::Viewport};

/// Elements selected for rendering at one viewport state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tile {
    visible: Option<Bounds>,
    elements: Vec<ElementIndex>,
}

impl Tile {
    /// Returns the document-space rectangle the tile was cut from, if any.
    pub fn visible(&self) -> Option<Bounds> {
        self.visible
    }

    /// Returns the selected elements in document order.
    pub fn elements(&self) -> &[ElementIndex] {
        &self.elements
    }

    pub fn contains(&self, element: ElementIndex) -> bool {
        self.elements.binary_search(&element).is_ok()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Returns the document-space rectangle shown in `container`.
///
/// Returns `None` for a container with no area.
pub fn visible_rect(viewport: &Viewport, container: Size) -> Option<Bounds> {
    if container.is_empty() {
        return None;
    }
    let scale = viewport.scale();
    let origin = Point::new(
        -viewport.translate().x() / scale,
        -viewport.translate().y() / scale,
    );
    Some(Bounds::new_from_top_left(origin, container.scale(1.0 / scale)))
}

/// Selects the indexed elements overlapping `rect`, in document order.
pub fn cull(index: &BoundsIndex, rect: Bounds) -> Tile {
    let elements = index
        .entries()
        .iter()
        .filter(|entry| entry.bounds().intersects(&rect))
        .map(|entry| entry.element())
        .collect();
    Tile {
        visible: Some(rect),
        elements,
    }
}

/// Builds the tile for a viewport and container.
///
/// An unmeasured container yields an empty tile.
pub fn build_tile(index: &BoundsIndex, viewport: &Viewport, container: Size) -> Tile {
    let Some(rect) = visible_rect(viewport, container) else {
        debug!("Container has no area, tile is empty");
        return Tile::default();
    };
    let tile = cull(index, rect);
    debug!(
        visible = tile.len(),
        indexed = index.len(),
        rect:? = rect;
        "Rebuilt tile"
    );
    tile
}

#[cfg(test)]
mod tests {
    use pidview_core::scene::{ElementData, Scene, SceneBuilder};

    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Bounds {
        Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h))
    }

    /// A 10x10 grid of 5x5 cells spaced 10 units apart.
    fn grid() -> (Scene, Vec<ElementIndex>) {
        let mut builder = SceneBuilder::new();
        let root = builder.push(None, ElementData::new("svg"));
        let mut cells = Vec::new();
        for row in 0..10 {
            for col in 0..10 {
                let bounds = rect(col as f32 * 10.0, row as f32 * 10.0, 5.0, 5.0);
                cells.push(builder.push(
                    Some(root),
                    ElementData::new("rect").with_local_bounds(bounds),
                ));
            }
        }
        (builder.finish(root, rect(0.0, 0.0, 100.0, 100.0)), cells)
    }

    #[test]
    fn test_visible_rect() {
        let mut viewport = Viewport::default();
        viewport.fit_to_screen(Size::new(200.0, 100.0), rect(0.0, 0.0, 100.0, 50.0));
        assert_eq!(
            visible_rect(&viewport, Size::new(200.0, 100.0)),
            Some(rect(0.0, 0.0, 100.0, 50.0))
        );

        viewport.pan_by(Point::new(-20.0, -10.0));
        assert_eq!(
            visible_rect(&viewport, Size::new(200.0, 100.0)),
            Some(rect(10.0, 5.0, 100.0, 50.0))
        );
    }

    #[test]
    fn test_zero_container_yields_empty_tile() {
        let (scene, _) = grid();
        let index = BoundsIndex::build(&scene);
        let tile = build_tile(&index, &Viewport::default(), Size::new(0.0, 0.0));
        assert!(tile.is_empty());
        assert_eq!(tile.visible(), None);
    }

    #[test]
    fn test_grid_tile_is_exact() {
        let (scene, cells) = grid();
        let index = BoundsIndex::build(&scene);

        // Covers columns 2..=4 and rows 1..=2 (cells start at multiples of 10)
        let view = rect(22.0, 12.0, 25.0, 10.0);
        let tile = cull(&index, view);

        let expected: Vec<ElementIndex> = cells
            .iter()
            .copied()
            .filter(|cell| index.bounds(*cell).unwrap().intersects(&view))
            .collect();
        assert_eq!(expected.len(), 6);
        assert_eq!(tile.elements(), expected.as_slice());
        assert!(tile.elements().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tile.visible(), Some(view));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let (scene, cells) = grid();
        let index = BoundsIndex::build(&scene);

        // Starts exactly where the first cell ends
        let tile = cull(&index, rect(5.0, 0.0, 5.0, 5.0));
        assert!(!tile.contains(cells[0]));
        assert!(!tile.contains(cells[1]));
    }
}
