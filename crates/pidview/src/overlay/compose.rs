//! Pure overlay composition: `(scene, overlay) -> render instructions`.

use std::collections::BTreeMap;

use log::debug;

use pidview_core::{geometry::Bounds, scene::{ElementIndex, Scene}, selector::Selector};

use super::model::{BadgeKind, Overlay, dedup};
use crate::resolve::BoundsIndex;

/// Decoration applied to a single diagram element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The element matched a highlight or path selector.
    Highlight,
    /// The element lies on the highlighted path with this id.
    Path(String),
}

/// A badge resolved to a concrete element and root-space box.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    selector: Selector,
    kind: BadgeKind,
    element: ElementIndex,
    bounds: Bounds,
}

impl Badge {
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn kind(&self) -> &BadgeKind {
        &self.kind
    }

    /// Returns the element the badge is attached to.
    pub fn element(&self) -> ElementIndex {
        self.element
    }

    /// Returns the root-space box the badge is sized and positioned to.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Options for [`compose`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeOptions {
    /// Append a `missing selector '<sel>'` warning for each selector that
    /// matches nothing.
    pub record_selector_misses: bool,
}

/// Everything needed to draw an overlay, independent of any render surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayRender {
    markers: BTreeMap<ElementIndex, Vec<Marker>>,
    badges: Vec<Badge>,
    warnings: Vec<String>,
}

impl OverlayRender {
    /// Returns the marked elements in document order with their markers.
    pub fn markers(&self) -> impl Iterator<Item = (ElementIndex, &[Marker])> {
        self.markers
            .iter()
            .map(|(element, markers)| (*element, markers.as_slice()))
    }

    /// Returns the markers on one element.
    pub fn markers_for(&self, element: ElementIndex) -> &[Marker] {
        self.markers.get(&element).map_or(&[], Vec::as_slice)
    }

    /// Returns the badge layer contents, in request order.
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// Returns the deduplicated warnings, in first-seen order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<ElementIndex, Vec<Marker>>, Vec<Badge>, Vec<String>) {
        (self.markers, self.badges, self.warnings)
    }
}

/// Composes `overlay` over `scene`.
///
/// 1. Highlight and path selector lists are deduplicated.
/// 2. Every element matching the union of highlight and path selectors gets
///    one [`Marker::Highlight`]; path members also get a [`Marker::Path`].
/// 3. Each badge request resolves to the first match of its selector and
///    takes that element's root-space box. Misses and unmeasurable targets
///    are skipped.
/// 4. Warnings are deduplicated in first-seen order.
pub fn compose(
    scene: &Scene,
    index: &BoundsIndex,
    overlay: &Overlay,
    options: ComposeOptions,
) -> OverlayRender {
    let overlay = overlay.normalized();
    let mut markers: BTreeMap<ElementIndex, Vec<Marker>> = BTreeMap::new();
    let mut misses: Vec<&Selector> = Vec::new();

    let union = overlay.highlight_union();
    for selector in &union {
        let matches = scene.select(selector);
        if matches.is_empty() {
            misses.push(selector);
        }
        for element in matches {
            add_marker(&mut markers, element, Marker::Highlight);
        }
    }

    for path in overlay.paths() {
        for selector in path.selectors() {
            for element in scene.select(selector) {
                add_marker(&mut markers, element, Marker::Path(path.id().to_string()));
            }
        }
    }

    let mut badges = Vec::new();
    for request in overlay.badges() {
        let Some(element) = scene.select_first(request.selector()) else {
            debug!(selector = request.selector().as_str(); "Badge selector matches nothing");
            misses.push(request.selector());
            continue;
        };
        let Some(bounds) = index.bounds(element) else {
            debug!(selector = request.selector().as_str(); "Badge target is not measurable");
            continue;
        };
        badges.push(Badge {
            selector: request.selector().clone(),
            kind: request.kind().clone(),
            element,
            bounds,
        });
    }

    let mut warnings = overlay.warnings().to_vec();
    if options.record_selector_misses {
        warnings.extend(
            dedup(&misses)
                .into_iter()
                .map(|selector| format!("missing selector '{selector}'")),
        );
    }
    let warnings = dedup(&warnings);

    debug!(
        marked = markers.len(),
        badges = badges.len(),
        misses = misses.len(),
        warnings = warnings.len();
        "Composed overlay"
    );

    OverlayRender {
        markers,
        badges,
        warnings,
    }
}

fn add_marker(markers: &mut BTreeMap<ElementIndex, Vec<Marker>>, element: ElementIndex, marker: Marker) {
    let entry = markers.entry(element).or_default();
    if !entry.contains(&marker) {
        entry.push(marker);
    }
}

#[cfg(test)]
mod tests {
    use pidview_core::{
        geometry::{Point, Size},
        scene::{ElementData, SceneBuilder},
    };

    use super::*;
    use crate::overlay::PathHighlight;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Bounds {
        Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h))
    }

    /// `#a` plus two `.pipe` segments and an unmeasured `#label`.
    fn scene() -> Scene {
        let mut builder = SceneBuilder::new();
        let root = builder.push(None, ElementData::new("svg"));
        builder.push(
            Some(root),
            ElementData::new("rect")
                .with_id("a")
                .with_local_bounds(rect(10.0, 10.0, 20.0, 10.0)),
        );
        for x in [0.0, 50.0] {
            builder.push(
                Some(root),
                ElementData::new("path")
                    .with_class("pipe")
                    .with_local_bounds(rect(x, 40.0, 40.0, 2.0)),
            );
        }
        builder.push(Some(root), ElementData::new("tspan").with_id("label"));
        builder.finish(root, rect(0.0, 0.0, 100.0, 100.0))
    }

    fn select(scene: &Scene, selector: &str) -> Vec<ElementIndex> {
        scene.select(&Selector::new(selector))
    }

    #[test]
    fn test_duplicate_highlight_marks_once() {
        let scene = scene();
        let index = BoundsIndex::build(&scene);
        let overlay = Overlay::new()
            .with_highlight("#a")
            .with_highlight("#a")
            .with_badge("#missing", "asset")
            .with_warning("w1")
            .with_warning("w1")
            .with_warning("w2");

        let render = compose(&scene, &index, &overlay, ComposeOptions::default());

        let a = select(&scene, "#a")[0];
        assert_eq!(render.markers_for(a), [Marker::Highlight]);
        assert_eq!(render.markers().count(), 1);
        assert!(render.badges().is_empty());
        assert_eq!(render.warnings(), ["w1", "w2"]);
    }

    #[test]
    fn test_class_selector_marks_every_match() {
        let scene = scene();
        let index = BoundsIndex::build(&scene);
        let overlay = Overlay::new().with_highlight(".pipe");

        let render = compose(&scene, &index, &overlay, ComposeOptions::default());
        let marked: Vec<ElementIndex> = render.markers().map(|(element, _)| element).collect();
        assert_eq!(marked, select(&scene, ".pipe"));
    }

    #[test]
    fn test_paths_mark_members() {
        let scene = scene();
        let index = BoundsIndex::build(&scene);
        let overlay = Overlay::new().with_path(PathHighlight::new("", [".pipe", "#a"]));

        let render = compose(&scene, &index, &overlay, ComposeOptions::default());
        let a = select(&scene, "#a")[0];
        assert_eq!(
            render.markers_for(a),
            [Marker::Highlight, Marker::Path("path0".to_string())]
        );
        assert_eq!(render.markers().count(), 3);
    }

    #[test]
    fn test_badge_on_first_match() {
        let scene = scene();
        let index = BoundsIndex::build(&scene);
        let overlay = Overlay::new()
            .with_badge(".pipe", "source")
            .with_badge("#a", "asset")
            .with_badge("#label", "warning");

        let render = compose(&scene, &index, &overlay, ComposeOptions::default());

        // `#label` exists but has no box, so it is skipped
        assert_eq!(render.badges().len(), 2);
        let first_pipe = select(&scene, ".pipe")[0];
        assert_eq!(render.badges()[0].element(), first_pipe);
        assert_eq!(render.badges()[0].bounds(), rect(0.0, 40.0, 40.0, 2.0));
        assert_eq!(render.badges()[1].kind(), &BadgeKind::Asset);
        assert_eq!(render.badges()[1].bounds(), rect(10.0, 10.0, 20.0, 10.0));
    }

    #[test]
    fn test_repeated_badge_requests_each_placed() {
        let scene = scene();
        let index = BoundsIndex::build(&scene);
        let overlay = Overlay::new()
            .with_badge("#a", "asset")
            .with_badge("#a", "asset");

        let render = compose(&scene, &index, &overlay, ComposeOptions::default());
        assert_eq!(render.badges().len(), 2);
        assert_eq!(render.badges()[0].bounds(), render.badges()[1].bounds());
    }

    #[test]
    fn test_record_selector_misses() {
        let scene = scene();
        let index = BoundsIndex::build(&scene);
        let overlay = Overlay::new()
            .with_highlight("#gone")
            .with_badge("#gone", "asset")
            .with_badge("#nowhere", "source")
            .with_warning("upstream");

        let options = ComposeOptions {
            record_selector_misses: true,
        };
        let render = compose(&scene, &index, &overlay, options);
        assert_eq!(
            render.warnings(),
            [
                "upstream",
                "missing selector '#gone'",
                "missing selector '#nowhere'"
            ]
        );

        let silent = compose(&scene, &index, &overlay, ComposeOptions::default());
        assert_eq!(silent.warnings(), ["upstream"]);
    }
}
