//! Standalone SVG rendering of a view.
//!
//! The document has the container's size. Content is split into layers:
//!
//! - `background`: a solid rectangle, if a background color is configured
//! - `diagram`: the tile's elements under the viewport transform, with
//!   overlay classes and accessibility attributes added
//! - `badges`: one outlined box and kind label per badge, above the diagram
//!
//! Elements outside the tile are left out. Elements with no indexed box
//! (definitions, titles, unmeasurable shapes) follow their parent.

use std::{collections::HashMap, fs, path::Path};

use log::{debug, error, info};
use svg::{
    Document, Node,
    node::{
        self,
        element::{self as svg_element, Element},
    },
};

use pidview_core::{
    color::Color,
    draw::{LayeredOutput, RenderLayer},
    scene::ElementIndex,
};

use super::{Error, Exporter, ViewSnapshot};
use crate::{
    accessibility::AccessibleLabel,
    config::AppConfig,
    overlay::{Badge, Marker},
};

const BADGE_FONT_SIZE: f32 = 12.0;
const BADGE_STROKE_WIDTH: f32 = 2.0;

/// Colors resolved from the style configuration.
struct Palette {
    background: Option<Color>,
    badge_fill: Color,
    badge_text: Color,
    highlight_stroke: Color,
}

impl Palette {
    fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let style = config.style();
        Ok(Self {
            background: style.background_color().map_err(Error::Render)?,
            badge_fill: style.badge_fill().map_err(Error::Render)?,
            badge_text: style.badge_text().map_err(Error::Render)?,
            highlight_stroke: style.highlight_stroke().map_err(Error::Render)?,
        })
    }
}

/// SVG exporter writing into an in-memory buffer.
#[derive(Debug)]
pub struct SvgExporter<'c> {
    config: &'c AppConfig,
    output: String,
}

impl<'c> SvgExporter<'c> {
    pub fn new(config: &'c AppConfig) -> Self {
        Self {
            config,
            output: String::new(),
        }
    }

    /// Returns the last exported document.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    /// Writes the last exported document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn write_to_file(&self, path: &Path) -> Result<(), Error> {
        info!(path:? = path; "Writing SVG file");
        fs::write(path, &self.output).map_err(|err| {
            error!(path:? = path, err:% = err; "Failed to write SVG file");
            Error::Io(err)
        })
    }

    /// Renders a view to a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if a configured color is invalid.
    pub fn render(&self, view: &ViewSnapshot<'_>) -> Result<Document, Error> {
        let palette = Palette::from_config(self.config)?;
        let size = view.output_size();

        let mut output = LayeredOutput::new();
        if let Some(background) = &palette.background {
            let rect = svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", size.width())
                .set("height", size.height())
                .set("fill", background);
            output.add_to_layer(RenderLayer::Background, Box::new(rect));
        }

        let viewport = view.viewport().transform().to_string();
        output.add_to_layer(
            RenderLayer::Diagram,
            Box::new(self.diagram_group(view).set("transform", viewport.as_str())),
        );

        if let Some(badges) = view.diagram().badge_layer() {
            let mut group = svg_element::Group::new().set("transform", viewport.as_str());
            for badge in badges {
                group = group.add(badge_node(badge, &palette));
            }
            output.add_to_layer(RenderLayer::Badge, Box::new(group));
        }

        let mut doc = Document::new()
            .set("width", size.width())
            .set("height", size.height())
            .set(
                "viewBox",
                format!("0 0 {} {}", size.width(), size.height()),
            )
            .add(svg_element::Style::new(self.stylesheet(&palette)));
        for node in output.render() {
            doc = doc.add(node);
        }

        debug!(
            width = size.width(),
            height = size.height(),
            elements = view.tile().len();
            "SVG document rendered"
        );
        Ok(doc)
    }

    fn stylesheet(&self, palette: &Palette) -> String {
        let overlay = self.config.overlay();
        format!(
            ".{highlight} {{ stroke: {color}; stroke-width: 3px; }}\n\
             .{path} {{ stroke: {color}; stroke-width: 3px; stroke-dasharray: 6 3; }}",
            highlight = overlay.highlight_class(),
            path = overlay.path_class(),
            color = palette.highlight_stroke,
        )
    }

    /// Builds the diagram content. The root element itself is replaced by a
    /// group carrying its transform so its viewport attributes do not apply
    /// twice.
    fn diagram_group(&self, view: &ViewSnapshot<'_>) -> svg_element::Group {
        let scene = view.diagram().scene();
        let root = scene.root();

        let emitter = ElementEmitter {
            view,
            config: self.config,
            labels: view
                .diagram()
                .labels()
                .iter()
                .map(|label| (label.target(), label))
                .collect(),
        };

        let mut content = svg_element::Group::new();
        let root_transform = scene.element(root).transform();
        if !root_transform.is_identity() {
            content = content.set("transform", root_transform.to_string());
        }
        for &child in scene.element(root).children() {
            if let Some(node) = emitter.emit(child) {
                content = content.add(node);
            }
        }
        svg_element::Group::new().add(content)
    }
}

impl Exporter for SvgExporter<'_> {
    fn export_view(&mut self, view: &ViewSnapshot<'_>) -> Result<(), Error> {
        let doc = self.render(view)?;
        self.output = doc.to_string();
        Ok(())
    }
}

struct ElementEmitter<'a, 'v> {
    view: &'a ViewSnapshot<'v>,
    config: &'a AppConfig,
    labels: HashMap<ElementIndex, &'v AccessibleLabel>,
}

impl ElementEmitter<'_, '_> {
    fn is_emitted(&self, index: ElementIndex) -> bool {
        self.view.tile().contains(index) || self.view.diagram().index().bounds(index).is_none()
    }

    /// Emits an element and its emitted descendants. The caller has already
    /// emitted the parent.
    fn emit(&self, index: ElementIndex) -> Option<Element> {
        if !self.is_emitted(index) {
            return None;
        }

        let source = self.view.diagram().scene().element(index);
        let mut node = Element::new(source.name());
        for (name, value) in source.attributes() {
            if name != "class" {
                node.assign(name.as_str(), value.as_str());
            }
        }

        self.assign_markers(&mut node, index, source.attribute("class"));
        if let Some(label) = self.labels.get(&index) {
            node.assign("aria-label", label.label());
            if label.adds_tabindex() {
                node.assign("tabindex", "0");
            }
        }

        if let Some(text) = source.text() {
            node.append(node::Text::new(text));
        }
        for &child in source.children() {
            if let Some(child) = self.emit(child) {
                node.append(child);
            }
        }
        Some(node)
    }

    fn assign_markers(&self, node: &mut Element, index: ElementIndex, class: Option<&str>) {
        let overlay = self.config.overlay();
        let mut classes: Vec<&str> = class.map(|c| c.split_whitespace().collect()).unwrap_or_default();
        let mut paths = Vec::new();

        for marker in self.view.diagram().markers(index) {
            match marker {
                Marker::Highlight => classes.push(overlay.highlight_class()),
                Marker::Path(id) => {
                    classes.push(overlay.path_class());
                    paths.push(id.as_str());
                }
            }
        }
        classes.dedup();

        if !classes.is_empty() {
            node.assign("class", classes.join(" "));
        }
        if !paths.is_empty() {
            node.assign("data-path", paths.join(" "));
        }
    }
}

fn badge_node(badge: &Badge, palette: &Palette) -> svg_element::Group {
    let bounds = badge.bounds();
    let kind = badge.kind().as_str();

    let outline = svg_element::Rectangle::new()
        .set("x", bounds.min_x())
        .set("y", bounds.min_y())
        .set("width", bounds.width())
        .set("height", bounds.height())
        .set("fill", &palette.badge_fill)
        .set("fill-opacity", 0.25)
        .set("stroke", &palette.badge_fill)
        .set("stroke-width", BADGE_STROKE_WIDTH);

    let label = svg_element::Text::new(kind)
        .set("x", bounds.min_x())
        .set("y", bounds.min_y() - BADGE_STROKE_WIDTH * 2.0)
        .set("fill", &palette.badge_text)
        .set("font-size", BADGE_FONT_SIZE);

    svg_element::Group::new()
        .set("class", format!("pid-badge pid-badge-{kind}"))
        .set("data-selector", badge.selector().as_str())
        .add(outline)
        .add(label)
}

#[cfg(test)]
mod tests {
    use pidview_core::geometry::{Point, Size};

    use super::*;
    use crate::{
        config::{OverlayConfig, StyleConfig, ViewportConfig},
        overlay::{ComposeOptions, MountedDiagram, Overlay},
        tiler,
        viewport::Viewport,
    };

    const DIAGRAM: &str = r##"<svg viewBox="0 0 100 100">
        <defs><linearGradient id="grad"/></defs>
        <g id="V1"><title>Gate valve</title>
            <rect class="body" x="10" y="10" width="10" height="10"/>
        </g>
        <rect id="far" x="90" y="90" width="5" height="5"/>
    </svg>"##;

    fn render(overlay: &Overlay, container: Size, viewport: &Viewport) -> String {
        let mut diagram = MountedDiagram::new(pidview_parser::parse(DIAGRAM).unwrap());
        diagram.apply_overlay(overlay, ComposeOptions::default());
        let tile = tiler::build_tile(diagram.index(), viewport, container);

        let config = AppConfig::default();
        let mut exporter = SvgExporter::new(&config);
        exporter
            .export_view(&ViewSnapshot::new(&diagram, &tile, viewport, container))
            .unwrap();
        exporter.into_string()
    }

    #[test]
    fn test_layers_and_overlay_attributes() {
        let overlay = Overlay::new().with_highlight("#V1").with_badge("#V1", "asset");
        let svg = render(&overlay, Size::new(100.0, 100.0), &Viewport::default());

        assert!(svg.contains(r#"data-layer="diagram""#));
        assert!(svg.contains(r#"data-layer="badges""#));
        assert!(!svg.contains(r#"data-layer="background""#));
        assert!(svg.contains(r#"class="pid-highlight""#));
        assert!(svg.contains("pid-badge-asset"));
        assert!(svg.contains(r#"aria-label="Gate valve""#));
        assert!(svg.contains(r#"tabindex="0""#));
        assert!(svg.contains(r#"class="body""#));
        assert!(svg.contains("linearGradient"));
        assert!(svg.contains("stroke: rgb(228, 0, 43);"));
    }

    #[test]
    fn test_entities_escaped_once() {
        let markup = r#"<svg viewBox="0 0 100 100">
            <g id="V1"><title>A &amp; B</title>
                <text x="10" y="20">P&amp;ID</text>
            </g>
        </svg>"#;
        let diagram = MountedDiagram::new(pidview_parser::parse(markup).unwrap());
        let viewport = Viewport::default();
        let container = Size::new(100.0, 100.0);
        let tile = tiler::build_tile(diagram.index(), &viewport, container);

        let config = AppConfig::default();
        let mut exporter = SvgExporter::new(&config);
        exporter
            .export_view(&ViewSnapshot::new(&diagram, &tile, &viewport, container))
            .unwrap();
        let svg = exporter.output();

        assert!(svg.contains(r#"aria-label="A &amp; B""#));
        assert!(svg.contains("P&amp;ID"));
        assert!(!svg.contains("&amp;amp;"));
    }

    #[test]
    fn test_culled_elements_left_out() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Point::new(0.0, 0.0), crate::viewport::ZoomDirection::In);
        let svg = render(&Overlay::new(), Size::new(40.0, 40.0), &viewport);

        assert!(svg.contains(r#"id="V1""#));
        assert!(!svg.contains(r#"id="far""#));
    }

    #[test]
    fn test_background_and_invalid_colors() {
        let diagram = MountedDiagram::new(pidview_parser::parse(DIAGRAM).unwrap());
        let viewport = Viewport::default();
        let tile = tiler::build_tile(diagram.index(), &viewport, Size::new(10.0, 10.0));
        let view = ViewSnapshot::new(&diagram, &tile, &viewport, Size::new(10.0, 10.0));

        let style: StyleConfig = toml::from_str(r#"background_color = "white""#).unwrap();
        let config = AppConfig::new(ViewportConfig::default(), OverlayConfig::default(), style);
        let svg = SvgExporter::new(&config).render(&view).unwrap().to_string();
        assert!(svg.contains(r#"data-layer="background""#));

        let style: StyleConfig = toml::from_str(r#"badge_fill = "not-a-color""#).unwrap();
        let config = AppConfig::new(ViewportConfig::default(), OverlayConfig::default(), style);
        assert!(matches!(
            SvgExporter::new(&config).render(&view),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        let config = AppConfig::default();
        let mut exporter = SvgExporter::new(&config);
        exporter.output = "<svg/>".to_string();
        exporter.write_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg/>");
    }
}
