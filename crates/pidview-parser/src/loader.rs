//! Builds a [`Scene`] from SVG markup.
//!
//! The loader drives the `svg` crate's pull parser, keeps a stack of open
//! elements, and pushes each element into a [`SceneBuilder`] as soon as its
//! start tag is seen. Local bounds are measured when an element closes, so
//! container bounds can be assembled from their already-measured children.
//!
//! The pull parser hands over attribute values and text as written, so
//! entity and character references are decoded here before storage.

use std::borrow::Cow;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use svg::{
    node::{Attributes, element::tag},
    parser::{Event, Parser},
};

use pidview_core::{
    geometry::{Bounds, Point, Size, Transform},
    scene::{ElementData, ElementIndex, Scene, SceneBuilder},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    number::{parse_length, parse_number_list},
    path_data::path_bounds,
    transform::parse_transform,
};

/// Elements whose subtrees are never drawn directly.
const NON_RENDERED: &[&str] = &[
    "defs",
    "symbol",
    "clipPath",
    "mask",
    "marker",
    "pattern",
    "linearGradient",
    "radialGradient",
    "filter",
    "style",
    "script",
    "metadata",
    "title",
    "desc",
];

/// Elements whose bounds are the union of their children.
const CONTAINERS: &[&str] = &["svg", "g", "a", "switch"];

/// Default `font-size` for text measurement.
const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.6;

#[derive(Debug)]
struct OpenElement {
    index: ElementIndex,
    name: String,
}

/// Incremental scene construction state.
#[derive(Debug, Default)]
struct Loader {
    builder: SceneBuilder,
    stack: Vec<OpenElement>,
    root: Option<ElementIndex>,
    warnings: usize,
}

impl Loader {
    fn open(&mut self, name: &str, attributes: &Attributes) -> Result<ElementIndex> {
        let parent = match self.stack.last() {
            Some(open) => Some(open.index),
            None if self.root.is_some() => {
                return Err(Diagnostic::error(format!(
                    "element `{name}` appears after the root element"
                ))
                .with_code(ErrorCode::E005)
                .with_help("a document has exactly one root `<svg>` element"));
            }
            None => None,
        };

        let attributes = self.decoded_attributes(name, attributes);
        let parent_rendered = parent.is_none_or(|p| self.builder.element(p).is_rendered());
        let rendered = parent_rendered
            && !NON_RENDERED.contains(&name)
            && attributes.get("display").map(String::as_str) != Some("none");

        let mut transform = match attributes.get("transform") {
            Some(value) => parse_transform(value).unwrap_or_else(|diag| {
                self.warn(name, &diag);
                Transform::identity()
            }),
            None => Transform::identity(),
        };
        if name == "svg" && parent.is_some() {
            transform = transform.then_apply(&self.nested_viewport(&attributes));
        }

        let mut data = ElementData::new(name)
            .with_transform(transform)
            .with_rendered(rendered);
        if let Some(id) = attributes.get("id").filter(|id| !id.trim().is_empty()) {
            data = data.with_id(id.trim());
        }
        if let Some(classes) = attributes.get("class") {
            for class in classes.split_whitespace() {
                data = data.with_class(class);
            }
        }
        if let Some(label) = attributes.get("aria-label").filter(|l| !l.trim().is_empty()) {
            data = data.with_label(label.trim());
        }

        let index = self.builder.push(parent, data.with_attributes(attributes));
        if parent.is_none() {
            self.root = Some(index);
        }
        trace!(element = name, index = index.get(); "Opened element");
        Ok(index)
    }

    fn close(&mut self, index: ElementIndex) {
        let element = self.builder.element(index);
        let name = element.name().to_string();

        if name == "title" {
            let title = element.text().map(str::trim).filter(|t| !t.is_empty());
            if let (Some(parent), Some(title)) = (element.parent(), title) {
                let title = title.to_string();
                self.builder.set_label_if_absent(parent, title);
            }
        }

        if !self.builder.element(index).is_rendered() {
            return;
        }

        let bounds = self.measure(index, &name);
        self.builder.set_local_bounds(index, bounds);
    }

    /// Local bounds of an element before its own transform is applied.
    fn measure(&mut self, index: ElementIndex, name: &str) -> Option<Bounds> {
        let element = self.builder.element(index);
        let attr = |key: &str| element.attribute(key).and_then(parse_length);
        let attr_or_zero = |key: &str| attr(key).unwrap_or(0.0);

        match name {
            "rect" | "image" | "use" | "foreignObject" => {
                let size = Size::new(attr("width")?, attr("height")?);
                if size.width() < 0.0 || size.height() < 0.0 {
                    return None;
                }
                let top_left = Point::new(attr_or_zero("x"), attr_or_zero("y"));
                Some(Bounds::new_from_top_left(top_left, size))
            }
            "circle" => {
                let r = attr("r").filter(|r| *r >= 0.0)?;
                centered(attr_or_zero("cx"), attr_or_zero("cy"), r, r)
            }
            "ellipse" => {
                let rx = attr("rx").filter(|r| *r >= 0.0)?;
                let ry = attr("ry").filter(|r| *r >= 0.0)?;
                centered(attr_or_zero("cx"), attr_or_zero("cy"), rx, ry)
            }
            "line" => Bounds::from_points([
                Point::new(attr_or_zero("x1"), attr_or_zero("y1")),
                Point::new(attr_or_zero("x2"), attr_or_zero("y2")),
            ]),
            "polyline" | "polygon" => {
                let numbers = parse_number_list(element.attribute("points")?)?;
                if numbers.len() % 2 != 0 {
                    let diag = Diagnostic::warning(
                        "`points` has an odd number of coordinates, dropping the last one",
                    )
                    .with_code(ErrorCode::E202);
                    self.warn(name, &diag);
                }
                Bounds::from_points(
                    numbers
                        .chunks_exact(2)
                        .map(|xy| Point::new(xy[0], xy[1])),
                )
            }
            "path" => match path_bounds(element.attribute("d")?) {
                Ok(bounds) => bounds,
                Err(diag) => {
                    self.warn(name, &diag);
                    None
                }
            },
            "text" => self.measure_text(index),
            _ if CONTAINERS.contains(&name) => self.union_of_children(index),
            _ => None,
        }
    }

    /// Approximates a text run from its character count and font size.
    fn measure_text(&self, index: ElementIndex) -> Option<Bounds> {
        let element = self.builder.element(index);
        let mut content = String::new();
        self.collect_text(index, &mut content);
        let chars = content.trim().chars().count();
        if chars == 0 {
            return None;
        }

        let first = |key: &str| {
            element
                .attribute(key)
                .and_then(parse_number_list)
                .and_then(|values| values.first().copied())
                .unwrap_or(0.0)
        };
        let font_size = element
            .attribute("font-size")
            .and_then(parse_length)
            .filter(|size| *size > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE);

        let width = GLYPH_ADVANCE * font_size * chars as f32;
        let x = match element.attribute("text-anchor") {
            Some("middle") => first("x") - width / 2.0,
            Some("end") => first("x") - width,
            _ => first("x"),
        };
        // `y` is the baseline; the run extends one font size above it
        let top_left = Point::new(x, first("y") - font_size);
        Some(Bounds::new_from_top_left(top_left, Size::new(width, font_size)))
    }

    fn collect_text(&self, index: ElementIndex, out: &mut String) {
        let element = self.builder.element(index);
        if let Some(text) = element.text() {
            out.push_str(text);
        }
        for child in element.children() {
            if self.builder.element(*child).is_rendered() {
                self.collect_text(*child, out);
            }
        }
    }

    fn union_of_children(&self, index: ElementIndex) -> Option<Bounds> {
        self.builder
            .element(index)
            .children()
            .iter()
            .map(|child| self.builder.element(*child))
            .filter(|child| child.is_rendered())
            .filter_map(|child| {
                child
                    .local_bounds()
                    .map(|bounds| child.transform().apply_to_bounds(bounds))
            })
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// Maps a nested `<svg>` viewport's `viewBox` into its parent's coordinates.
    fn nested_viewport(&mut self, attributes: &IndexMap<String, String>) -> Transform {
        let length = |key: &str| attributes.get(key).and_then(|v| parse_length(v));
        let x = length("x").unwrap_or(0.0);
        let y = length("y").unwrap_or(0.0);
        let placement = Transform::translate(x, y);

        let Some(view_box) = attributes.get("viewBox") else {
            return placement;
        };
        let Some(view_box) = parse_view_box(view_box) else {
            let diag = Diagnostic::warning(format!("invalid nested viewBox `{view_box}`"))
                .with_code(ErrorCode::E102);
            self.warn("svg", &diag);
            return placement;
        };
        let (Some(width), Some(height)) = (length("width"), length("height")) else {
            return placement.then_apply(&Transform::translate(
                -view_box.min_x(),
                -view_box.min_y(),
            ));
        };

        let sx = width / view_box.width();
        let sy = height / view_box.height();
        let fit = if attributes.get("preserveAspectRatio").map(String::as_str) == Some("none") {
            Transform::scale(sx, sy)
        } else {
            // xMidYMid meet
            let s = sx.min(sy);
            Transform::translate(
                (width - view_box.width() * s) / 2.0,
                (height - view_box.height() * s) / 2.0,
            )
            .then_apply(&Transform::scale(s, s))
        };

        placement
            .then_apply(&fit)
            .then_apply(&Transform::translate(-view_box.min_x(), -view_box.min_y()))
    }

    /// Root coordinate frame from the root `viewBox`, or `width`/`height`.
    fn root_frame(&self, root: ElementIndex) -> Result<Bounds> {
        let element = self.builder.element(root);

        if let Some(value) = element.attribute("viewBox") {
            return parse_view_box(value).ok_or_else(|| {
                Diagnostic::error(format!(
                    "viewBox `{value}` must be four numbers with a positive width and height"
                ))
                .with_code(ErrorCode::E102)
                .with_help("use `viewBox=\"min-x min-y width height\"`")
            });
        }

        let width = element.attribute("width").and_then(parse_length);
        let height = element.attribute("height").and_then(parse_length);
        match (width, height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => Ok(
                Bounds::new_from_top_left(Point::default(), Size::new(width, height)),
            ),
            _ => Err(Diagnostic::error("document has no root frame")
                .with_code(ErrorCode::E101)
                .with_help("add a `viewBox` or absolute `width`/`height` to the root `<svg>`")),
        }
    }

    /// Converts parser attributes to a deterministically ordered map of
    /// decoded values.
    fn decoded_attributes(
        &mut self,
        element: &str,
        attributes: &Attributes,
    ) -> IndexMap<String, String> {
        let mut pairs: Vec<(String, String)> = attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
            .into_iter()
            .map(|(key, value)| {
                let value = self.decode(element, &value).into_owned();
                (key, value)
            })
            .collect()
    }

    /// Decodes entity and character references in raw markup text.
    fn decode<'a>(&mut self, element: &str, raw: &'a str) -> Cow<'a, str> {
        match quick_xml::escape::unescape(raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                let diag = Diagnostic::warning(format!("cannot decode `{raw}`: {err}"))
                    .with_code(ErrorCode::E203);
                self.warn(element, &diag);
                Cow::Borrowed(raw)
            }
        }
    }

    fn warn(&mut self, element: &str, diag: &Diagnostic) {
        self.warnings += 1;
        warn!(element, code:? = diag.code(); "{}", diag.message());
    }

    fn finish(self) -> Result<Scene> {
        if let Some(open) = self.stack.last() {
            return Err(
                Diagnostic::error(format!("element `{}` is never closed", open.name))
                    .with_code(ErrorCode::E003),
            );
        }

        let Some(root) = self.root else {
            return Err(Diagnostic::error("document contains no elements")
                .with_code(ErrorCode::E004));
        };

        let name = self.builder.element(root).name();
        if name != "svg" {
            return Err(
                Diagnostic::error(format!("root element is `{name}`, expected `svg`"))
                    .with_code(ErrorCode::E100),
            );
        }

        let frame = self.root_frame(root)?;
        let scene = self.builder.finish(root, frame);
        debug!(
            elements = scene.len(),
            warnings = self.warnings,
            frame:? = scene.frame();
            "Loaded scene"
        );
        Ok(scene)
    }
}

/// Parses `min-x min-y width height` with a positive width and height.
fn parse_view_box(value: &str) -> Option<Bounds> {
    match parse_number_list(value)?.as_slice() {
        [x, y, w, h] if *w > 0.0 && *h > 0.0 => Some(Bounds::new_from_top_left(
            Point::new(*x, *y),
            Size::new(*w, *h),
        )),
        _ => None,
    }
}

fn centered(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Bounds> {
    Bounds::from_points([Point::new(cx - rx, cy - ry), Point::new(cx + rx, cy + ry)])
}

/// Loads SVG markup into a scene.
///
/// Structural problems are fatal and returned as an error diagnostic.
/// Attribute-level problems are logged as warnings and the attribute is
/// ignored.
pub(crate) fn load(source: &str) -> Result<Scene> {
    let mut loader = Loader::default();

    for event in Parser::new(source) {
        match event {
            Event::Error(err) => {
                return Err(Diagnostic::error(format!("malformed markup: {err}"))
                    .with_code(ErrorCode::E001));
            }
            Event::Tag(name, tag::Type::Start, attributes) => {
                let index = loader.open(name, &attributes)?;
                loader.stack.push(OpenElement {
                    index,
                    name: name.to_string(),
                });
            }
            Event::Tag(name, tag::Type::Empty, attributes) => {
                let index = loader.open(name, &attributes)?;
                loader.close(index);
            }
            Event::Tag(name, tag::Type::End, _) => {
                let Some(open) = loader.stack.pop() else {
                    return Err(Diagnostic::error(format!(
                        "closing tag `{name}` has no matching opening tag"
                    ))
                    .with_code(ErrorCode::E002));
                };
                if open.name != name {
                    return Err(Diagnostic::error(format!(
                        "closing tag `{name}` does not match open element `{}`",
                        open.name
                    ))
                    .with_code(ErrorCode::E002)
                    .with_help(format!("close `{}` first", open.name)));
                }
                loader.close(open.index);
            }
            Event::Text(text) => {
                if let Some(open) = loader.stack.last() {
                    let index = open.index;
                    let name = open.name.clone();
                    let text = loader.decode(&name, text);
                    loader.builder.append_text(index, &text);
                }
            }
            _ => {}
        }
    }

    loader.finish()
}
