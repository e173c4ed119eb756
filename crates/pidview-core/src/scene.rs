//! In-memory scene graph for a loaded diagram.
//!
//! A [`Scene`] is an arena of [`Element`]s in document order. Parent/child
//! links are [`ElementIndex`] values into the arena rather than references,
//! so the whole graph can be dropped and rebuilt on reload without ownership
//! cycles.
//!
//! Element ids and class names are interned in a per-scene
//! [`DefaultStringInterner`]. Two scenes never share symbols.
//!
//! Scenes are assembled with [`SceneBuilder`]:
//!
//! ```
//! # use pidview_core::geometry::{Bounds, Point, Size, Transform};
//! # use pidview_core::scene::{ElementData, SceneBuilder};
//! # use pidview_core::selector::Selector;
//! let mut builder = SceneBuilder::new();
//! let root = builder.push(None, ElementData::new("svg"));
//! let pump = builder.push(
//!     Some(root),
//!     ElementData::new("rect")
//!         .with_id("P-101")
//!         .with_local_bounds(Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0))),
//! );
//!
//! let frame = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 50.0));
//! let scene = builder.finish(root, frame);
//! assert_eq!(scene.select_first(&Selector::new("#P-101")), Some(pump));
//! ```

use std::{collections::HashMap, fmt};

use indexmap::IndexMap;
use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::{
    geometry::{Bounds, Transform},
    selector::{Selector, SelectorKind},
};

/// Index of an element within its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementIndex(usize);

impl ElementIndex {
    /// Returns the position of the element in document order.
    pub fn get(self) -> usize {
        self.0
    }
}

/// A single node of the scene graph.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    id: Option<DefaultSymbol>,
    classes: Vec<DefaultSymbol>,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    label: Option<String>,
    local_bounds: Option<Bounds>,
    transform: Transform,
    rendered: bool,
    parent: Option<ElementIndex>,
    children: Vec<ElementIndex>,
}

impl Element {
    /// Returns the element name, e.g. `rect` or `g`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw attributes in source order.
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns the character data directly inside this element.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the descriptive label (from `<title>` or `aria-label`).
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the measured geometry in the element's own user space, before
    /// its own transform. `None` means the element cannot be measured.
    pub fn local_bounds(&self) -> Option<Bounds> {
        self.local_bounds
    }

    /// Returns the element's own transform (identity if none was given).
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Returns `false` for elements that only exist as definitions
    /// (inside `defs`, `clipPath`, ...) and are never painted in place.
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn parent(&self) -> Option<ElementIndex> {
        self.parent
    }

    pub fn children(&self) -> &[ElementIndex] {
        &self.children
    }
}

/// Construction data for one element, passed to [`SceneBuilder::push`].
#[derive(Debug, Clone)]
pub struct ElementData {
    name: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: IndexMap<String, String>,
    label: Option<String>,
    local_bounds: Option<Bounds>,
    transform: Transform,
    rendered: bool,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            classes: Vec::new(),
            attributes: IndexMap::new(),
            label: None,
            local_bounds: None,
            transform: Transform::identity(),
            rendered: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: IndexMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_local_bounds(mut self, bounds: Bounds) -> Self {
        self.local_bounds = Some(bounds);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_rendered(mut self, rendered: bool) -> Self {
        self.rendered = rendered;
        self
    }
}

/// Incremental builder for a [`Scene`].
///
/// Elements must be pushed in document order (parents before children).
#[derive(Default)]
pub struct SceneBuilder {
    elements: Vec<Element>,
    symbols: DefaultStringInterner,
}

impl fmt::Debug for SceneBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneBuilder")
            .field("elements", &self.elements.len())
            .field("symbols", &self.symbols.len())
            .finish()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element as the last child of `parent` and returns its index.
    pub fn push(&mut self, parent: Option<ElementIndex>, data: ElementData) -> ElementIndex {
        let index = ElementIndex(self.elements.len());
        let id = data.id.map(|id| self.symbols.get_or_intern(id));
        let classes = data
            .classes
            .iter()
            .map(|class| self.symbols.get_or_intern(class))
            .collect();

        self.elements.push(Element {
            name: data.name,
            id,
            classes,
            attributes: data.attributes,
            text: None,
            label: data.label,
            local_bounds: data.local_bounds,
            transform: data.transform,
            rendered: data.rendered,
            parent,
            children: Vec::new(),
        });

        if let Some(parent) = parent {
            self.elements[parent.0].children.push(index);
        }

        index
    }

    pub fn element(&self, index: ElementIndex) -> &Element {
        &self.elements[index.0]
    }

    /// Appends character data to an element.
    pub fn append_text(&mut self, index: ElementIndex, text: &str) {
        self.elements[index.0]
            .text
            .get_or_insert_with(String::new)
            .push_str(text);
    }

    /// Sets the label of an element unless it already has one.
    pub fn set_label_if_absent(&mut self, index: ElementIndex, label: impl Into<String>) {
        let element = &mut self.elements[index.0];
        if element.label.is_none() {
            element.label = Some(label.into());
        }
    }

    pub fn set_local_bounds(&mut self, index: ElementIndex, bounds: Option<Bounds>) {
        self.elements[index.0].local_bounds = bounds;
    }

    /// Completes the scene with `root` as its root element and `frame` as the
    /// root coordinate frame.
    pub fn finish(self, root: ElementIndex, frame: Bounds) -> Scene {
        let mut by_id: HashMap<DefaultSymbol, Vec<ElementIndex>> = HashMap::new();
        let mut by_class: HashMap<DefaultSymbol, Vec<ElementIndex>> = HashMap::new();

        for (position, element) in self.elements.iter().enumerate() {
            let index = ElementIndex(position);
            if let Some(id) = element.id {
                by_id.entry(id).or_default().push(index);
            }
            for class in &element.classes {
                let entries = by_class.entry(*class).or_default();
                if entries.last() != Some(&index) {
                    entries.push(index);
                }
            }
        }

        Scene {
            frame,
            root,
            elements: self.elements,
            symbols: self.symbols,
            by_id,
            by_class,
        }
    }
}

/// A loaded diagram: root frame plus the element arena.
pub struct Scene {
    frame: Bounds,
    root: ElementIndex,
    elements: Vec<Element>,
    symbols: DefaultStringInterner,
    by_id: HashMap<DefaultSymbol, Vec<ElementIndex>>,
    by_class: HashMap<DefaultSymbol, Vec<ElementIndex>>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("frame", &self.frame)
            .field("root", &self.root)
            .field("elements", &self.elements.len())
            .field("ids", &self.by_id.len())
            .field("classes", &self.by_class.len())
            .finish()
    }
}

impl Scene {
    /// Returns the root coordinate frame (the `viewBox`).
    pub fn frame(&self) -> Bounds {
        self.frame
    }

    pub fn root(&self) -> ElementIndex {
        self.root
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, index: ElementIndex) -> &Element {
        &self.elements[index.0]
    }

    /// Iterates over all elements in document order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementIndex, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(position, element)| (ElementIndex(position), element))
    }

    /// Returns the id of an element.
    pub fn element_id(&self, index: ElementIndex) -> Option<&str> {
        self.elements[index.0]
            .id
            .and_then(|symbol| self.symbols.resolve(symbol))
    }

    /// Returns the class tags of an element in source order.
    pub fn element_classes(&self, index: ElementIndex) -> impl Iterator<Item = &str> {
        self.elements[index.0]
            .classes
            .iter()
            .filter_map(|symbol| self.symbols.resolve(*symbol))
    }

    /// Iterates over the ancestors of an element, nearest first.
    pub fn ancestors(&self, index: ElementIndex) -> impl Iterator<Item = ElementIndex> + '_ {
        std::iter::successors(self.elements[index.0].parent, |current| {
            self.elements[current.0].parent
        })
    }

    /// Returns every element matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<ElementIndex> {
        match selector.kind() {
            SelectorKind::Id(id) => self.lookup(&self.by_id, id),
            SelectorKind::Class(class) => self.lookup(&self.by_class, class),
            SelectorKind::Name(name) if !name.is_empty() => self
                .iter()
                .filter(|(_, element)| element.name == name)
                .map(|(index, _)| index)
                .collect(),
            SelectorKind::Name(_) => Vec::new(),
        }
    }

    /// Returns the first element in document order matching `selector`.
    pub fn select_first(&self, selector: &Selector) -> Option<ElementIndex> {
        self.select(selector).into_iter().next()
    }

    /// Returns every selector this scene can satisfy: `#id` for each id and
    /// `.class` for each class tag.
    pub fn known_selectors(&self) -> Vec<Selector> {
        let ids = self
            .by_id
            .keys()
            .filter_map(|symbol| self.symbols.resolve(*symbol))
            .map(|id| Selector::new(format!("#{id}")));
        let classes = self
            .by_class
            .keys()
            .filter_map(|symbol| self.symbols.resolve(*symbol))
            .map(|class| Selector::new(format!(".{class}")));
        let mut selectors: Vec<Selector> = ids.chain(classes).collect();
        selectors.sort();
        selectors
    }

    fn lookup(
        &self,
        table: &HashMap<DefaultSymbol, Vec<ElementIndex>>,
        key: &str,
    ) -> Vec<ElementIndex> {
        self.symbols
            .get(key)
            .and_then(|symbol| table.get(&symbol))
            .cloned()
            .unwrap_or_default()
    }
}
