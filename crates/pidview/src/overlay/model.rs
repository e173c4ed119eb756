//! Overlay data as received from the upstream selection system.

use std::{collections::HashSet, fmt, hash::Hash};

use serde::{Deserialize, Serialize};

use pidview_core::selector::Selector;

/// What a badge marks.
///
/// Unknown kinds are carried through verbatim as [`BadgeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BadgeKind {
    /// The asset under isolation.
    Asset,
    /// An energy source feeding the asset.
    Source,
    /// Attention marker, e.g. when some tags could not be mapped.
    Warning,
    Other(String),
}

impl BadgeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Asset => "asset",
            Self::Source => "source",
            Self::Warning => "warning",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for BadgeKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "asset" => Self::Asset,
            "source" => Self::Source,
            "warning" => Self::Warning,
            _ => Self::Other(kind),
        }
    }
}

impl From<&str> for BadgeKind {
    fn from(kind: &str) -> Self {
        Self::from(kind.to_string())
    }
}

impl From<BadgeKind> for String {
    fn from(kind: BadgeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A badge request: place a `kind` badge on the first match of `selector`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BadgeSpec {
    selector: Selector,
    #[serde(alias = "type")]
    kind: BadgeKind,
}

impl BadgeSpec {
    pub fn new(selector: impl Into<Selector>, kind: impl Into<BadgeKind>) -> Self {
        Self {
            selector: selector.into(),
            kind: kind.into(),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn kind(&self) -> &BadgeKind {
        &self.kind
    }
}

/// A highlighted path: a named group of selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathHighlight {
    /// Path identifier; assigned as `path<N>` by [`Overlay::normalized`] when empty.
    #[serde(default)]
    id: String,
    #[serde(default)]
    selectors: Vec<Selector>,
}

impl PathHighlight {
    pub fn new(id: impl Into<String>, selectors: impl IntoIterator<Item = impl Into<Selector>>) -> Self {
        Self {
            id: id.into(),
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }
}

/// Annotations to compose over a diagram.
///
/// An overlay is always replaced wholesale. Deserializes from the JSON
/// produced upstream:
///
/// ```
/// # use pidview::overlay::Overlay;
/// let overlay = Overlay::from_json(
///     r##"{
///         "highlight": ["#V201A", "#V201A"],
///         "badges": [{"selector": "#A201", "type": "asset"}],
///         "paths": [{"id": "path0", "selectors": ["#SRC", "#V201A"]}],
///         "warnings": ["missing selector for tag 'X'"]
///     }"##,
/// )
/// .unwrap();
///
/// assert_eq!(overlay.normalized().highlight().len(), 1);
/// assert_eq!(overlay.badges()[0].kind().as_str(), "asset");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(default)]
    highlight: Vec<Selector>,
    #[serde(default)]
    badges: Vec<BadgeSpec>,
    #[serde(default, alias = "pathHighlights")]
    paths: Vec<PathHighlight>,
    #[serde(default)]
    warnings: Vec<String>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses overlay JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed or mistyped input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_highlight(mut self, selector: impl Into<Selector>) -> Self {
        self.highlight.push(selector.into());
        self
    }

    pub fn with_badge(mut self, selector: impl Into<Selector>, kind: impl Into<BadgeKind>) -> Self {
        self.badges.push(BadgeSpec::new(selector, kind));
        self
    }

    pub fn with_path(mut self, path: PathHighlight) -> Self {
        self.paths.push(path);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn highlight(&self) -> &[Selector] {
        &self.highlight
    }

    pub fn badges(&self) -> &[BadgeSpec] {
        &self.badges
    }

    pub fn paths(&self) -> &[PathHighlight] {
        &self.paths
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns a copy with `highlight`, each path's selectors and `warnings`
    /// deduplicated in first-seen order.
    ///
    /// Badge requests are kept as given, repeats included. Paths without an
    /// id are named `path<N>` after their position.
    pub fn normalized(&self) -> Self {
        let paths = self
            .paths
            .iter()
            .enumerate()
            .map(|(position, path)| PathHighlight {
                id: if path.id.is_empty() {
                    format!("path{position}")
                } else {
                    path.id.clone()
                },
                selectors: dedup(&path.selectors),
            })
            .collect();

        Self {
            highlight: dedup(&self.highlight),
            badges: self.badges.clone(),
            paths,
            warnings: dedup(&self.warnings),
        }
    }

    /// Returns every selector to highlight: `highlight` followed by the path
    /// selectors, deduplicated.
    pub fn highlight_union(&self) -> Vec<Selector> {
        let all: Vec<Selector> = self
            .highlight
            .iter()
            .chain(self.paths.iter().flat_map(|path| path.selectors.iter()))
            .cloned()
            .collect();
        dedup(&all)
    }

    pub fn is_empty(&self) -> bool {
        self.highlight.is_empty()
            && self.badges.is_empty()
            && self.paths.is_empty()
            && self.warnings.is_empty()
    }
}

/// Removes duplicates, keeping the first occurrence of each item.
pub(crate) fn dedup<T: Clone + Eq + Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}
