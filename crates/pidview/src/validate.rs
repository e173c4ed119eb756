//! Tag map validation.
//!
//! A tag map assigns equipment tags to the selectors that locate them in a
//! diagram. It is the contract between the upstream selection system and
//! the diagrams; validating it against a loaded scene catches drift between
//! the two before overlays silently miss.
//!
//! Tag maps are TOML tables mapping each tag to one selector or a list:
//!
//! ```toml
//! "V-201A" = "#V201A"
//! src = ["#SRC", ".source"]
//! ```

use std::collections::{BTreeMap, BTreeSet};

use log::info;
use serde::Deserialize;
use thiserror::Error;

use pidview_core::{scene::Scene, selector::Selector};

use crate::overlay::dedup;

/// Failure to load a tag map.
#[derive(Debug, Error)]
pub enum TagMapError {
    #[error("invalid tag map: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("tag '{tag}': selector list must not be empty")]
    EmptySelectors { tag: String },

    #[error("tag '{tag}': invalid selector '{selector}'")]
    InvalidSelector { tag: String, selector: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorField {
    One(Selector),
    Many(Vec<Selector>),
}

/// Validated mapping from tags to selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    tags: BTreeMap<String, Vec<Selector>>,
}

impl TagMap {
    /// Parses and validates a TOML tag map.
    ///
    /// # Errors
    ///
    /// Returns [`TagMapError`] for malformed TOML, an empty selector list, or
    /// a selector outside `#?[A-Za-z0-9_.:-]+`.
    pub fn from_toml(source: &str) -> Result<Self, TagMapError> {
        let raw: BTreeMap<String, SelectorField> = toml::from_str(source)?;
        let mut tags = BTreeMap::new();

        for (tag, field) in raw {
            let selectors = match field {
                SelectorField::One(selector) => vec![selector],
                SelectorField::Many(selectors) => selectors,
            };
            if selectors.is_empty() {
                return Err(TagMapError::EmptySelectors { tag });
            }
            if let Some(bad) = selectors.iter().find(|s| !s.is_well_formed()) {
                return Err(TagMapError::InvalidSelector {
                    selector: bad.to_string(),
                    tag,
                });
            }
            tags.insert(tag, dedup(&selectors));
        }

        Ok(Self { tags })
    }

    /// Returns the selectors mapped from `tag`, or an empty slice.
    pub fn selectors_for(&self, tag: &str) -> &[Selector] {
        self.tags.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Returns the tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Maps every selector to the tags using it.
    fn by_selector(&self) -> BTreeMap<&Selector, Vec<&str>> {
        let mut selectors: BTreeMap<&Selector, Vec<&str>> = BTreeMap::new();
        for (tag, values) in &self.tags {
            for selector in values {
                selectors.entry(selector).or_default().push(tag);
            }
        }
        selectors
    }
}

/// Sorted findings of a tag map validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    warnings: Vec<String>,
}

impl ValidationReport {
    fn new(mut warnings: Vec<String>) -> Self {
        warnings.sort();
        Self { warnings }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

fn duplicate_warnings(by_selector: &BTreeMap<&Selector, Vec<&str>>) -> Vec<String> {
    by_selector
        .iter()
        .filter(|(_, tags)| tags.len() > 1)
        .map(|(selector, tags)| {
            format!("duplicate tag '{selector}' mapped from: {}", tags.join(", "))
        })
        .collect()
}

/// Checks a tag map against a loaded diagram.
///
/// Reports selectors shared by several tags, selectors absent from the
/// diagram, and diagram ids and classes no tag maps to.
pub fn validate(map: &TagMap, scene: &Scene) -> ValidationReport {
    let by_selector = map.by_selector();
    let mut warnings = duplicate_warnings(&by_selector);

    let in_diagram: BTreeSet<Selector> = scene.known_selectors().into_iter().collect();
    let in_map: BTreeSet<&Selector> = by_selector.keys().copied().collect();

    for selector in &in_map {
        if !in_diagram.contains(*selector) {
            warnings.push(format!("missing selector '{selector}'"));
        }
    }
    for selector in &in_diagram {
        if !in_map.contains(selector) {
            warnings.push(format!("unmapped tag '{selector}'"));
        }
    }

    let report = ValidationReport::new(warnings);
    info!(tags = map.len(), warnings = report.warnings().len(); "Validated tag map");
    report
}

/// Reports a tag map whose diagram could not be found: every selector is
/// missing.
pub fn validate_missing_diagram(map: &TagMap, diagram: &str) -> ValidationReport {
    let by_selector = map.by_selector();
    let mut warnings = duplicate_warnings(&by_selector);
    warnings.push(format!("missing svg '{diagram}'"));
    warnings.extend(
        by_selector
            .keys()
            .map(|selector| format!("missing selector '{selector}'")),
    );
    ValidationReport::new(warnings)
}

#[cfg(test)]
mod tests {
    use pidview_core::{
        geometry::{Bounds, Point, Size},
        scene::{ElementData, SceneBuilder},
    };

    use super::*;

    fn scene() -> Scene {
        let mut builder = SceneBuilder::new();
        let root = builder.push(None, ElementData::new("svg"));
        builder.push(Some(root), ElementData::new("g").with_id("V201A"));
        builder.push(Some(root), ElementData::new("g").with_id("SRC").with_class("source"));
        builder.push(Some(root), ElementData::new("g").with_id("P101"));
        let frame = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        builder.finish(root, frame)
    }

    #[test]
    fn test_load_string_and_list_values() {
        let map = TagMap::from_toml(
            r##"
            "V-201A" = "#V201A"
            src = ["#SRC", ".source", "#SRC"]
            "##,
        )
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.selectors_for("V-201A"), [Selector::new("#V201A")]);
        assert_eq!(map.selectors_for("src").len(), 2);
        assert!(map.selectors_for("nope").is_empty());
        assert_eq!(map.tags().collect::<Vec<_>>(), ["V-201A", "src"]);
    }

    #[test]
    fn test_load_rejects_bad_maps() {
        assert!(matches!(
            TagMap::from_toml("a = []"),
            Err(TagMapError::EmptySelectors { .. })
        ));
        assert!(matches!(
            TagMap::from_toml(r#"a = "g > rect""#),
            Err(TagMapError::InvalidSelector { .. })
        ));
        assert!(matches!(TagMap::from_toml("a = 3"), Err(TagMapError::Toml(_))));
        assert!(matches!(
            TagMap::from_toml("a = \"#x\"\na = \"#y\""),
            Err(TagMapError::Toml(_))
        ));
    }

    #[test]
    fn test_validate_reports_sorted_findings() {
        let map = TagMap::from_toml(
            r##"
            "V-201A" = "#V201A"
            "V-201B" = "#V201A"
            src = ["#SRC", ".source"]
            ghost = "#GHOST"
            "##,
        )
        .unwrap();

        let report = validate(&map, &scene());
        assert_eq!(
            report.warnings(),
            [
                "duplicate tag '#V201A' mapped from: V-201A, V-201B",
                "missing selector '#GHOST'",
                "unmapped tag '#P101'",
            ]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_map() {
        let map = TagMap::from_toml(
            r##"
            a = "#V201A"
            b = ["#SRC", ".source"]
            c = "#P101"
            "##,
        )
        .unwrap();
        assert!(validate(&map, &scene()).is_clean());
    }

    #[test]
    fn test_missing_diagram() {
        let map = TagMap::from_toml(r##"a = ["#x", "#y"]"##).unwrap();
        let report = validate_missing_diagram(&map, "plant.svg");
        assert_eq!(
            report.warnings(),
            [
                "missing selector '#x'",
                "missing selector '#y'",
                "missing svg 'plant.svg'",
            ]
        );
    }
}
