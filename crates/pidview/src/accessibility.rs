//! Promotes diagram labels to assistive-technology labels.
//!
//! Labels come from `<title>` children and `aria-label` attributes, both
//! collected by the loader. Each label is attached to the nearest
//! interactive element at or above its owner, which also becomes keyboard
//! focusable. An element is interactive if it is a link (`<a>`), has an
//! `id`, or declares a `role` or `tabindex`.

use std::collections::HashSet;

use log::debug;

use pidview_core::scene::{ElementIndex, Scene};

/// An accessible name attached to an interactive element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibleLabel {
    target: ElementIndex,
    label: String,
    adds_tabindex: bool,
}

impl AccessibleLabel {
    /// Returns the element that receives the label.
    pub fn target(&self) -> ElementIndex {
        self.target
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if the target needs a `tabindex` to become focusable.
    pub fn adds_tabindex(&self) -> bool {
        self.adds_tabindex
    }
}

fn is_interactive(scene: &Scene, index: ElementIndex) -> bool {
    let element = scene.element(index);
    element.name() == "a"
        || scene.element_id(index).is_some()
        || element.attribute("role").is_some()
        || element.attribute("tabindex").is_some()
}

/// Computes the accessible labels of a scene.
///
/// At most one label is attached per target; the first in document order
/// wins. Labels with no interactive element above them are dropped.
pub fn annotate(scene: &Scene) -> Vec<AccessibleLabel> {
    let mut labelled = HashSet::new();
    let mut labels = Vec::new();

    for (index, element) in scene.iter() {
        let Some(label) = element.label() else {
            continue;
        };

        let target = std::iter::once(index)
            .chain(scene.ancestors(index))
            .find(|candidate| is_interactive(scene, *candidate));
        let Some(target) = target else {
            debug!(element = element.name(), label; "No interactive element for label");
            continue;
        };

        if labelled.insert(target) {
            labels.push(AccessibleLabel {
                target,
                label: label.to_string(),
                adds_tabindex: scene.element(target).attribute("tabindex").is_none(),
            });
        }
    }

    debug!(labels = labels.len(); "Annotated accessible labels");
    labels
}
