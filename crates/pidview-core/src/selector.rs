//! Opaque element selectors.
//!
//! Overlay data refers to diagram elements through selector strings produced
//! by an upstream system. PIDView never interprets them beyond the three
//! simple forms below; anything else is matched as an element name.
//!
//! | Form     | Matches                                   |
//! |----------|-------------------------------------------|
//! | `#id`    | every element whose `id` is `id`          |
//! | `.class` | every element carrying class tag `class`  |
//! | `name`   | every element named `name` (e.g. `rect`)  |
//!
//! Everything after the leading sigil is taken verbatim, so `#P-101.A` is the
//! id `P-101.A`, not a compound selector.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A selector string as received from overlay data.
///
/// # Examples
///
/// ```
/// use pidview_core::selector::{Selector, SelectorKind};
///
/// let sel = Selector::new("#P-101");
/// assert_eq!(sel.kind(), SelectorKind::Id("P-101"));
/// assert_eq!(Selector::new(".valve").kind(), SelectorKind::Class("valve"));
/// assert_eq!(sel.as_str(), "#P-101");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

/// The interpreted form of a [`Selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind<'a> {
    Id(&'a str),
    Class(&'a str),
    Name(&'a str),
}

impl Selector {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the selector exactly as received.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> SelectorKind<'_> {
        let raw = self.0.trim();
        if let Some(id) = raw.strip_prefix('#') {
            SelectorKind::Id(id)
        } else if let Some(class) = raw.strip_prefix('.') {
            SelectorKind::Class(class)
        } else {
            SelectorKind::Name(raw)
        }
    }

    /// Returns `true` if the selector matches the syntax accepted in tag maps:
    /// an optional `#` followed by one or more of `[A-Za-z0-9_.:-]`.
    ///
    /// ```
    /// use pidview_core::selector::Selector;
    ///
    /// assert!(Selector::new("#P-101").is_well_formed());
    /// assert!(Selector::new("valve.open").is_well_formed());
    /// assert!(!Selector::new("#").is_well_formed());
    /// assert!(!Selector::new("g > rect").is_well_formed());
    /// ```
    pub fn is_well_formed(&self) -> bool {
        let body = self.0.strip_prefix('#').unwrap_or(&self.0);
        !body.is_empty()
            && body
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Selector {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
