//! Error codes for the PIDView diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Document structure errors
//! - `E1xx` - Root frame errors
//! - `E2xx` - Attribute syntax problems (reported as warnings)

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Document Structure Errors (E0xx)
    // =========================================================================
    /// Malformed markup.
    ///
    /// The tokenizer could not read a tag or attribute.
    E001,

    /// Mismatched closing tag.
    ///
    /// A closing tag does not match the most recently opened element, or
    /// appears with no element open.
    E002,

    /// Unclosed element.
    ///
    /// The input ended while one or more elements were still open.
    E003,

    /// Empty document.
    ///
    /// The input contains no root element.
    E004,

    /// Multiple root elements.
    ///
    /// A second top-level element follows the root element.
    E005,

    // =========================================================================
    // Root Frame Errors (E1xx)
    // =========================================================================
    /// Root element is not `<svg>`.
    E100,

    /// Missing root frame.
    ///
    /// The root `<svg>` has neither a `viewBox` nor usable `width` and
    /// `height` attributes.
    E101,

    /// Invalid `viewBox`.
    ///
    /// The `viewBox` is not four numbers, or its width or height is not
    /// positive.
    E102,

    // =========================================================================
    // Attribute Syntax (E2xx)
    // =========================================================================
    /// Invalid `transform` attribute. The element keeps an identity transform.
    E200,

    /// Invalid path data. The path is treated as unmeasurable.
    E201,

    /// Invalid numeric attribute. The element is treated as unmeasurable.
    E202,

    /// Unknown or malformed entity reference. The text is kept as written.
    E203,
}

impl ErrorCode {
    /// Returns a short description of this error code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed markup",
            ErrorCode::E002 => "mismatched closing tag",
            ErrorCode::E003 => "unclosed element",
            ErrorCode::E004 => "empty document",
            ErrorCode::E005 => "multiple root elements",
            ErrorCode::E100 => "root element is not svg",
            ErrorCode::E101 => "missing root frame",
            ErrorCode::E102 => "invalid viewBox",
            ErrorCode::E200 => "invalid transform",
            ErrorCode::E201 => "invalid path data",
            ErrorCode::E202 => "invalid number",
            ErrorCode::E203 => "invalid entity reference",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E102.to_string(), "E102");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E101.description(), "missing root frame");
        assert_eq!(ErrorCode::E200.description(), "invalid transform");
        assert_eq!(ErrorCode::E203.description(), "invalid entity reference");
    }
}
