//! The core diagnostic type for the PIDView error system.

use std::fmt;

use crate::error::{Severity, error_code::ErrorCode};

/// A diagnostic message produced while loading a document.
///
/// ```text
/// error[E102]: viewBox `0 0 -10 50` must have a positive width and height
///   = help: use `viewBox="min-x min-y width height"`
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::error("mismatched closing tag `g`")
            .with_code(ErrorCode::E002)
            .with_help("close `rect` first");

        assert!(diag.severity().is_error());
        assert_eq!(diag.code(), Some(ErrorCode::E002));
        assert_eq!(diag.message(), "mismatched closing tag `g`");
        assert_eq!(diag.help(), Some("close `rect` first"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("invalid transform").with_code(ErrorCode::E200);
        assert_eq!(diag.to_string(), "warning[E200]: invalid transform");

        let diag = Diagnostic::error("empty document");
        assert_eq!(diag.to_string(), "error: empty document");
    }
}
