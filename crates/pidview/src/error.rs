//! Error types for PIDView operations.
//!
//! This module provides the main error type [`PidviewError`] which wraps
//! the failures that can end a load or an export. Overlay application has
//! no error path: selector misses and unmeasurable elements degrade to
//! warnings.

use std::io;

use thiserror::Error;

use pidview_parser::ParseError;

use crate::source::FetchError;

/// The main error type for PIDView operations.
///
/// `Fetch` and `Parse` are terminal for a load attempt: the controller keeps
/// no partial scene and the diagram area stays empty until the host starts a
/// new load.
#[derive(Debug, Error)]
pub enum PidviewError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for PidviewError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
