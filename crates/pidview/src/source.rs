//! Diagram sources: where diagram markup comes from.
//!
//! The viewport never performs I/O on its own. A host hands it the result of
//! a [`DiagramSource::fetch`], either directly through
//! [`DiagramViewport::load_from`](crate::DiagramViewport::load_from) or
//! after an asynchronous fetch of its own through
//! [`DiagramViewport::finish_load`](crate::DiagramViewport::finish_load).

use std::{
    collections::HashMap,
    fmt, io,
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

/// Identifier of a diagram within a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Failure to retrieve diagram or overlay data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("diagram `{0}` not found")]
    NotFound(SourceId),

    #[error("invalid source id `{0}`")]
    InvalidId(SourceId),

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A host-side transport failure, passed through as text.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A store of diagram markup addressable by [`SourceId`].
pub trait DiagramSource {
    /// Retrieves the markup of one diagram.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the diagram does not exist or cannot be read.
    fn fetch(&self, id: &SourceId) -> Result<String, FetchError>;
}

/// Reads diagrams from `<dir>/<id>.svg`.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SourceId) -> Result<PathBuf, FetchError> {
        let name = id.as_str();
        let is_plain = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !is_plain {
            return Err(FetchError::InvalidId(id.clone()));
        }
        Ok(self.dir.join(format!("{name}.svg")))
    }
}

impl DiagramSource for FileSource {
    fn fetch(&self, id: &SourceId) -> Result<String, FetchError> {
        let path = self.path_for(id)?;
        debug!(path = path.display().to_string(); "Reading diagram");

        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound(id.clone()),
            _ => FetchError::Io { path, source },
        })
    }
}

/// Serves diagrams from memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    diagrams: HashMap<SourceId, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a diagram.
    pub fn insert(&mut self, id: impl Into<SourceId>, markup: impl Into<String>) {
        self.diagrams.insert(id.into(), markup.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, id: impl Into<SourceId>, markup: impl Into<String>) -> Self {
        self.insert(id, markup);
        self
    }
}

impl DiagramSource for MemorySource {
    fn fetch(&self, id: &SourceId) -> Result<String, FetchError> {
        self.diagrams
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("p1", "<svg/>");
        assert_eq!(source.fetch(&SourceId::new("p1")).unwrap(), "<svg/>");
        assert!(matches!(
            source.fetch(&SourceId::new("p2")),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn test_file_source_reads_by_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("unit-7.svg"), "<svg/>").unwrap();

        let source = FileSource::new(dir.path());
        assert_eq!(source.fetch(&SourceId::new("unit-7")).unwrap(), "<svg/>");
        assert!(matches!(
            source.fetch(&SourceId::new("unit-8")),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn test_file_source_rejects_paths() {
        let source = FileSource::new("/tmp");
        for id in ["../etc/passwd", "a/b", "", ".hidden"] {
            assert!(
                matches!(source.fetch(&SourceId::new(id)), Err(FetchError::InvalidId(_))),
                "id: {id}"
            );
        }
    }
}
