//! Schema source identifiers and textual sources

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Revision;

/// Name and optional revision of a schema module
///
/// An absent revision means no revision constraint: the newest available
/// source is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceIdentifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
}

impl SourceIdentifier {
    /// Create an identifier
    #[must_use]
    pub fn new(name: &str, revision: Option<Revision>) -> Self {
        Self {
            name: name.to_string(),
            revision,
        }
    }

    /// Identifier with no revision constraint
    #[must_use]
    pub fn unrevisioned(name: &str) -> Self {
        Self::new(name, None)
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "{}@{rev}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Failures reported by a schema repository
#[derive(Debug, Error)]
pub enum SourceError {
    /// No source matches the identifier
    #[error("schema source {0} not found")]
    NotFound(SourceIdentifier),

    /// Backing store could not be read
    #[error("failed to read schema source {identifier}: {source}")]
    Io {
        identifier: SourceIdentifier,
        #[source]
        source: io::Error,
    },

    /// Fetch was abandoned before it produced a source
    #[error("fetch of schema source {0} was cancelled")]
    Cancelled(SourceIdentifier),
}

#[derive(Debug, Clone)]
enum Origin {
    Bytes(Arc<[u8]>),
    File(PathBuf),
}

/// YANG text of one schema module
///
/// The text is not held eagerly for file-backed sources; it is read when the
/// stream is opened.
#[derive(Debug, Clone)]
pub struct YangTextSchemaSource {
    identifier: SourceIdentifier,
    origin: Origin,
}

impl YangTextSchemaSource {
    /// Source backed by in-memory text
    #[must_use]
    pub fn from_bytes(identifier: SourceIdentifier, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            identifier,
            origin: Origin::Bytes(bytes.into()),
        }
    }

    /// Source backed by a file, opened lazily
    #[must_use]
    pub const fn from_file(identifier: SourceIdentifier, path: PathBuf) -> Self {
        Self {
            identifier,
            origin: Origin::File(path),
        }
    }

    /// Identifier this source was resolved for
    #[must_use]
    pub const fn identifier(&self) -> &SourceIdentifier {
        &self.identifier
    }

    /// Open a byte stream over the module text
    ///
    /// # Errors
    ///
    /// Returns error if the backing file cannot be opened
    pub fn open_stream(&self) -> io::Result<Box<dyn Read + Send>> {
        match &self.origin {
            Origin::Bytes(bytes) => Ok(Box::new(io::Cursor::new(Arc::clone(bytes)))),
            Origin::File(path) => Ok(Box::new(std::fs::File::open(path)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_revision_when_present() {
        let rev = "2018-02-20".parse().unwrap();
        assert_eq!(
            SourceIdentifier::new("ietf-interfaces", Some(rev)).to_string(),
            "ietf-interfaces@2018-02-20"
        );
        assert_eq!(
            SourceIdentifier::unrevisioned("ietf-interfaces").to_string(),
            "ietf-interfaces"
        );
    }

    #[test]
    fn bytes_source_streams_text() {
        let source = YangTextSchemaSource::from_bytes(
            SourceIdentifier::unrevisioned("foo"),
            b"module foo {}".as_slice(),
        );
        let mut text = String::new();
        source.open_stream().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "module foo {}");
    }

    #[test]
    fn missing_file_fails_on_open() {
        let source = YangTextSchemaSource::from_file(
            SourceIdentifier::unrevisioned("foo"),
            PathBuf::from("/nonexistent/foo.yang"),
        );
        assert!(source.open_stream().is_err());
    }
}
