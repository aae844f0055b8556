//! Blocking resolver over an asynchronous schema repository

use std::io::Read;
use std::sync::Arc;

use crate::schema::{Revision, SchemaRepository, SourceIdentifier};
use crate::{Error, Result};

/// Provides schema sources by name and revision
pub trait YangLibService: Send + Sync {
    /// Raw YANG text of module `name` at `revision`
    ///
    /// An empty `revision` means no revision constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaResolution`] for any failure
    fn get_schema(&self, name: &str, revision: &str) -> Result<String>;
}

/// [`YangLibService`] backed by a [`SchemaRepository`]
///
/// Blocks the calling thread while the repository fetch runs. Call it from
/// synchronous code or from `spawn_blocking`, not from an async task.
#[derive(Clone)]
pub struct SchemaSourceResolver {
    repository: Arc<dyn SchemaRepository>,
}

impl SchemaSourceResolver {
    #[must_use]
    pub fn new(repository: Arc<dyn SchemaRepository>) -> Self {
        Self { repository }
    }

    /// Lookup key for a request; empty revision means unspecified
    ///
    /// # Errors
    ///
    /// Returns error if a non-empty revision is not `YYYY-MM-DD`
    pub fn source_identifier(name: &str, revision: &str) -> Result<SourceIdentifier> {
        if revision.is_empty() {
            return Ok(SourceIdentifier::unrevisioned(name));
        }
        let revision: Revision = revision
            .parse()
            .map_err(|e| Error::schema_resolution(format!("{name}@{revision}"), e))?;
        Ok(SourceIdentifier::new(name, Some(revision)))
    }
}

impl YangLibService for SchemaSourceResolver {
    fn get_schema(&self, name: &str, revision: &str) -> Result<String> {
        tracing::debug!(name, revision, "attempting load for schema source");
        let identifier = Self::source_identifier(name, revision)?;
        let key = identifier.to_string();

        let source = futures::executor::block_on(self.repository.get_schema_source(&identifier))
            .map_err(|e| {
                tracing::warn!(source = %key, error = %e, "schema source fetch failed");
                Error::schema_resolution(key.clone(), e)
            })?;

        let mut bytes = Vec::new();
        source
            .open_stream()
            .and_then(|mut stream| stream.read_to_end(&mut bytes))
            .map_err(|e| Error::schema_resolution(key.clone(), e))?;

        String::from_utf8(bytes).map_err(|e| Error::schema_resolution(key, e))
    }
}

impl std::fmt::Debug for SchemaSourceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaSourceResolver").finish_non_exhaustive()
    }
}
