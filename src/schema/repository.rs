//! Pluggable schema source stores

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Revision, SourceError, SourceIdentifier, YangTextSchemaSource};

/// Asynchronous store of YANG text sources
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Fetch the text source for an identifier
    ///
    /// An identifier without revision resolves to the newest available revision.
    async fn get_schema_source(
        &self,
        identifier: &SourceIdentifier,
    ) -> Result<YangTextSchemaSource, SourceError>;
}

type Revisions = BTreeMap<Option<Revision>, Arc<[u8]>>;

/// Repository holding sources in memory
#[derive(Debug, Default)]
pub struct InMemorySchemaRepository {
    sources: RwLock<BTreeMap<String, Revisions>>,
}

impl InMemorySchemaRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source while building the repository
    #[must_use]
    pub fn with_source(mut self, identifier: SourceIdentifier, text: &str) -> Self {
        self.sources
            .get_mut()
            .entry(identifier.name)
            .or_default()
            .insert(identifier.revision, Arc::from(text.as_bytes()));
        self
    }

    /// Register or replace a source
    pub async fn register(&self, identifier: SourceIdentifier, text: &str) {
        tracing::debug!(source = %identifier, "registering schema source");
        self.sources
            .write()
            .await
            .entry(identifier.name)
            .or_default()
            .insert(identifier.revision, Arc::from(text.as_bytes()));
    }

    /// Remove a source, returning whether it was present
    pub async fn unregister(&self, identifier: &SourceIdentifier) -> bool {
        let mut sources = self.sources.write().await;
        let Some(revisions) = sources.get_mut(&identifier.name) else {
            return false;
        };
        let removed = revisions.remove(&identifier.revision).is_some();
        if revisions.is_empty() {
            sources.remove(&identifier.name);
        }
        removed
    }

    /// Identifiers of all registered sources
    pub async fn list(&self) -> Vec<SourceIdentifier> {
        self.sources
            .read()
            .await
            .iter()
            .flat_map(|(name, revisions)| {
                revisions
                    .keys()
                    .map(|rev| SourceIdentifier::new(name, *rev))
            })
            .collect()
    }
}

#[async_trait]
impl SchemaRepository for InMemorySchemaRepository {
    async fn get_schema_source(
        &self,
        identifier: &SourceIdentifier,
    ) -> Result<YangTextSchemaSource, SourceError> {
        let sources = self.sources.read().await;
        let revisions = sources
            .get(&identifier.name)
            .ok_or_else(|| SourceError::NotFound(identifier.clone()))?;

        let found = match identifier.revision {
            Some(rev) => revisions.get_key_value(&Some(rev)),
            None => revisions.last_key_value(),
        };

        found
            .map(|(rev, text)| {
                YangTextSchemaSource::from_bytes(
                    SourceIdentifier::new(&identifier.name, *rev),
                    Arc::clone(text),
                )
            })
            .ok_or_else(|| SourceError::NotFound(identifier.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn id(name: &str, rev: Option<&str>) -> SourceIdentifier {
        SourceIdentifier::new(name, rev.map(|r| r.parse().unwrap()))
    }

    fn text_of(source: &YangTextSchemaSource) -> String {
        let mut text = String::new();
        source.open_stream().unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[tokio::test]
    async fn unspecified_revision_resolves_newest() {
        let repo = InMemorySchemaRepository::new()
            .with_source(id("foo", Some("2014-01-01")), "old")
            .with_source(id("foo", Some("2019-01-01")), "new");

        let source = repo.get_schema_source(&id("foo", None)).await.unwrap();
        assert_eq!(text_of(&source), "new");
        assert_eq!(source.identifier(), &id("foo", Some("2019-01-01")));
    }

    #[tokio::test]
    async fn pinned_revision_must_match() {
        let repo = InMemorySchemaRepository::new().with_source(id("foo", Some("2014-01-01")), "old");

        let err = repo
            .get_schema_source(&id("foo", Some("2019-01-01")))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn register_and_unregister() {
        let repo = InMemorySchemaRepository::new();
        repo.register(id("bar", None), "module bar {}").await;
        assert_eq!(repo.list().await, vec![id("bar", None)]);

        assert!(repo.unregister(&id("bar", None)).await);
        assert!(!repo.unregister(&id("bar", None)).await);
        assert!(repo.list().await.is_empty());
    }
}
