//! Directory-backed schema repository
//!
//! Layout: `{dir}/{name}.yang` for unrevisioned sources and
//! `{dir}/{name}@{YYYY-MM-DD}.yang` for revisioned ones.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::runtime::Handle;

use super::{Revision, SchemaRepository, SourceError, SourceIdentifier, YangTextSchemaSource};

const YANG_EXTENSION: &str = "yang";

/// Schema repository reading `.yang` files from one directory
#[derive(Debug, Clone)]
pub struct FilesystemSchemaRepository {
    dir: PathBuf,
}

impl FilesystemSchemaRepository {
    /// Create a repository over `dir`
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the sources
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for an identifier
    #[must_use]
    pub fn source_path(&self, identifier: &SourceIdentifier) -> PathBuf {
        let file = match &identifier.revision {
            Some(rev) => format!("{}@{rev}.{YANG_EXTENSION}", identifier.name),
            None => format!("{}.{YANG_EXTENSION}", identifier.name),
        };
        self.dir.join(file)
    }

    /// Identifiers of every source in the directory, sorted
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be read
    pub fn list(&self) -> std::io::Result<Vec<SourceIdentifier>> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match parse_file_name(&path) {
                Some(identifier) => found.push(identifier),
                None => {
                    tracing::debug!(path = %path.display(), "skipping non-schema file");
                }
            }
        }
        found.sort();
        Ok(found)
    }

    /// Newest source named `name`, unrevisioned files rank below any revision
    fn newest(&self, name: &str) -> std::io::Result<Option<SourceIdentifier>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|id| id.name == name)
            .max_by_key(|id| id.revision))
    }
}

/// Whether `name` can only ever address a file directly inside the directory
fn is_plain_module_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(c)) if c == name)
        && components.next().is_none()
        && !name.contains(['/', '\\', '@'])
}

/// Parse `name.yang` or `name@YYYY-MM-DD.yang`
fn parse_file_name(path: &Path) -> Option<SourceIdentifier> {
    if path.extension()? != YANG_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    match stem.split_once('@') {
        Some((name, rev)) if !name.is_empty() => {
            let revision: Revision = rev.parse().ok()?;
            Some(SourceIdentifier::new(name, Some(revision)))
        }
        Some(_) => None,
        None if stem.is_empty() => None,
        None => Some(SourceIdentifier::unrevisioned(stem)),
    }
}

impl FilesystemSchemaRepository {
    /// Resolve an identifier to its file, blocking on directory access
    fn resolve(&self, identifier: &SourceIdentifier) -> Result<YangTextSchemaSource, SourceError> {
        let resolved = if identifier.revision.is_some() {
            identifier.clone()
        } else {
            self.newest(&identifier.name)
                .map_err(|source| SourceError::Io {
                    identifier: identifier.clone(),
                    source,
                })?
                .ok_or_else(|| SourceError::NotFound(identifier.clone()))?
        };

        let path = self.source_path(&resolved);
        if !path.is_file() {
            return Err(SourceError::NotFound(identifier.clone()));
        }

        tracing::debug!(source = %resolved, path = %path.display(), "resolved schema source file");
        Ok(YangTextSchemaSource::from_file(resolved, path))
    }
}

#[async_trait]
impl SchemaRepository for FilesystemSchemaRepository {
    /// Directory access runs on the blocking pool when called within a tokio
    /// runtime and inline otherwise.
    async fn get_schema_source(
        &self,
        identifier: &SourceIdentifier,
    ) -> Result<YangTextSchemaSource, SourceError> {
        if !is_plain_module_name(&identifier.name) {
            tracing::warn!(source = %identifier, "rejecting schema name outside the schema directory");
            return Err(SourceError::NotFound(identifier.clone()));
        }

        let Ok(runtime) = Handle::try_current() else {
            return self.resolve(identifier);
        };

        let repository = self.clone();
        let requested = identifier.clone();
        runtime
            .spawn_blocking(move || repository.resolve(&requested))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(source = %identifier, error = %e, "schema source lookup aborted");
                Err(SourceError::Cancelled(identifier.clone()))
            })
    }
}
