//! YANG schema model and schema source stores
//!
//! - **revision** / **source**: identifiers and textual sources
//! - **context**: compiled set of modules
//! - **repository** / **filesystem**: pluggable source stores

mod context;
mod filesystem;
mod repository;
mod revision;
mod source;

pub use context::{ContextError, ModuleInfo, SchemaContext};
pub use filesystem::FilesystemSchemaRepository;
pub use repository::{InMemorySchemaRepository, SchemaRepository};
pub use revision::{InvalidRevision, Revision};
pub use source::{SourceError, SourceIdentifier, YangTextSchemaSource};
