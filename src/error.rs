//! Error types for the event-source facade and schema resolver

use thiserror::Error;

use crate::mount::{CodecError, ReadFailedError, RpcError};

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the event-source facade or schema resolver
#[derive(Debug, Error)]
pub enum Error {
    /// A capability the mount must provide is missing
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Operational data read failed
    #[error("io error: {0}")]
    Io(#[from] ReadFailedError),

    /// Remote operation failed or returned an error payload
    #[error("rpc invocation failed: {0}")]
    RpcInvocation(#[from] RpcError),

    /// Schema source could not be resolved
    #[error("unable to get schema {identifier}")]
    SchemaResolution {
        /// Requested identifier, `name@revision` or bare `name`
        identifier: String,
        /// Underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Binding-to-tree conversion failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any failure while resolving `identifier` into a single resolution error
    pub(crate) fn schema_resolution(
        identifier: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SchemaResolution {
            identifier: identifier.into(),
            source: source.into(),
        }
    }
}
