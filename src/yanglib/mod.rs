//! Schema-source resolution service
//!
//! Resolves a module name and optional revision to the module's YANG text,
//! for endpoints that distribute schemas to remote peers.

mod resolver;

pub use resolver::{SchemaSourceResolver, YangLibService};
