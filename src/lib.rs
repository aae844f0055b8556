//! NETCONF event-source mount facade and YANG schema-source resolver
//!
//! This library provides two independent services for a network-controller
//! platform:
//! - An event-source facade over a mounted NETCONF device: list notification
//!   streams, create subscriptions (with optional replay), register
//!   notification listeners
//! - A schema-source resolver that returns a YANG module's text by name and
//!   revision
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Event-source consumer                │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 EventSourceMount                      │
//! │   Streams  │  create-subscription  │  Listeners      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            Mount point (device session)               │
//! │   RPC  │  Notifications  │  Data broker               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Operations emit `tracing` events; install a subscriber to see them.

pub mod config;
pub mod error;
pub mod model;
pub mod mount;
pub mod schema;
pub mod yanglib;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{ContainerNode, DataNode, InstanceIdentifier, QName, QNameModule, SchemaPath};
pub use mount::{
    DomMountPoint, DomNotification, EventSourceMount, ListenerRegistration, MountPoint,
    NodeDescriptor, NotificationCodec, NotificationListener, NotificationRouter, Stream,
};
pub use schema::{
    FilesystemSchemaRepository, InMemorySchemaRepository, SchemaContext, SchemaRepository,
    SourceIdentifier,
};
pub use yanglib::{SchemaSourceResolver, YangLibService};
