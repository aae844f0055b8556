//! Event-source facade for mounted devices
//!
//! A mount is a live session to one managed device exposing capability-scoped
//! services. [`EventSourceMount`] turns three intents into calls on those
//! services:
//!
//! - list the device's notification streams
//! - subscribe to a stream, optionally replaying from a timestamp
//! - receive notifications of a given type
//!
//! ```rust,ignore
//! let mount = EventSourceMount::with_shared_codec(node, mount_point)?;
//! let streams = mount.list_available_streams().await?;
//! if let Some(stream) = streams.first() {
//!     mount.invoke_create_subscription(stream, last_seen).await?;
//! }
//! let registration = mount.register_notification_listener(listener, path);
//! ```

pub mod codec;
mod facade;
mod notifications;
mod registration;
mod services;
mod types;

pub use codec::{CodecError, NotificationCodec};
pub use facade::{EventSourceMount, SubscriptionFuture};
pub use notifications::NotificationRouter;
pub use registration::ListenerRegistration;
pub use services::{
    DataBroker, DomMountPoint, DomNotification, LogicalDatastoreType, MountPoint,
    NotificationListener, NotificationService, ReadFailedError, ReadTransaction, RpcError,
    RpcErrorInfo, RpcFuture, RpcResult, RpcService, ServiceKind,
};
pub use types::{CreateSubscriptionInput, DateAndTime, NodeDescriptor, Stream};
