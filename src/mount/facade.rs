//! Event-source facade over one mounted device

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::TryFutureExt;
use futures::future::BoxFuture;

use super::{
    CreateSubscriptionInput, DataBroker, ListenerRegistration, LogicalDatastoreType, MountPoint,
    NodeDescriptor, NotificationCodec, NotificationListener, NotificationService,
    ReadTransaction, RpcError, RpcResult, RpcService, ServiceKind, Stream,
};
use crate::model::SchemaPath;
use crate::schema::SchemaContext;
use crate::{Error, Result};

/// Pending reply of a `create-subscription` request
pub type SubscriptionFuture = BoxFuture<'static, Result<RpcResult>>;

/// Facade of a mounted device acting as an event source
///
/// Service references are resolved once at construction and never change.
/// The facade holds no disconnect logic: when the device goes away the
/// facade must simply stop being used.
pub struct EventSourceMount {
    node: NodeDescriptor,
    mount_point: Arc<dyn MountPoint>,
    rpc_service: Arc<dyn RpcService>,
    notification_service: Arc<dyn NotificationService>,
    data_broker: Arc<dyn DataBroker>,
    codec: Arc<NotificationCodec>,
}

impl EventSourceMount {
    /// Bind a facade to `mount_point`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if the mount lacks the rpc service,
    /// the notification service or the data broker
    pub fn new(
        node: NodeDescriptor,
        mount_point: Arc<dyn MountPoint>,
        codec: Arc<NotificationCodec>,
    ) -> Result<Self> {
        let rpc_service = require(&node, mount_point.rpc_service(), ServiceKind::Rpc)?;
        let notification_service = require(
            &node,
            mount_point.notification_service(),
            ServiceKind::Notification,
        )?;
        let data_broker = require(&node, mount_point.data_broker(), ServiceKind::DataBroker)?;

        tracing::debug!(node_id = %node.node_id, "event source mount created");

        Ok(Self {
            node,
            mount_point,
            rpc_service,
            notification_service,
            data_broker,
            codec,
        })
    }

    /// Bind a facade using the process-wide codec
    ///
    /// # Errors
    ///
    /// Returns error if the codec bootstrap failed or a service is missing
    pub fn with_shared_codec(node: NodeDescriptor, mount_point: Arc<dyn MountPoint>) -> Result<Self> {
        Self::new(node, mount_point, NotificationCodec::shared()?)
    }

    #[must_use]
    pub const fn node(&self) -> &NodeDescriptor {
        &self.node
    }

    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node.node_id
    }

    /// Schema model of the mounted device
    #[must_use]
    pub fn schema_context(&self) -> Arc<SchemaContext> {
        self.mount_point.schema_context()
    }

    /// Invoke `create-subscription` for `stream`
    ///
    /// When `last_event_time` is given and the stream supports replay the
    /// request carries it as the start time; otherwise the start time is
    /// omitted. The request is submitted before this returns and the reply
    /// resolves on the rpc service's context. A reply carrying `rpc-error`
    /// elements fails with [`Error::RpcInvocation`].
    ///
    /// # Errors
    ///
    /// The returned future fails with [`Error::RpcInvocation`]
    pub fn invoke_create_subscription(
        &self,
        stream: &Stream,
        last_event_time: Option<DateTime<Utc>>,
    ) -> SubscriptionFuture {
        if last_event_time.is_some() && !stream.replay_support {
            tracing::debug!(
                node_id = %self.node.node_id,
                stream = %stream.name,
                "stream does not support replay, subscribing without start time"
            );
        }

        let input = CreateSubscriptionInput::for_stream(stream, last_event_time);
        let node = self.codec.to_rpc_input(&input);

        tracing::debug!(
            node_id = %self.node.node_id,
            stream = %input.stream,
            start_time = ?input.start_time.as_ref().map(ToString::to_string),
            "invoking create-subscription"
        );

        let node_id = self.node.node_id.clone();
        let reply = self
            .rpc_service
            .invoke_rpc(self.codec.create_subscription_path(), node)
            .and_then(|result| async move {
                if result.is_success() {
                    Ok(result)
                } else {
                    Err(RpcError::Remote(result.errors))
                }
            })
            .map_err(move |e| {
                tracing::warn!(node_id = %node_id, error = %e, "create-subscription failed");
                Error::RpcInvocation(e)
            });

        Box::pin(reply)
    }

    /// Invoke `create-subscription` for `stream` without replay
    pub fn invoke_create_subscription_now(&self, stream: &Stream) -> SubscriptionFuture {
        self.invoke_create_subscription(stream, None)
    }

    /// Streams advertised by the device
    ///
    /// A device without the streams subtree advertises no streams; that is an
    /// empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the read fails and [`Error::Codec`] if the
    /// subtree cannot be decoded
    pub async fn list_available_streams(&self) -> Result<Vec<Stream>> {
        let read = {
            let tx = ScopedTransaction::new(self.data_broker.new_read_only_transaction());
            tx.read(LogicalDatastoreType::Operational, self.codec.streams_path())
                .await
        };

        let streams = match read {
            Ok(Some(node)) => self.codec.streams_from_node(&node)?,
            Ok(None) => {
                tracing::debug!(node_id = %self.node.node_id, "device advertises no streams");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(node_id = %self.node.node_id, error = %e, "failed to read streams");
                return Err(e.into());
            }
        };

        tracing::debug!(
            node_id = %self.node.node_id,
            count = streams.len(),
            "read available streams"
        );
        Ok(streams)
    }

    /// Register `listener` for notifications of type `notification_path`
    ///
    /// Payloads are passed through undecoded; the path alone determines their
    /// shape.
    pub fn register_notification_listener(
        &self,
        listener: Arc<dyn NotificationListener>,
        notification_path: SchemaPath,
    ) -> ListenerRegistration {
        tracing::debug!(
            node_id = %self.node.node_id,
            path = %notification_path,
            "registering notification listener"
        );
        self.notification_service
            .register_notification_listener(listener, notification_path)
    }
}

impl fmt::Debug for EventSourceMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSourceMount")
            .field("node_id", &self.node.node_id)
            .finish_non_exhaustive()
    }
}

fn require<T: ?Sized>(node: &NodeDescriptor, service: Option<Arc<T>>, kind: ServiceKind) -> Result<Arc<T>> {
    service.ok_or_else(|| {
        tracing::error!(node_id = %node.node_id, service = %kind, "service not present on mount point");
        Error::Precondition(format!(
            "service not present on mount point {}: {kind}",
            node.node_id
        ))
    })
}

/// Read transaction closed when it leaves scope
struct ScopedTransaction(Box<dyn ReadTransaction>);

impl ScopedTransaction {
    fn new(tx: Box<dyn ReadTransaction>) -> Self {
        Self(tx)
    }
}

impl Deref for ScopedTransaction {
    type Target = dyn ReadTransaction;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl Drop for ScopedTransaction {
    fn drop(&mut self) {
        self.0.close();
    }
}
