//! Capability-scoped services a mount exposes
//!
//! These are the seams to the session layer. Implementations complete their
//! futures on their own execution context; the facade never spawns work.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::future::BoxFuture;
use thiserror::Error;

use super::ListenerRegistration;
use crate::model::{ContainerNode, DataNode, InstanceIdentifier, SchemaPath};
use crate::schema::SchemaContext;

/// Datastore a read targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalDatastoreType {
    Configuration,
    Operational,
}

/// Services a mount may provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Rpc,
    Notification,
    DataBroker,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc => write!(f, "rpc service"),
            Self::Notification => write!(f, "notification service"),
            Self::DataBroker => write!(f, "data broker"),
        }
    }
}

/// Read of the data tree failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("read failed: {message}")]
pub struct ReadFailedError {
    pub message: String,
}

impl ReadFailedError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One `rpc-error` element reported by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcErrorInfo {
    /// `error-tag`, e.g. `operation-failed`
    pub tag: String,
    pub message: Option<String>,
}

impl fmt::Display for RpcErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.tag),
            None => f.write_str(&self.tag),
        }
    }
}

/// Remote operation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Session could not carry the request or the reply
    #[error("transport failure: {0}")]
    Transport(String),

    /// Device answered with `rpc-error` elements
    #[error("device reported {}", format_errors(.0))]
    Remote(Vec<RpcErrorInfo>),
}

fn format_errors(errors: &[RpcErrorInfo]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reply to an operation: output and any reported errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcResult {
    pub output: Option<ContainerNode>,
    pub errors: Vec<RpcErrorInfo>,
}

impl RpcResult {
    /// Successful reply carrying `output`
    #[must_use]
    pub const fn success(output: Option<ContainerNode>) -> Self {
        Self {
            output,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Pending reply of a submitted operation
pub type RpcFuture = BoxFuture<'static, Result<RpcResult, RpcError>>;

/// Invokes operations on the device
pub trait RpcService: Send + Sync {
    /// Submit `operation` with `input`; the request is sent before this returns
    fn invoke_rpc(&self, operation: &SchemaPath, input: ContainerNode) -> RpcFuture;
}

/// Read-only view of the data tree
#[async_trait]
pub trait ReadTransaction: Send + Sync {
    async fn read(
        &self,
        store: LogicalDatastoreType,
        path: &InstanceIdentifier,
    ) -> Result<Option<DataNode>, ReadFailedError>;

    /// Release the transaction
    fn close(&self);
}

/// Opens transactions against the data tree
pub trait DataBroker: Send + Sync {
    fn new_read_only_transaction(&self) -> Box<dyn ReadTransaction>;
}

/// Notification received from the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNotification {
    /// Notification type
    pub path: SchemaPath,
    pub body: ContainerNode,
    pub event_time: Option<DateTime<FixedOffset>>,
}

/// Receives notifications of the type it was registered for
pub trait NotificationListener: Send + Sync {
    fn on_notification(&self, notification: &DomNotification);
}

impl<F> NotificationListener for F
where
    F: Fn(&DomNotification) + Send + Sync,
{
    fn on_notification(&self, notification: &DomNotification) {
        self(notification);
    }
}

/// Delivers device notifications to registered listeners
pub trait NotificationService: Send + Sync {
    fn register_notification_listener(
        &self,
        listener: Arc<dyn NotificationListener>,
        path: SchemaPath,
    ) -> ListenerRegistration;
}

/// Service locator for one mounted device
pub trait MountPoint: Send + Sync {
    /// Schema model of the device
    fn schema_context(&self) -> Arc<SchemaContext>;

    fn rpc_service(&self) -> Option<Arc<dyn RpcService>>;

    fn notification_service(&self) -> Option<Arc<dyn NotificationService>>;

    fn data_broker(&self) -> Option<Arc<dyn DataBroker>>;

    /// Whether the capability is bound
    fn has_service(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::Rpc => self.rpc_service().is_some(),
            ServiceKind::Notification => self.notification_service().is_some(),
            ServiceKind::DataBroker => self.data_broker().is_some(),
        }
    }
}

/// Mount point assembled from whichever services the session layer provides
#[derive(Clone)]
pub struct DomMountPoint {
    schema_context: Arc<SchemaContext>,
    rpc: Option<Arc<dyn RpcService>>,
    notifications: Option<Arc<dyn NotificationService>>,
    data_broker: Option<Arc<dyn DataBroker>>,
}

impl DomMountPoint {
    /// Mount point with no services bound
    #[must_use]
    pub fn new(schema_context: Arc<SchemaContext>) -> Self {
        Self {
            schema_context,
            rpc: None,
            notifications: None,
            data_broker: None,
        }
    }

    #[must_use]
    pub fn with_rpc_service(mut self, service: Arc<dyn RpcService>) -> Self {
        self.rpc = Some(service);
        self
    }

    #[must_use]
    pub fn with_notification_service(mut self, service: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(service);
        self
    }

    #[must_use]
    pub fn with_data_broker(mut self, broker: Arc<dyn DataBroker>) -> Self {
        self.data_broker = Some(broker);
        self
    }
}

impl fmt::Debug for DomMountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomMountPoint")
            .field("rpc", &self.rpc.is_some())
            .field("notifications", &self.notifications.is_some())
            .field("data_broker", &self.data_broker.is_some())
            .finish_non_exhaustive()
    }
}

impl MountPoint for DomMountPoint {
    fn schema_context(&self) -> Arc<SchemaContext> {
        Arc::clone(&self.schema_context)
    }

    fn rpc_service(&self) -> Option<Arc<dyn RpcService>> {
        self.rpc.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService>> {
        self.notifications.clone()
    }

    fn data_broker(&self) -> Option<Arc<dyn DataBroker>> {
        self.data_broker.clone()
    }
}
