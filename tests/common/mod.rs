//! Shared test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use netconf_eventsource::model::{ContainerNode, DataNode, InstanceIdentifier, SchemaPath};
use netconf_eventsource::mount::{
    DataBroker, DomMountPoint, LogicalDatastoreType, NodeDescriptor, NotificationCodec,
    NotificationRouter, ReadFailedError, ReadTransaction, RpcError, RpcFuture, RpcResult,
    RpcService,
};
use netconf_eventsource::{EventSourceMount, SchemaContext};
use tokio::runtime::{Handle, Runtime};

/// Runtime for delivery tasks of routers built outside any runtime
static BACKGROUND: LazyLock<Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("background runtime")
});

/// Handle of the calling runtime, or of the shared background runtime
pub fn runtime_handle() -> Handle {
    Handle::try_current().unwrap_or_else(|_| BACKGROUND.handle().clone())
}

/// What a fake read transaction answers
#[derive(Clone)]
pub enum ReadResponse {
    Found(DataNode),
    Absent,
    Fail(String),
    /// Never completes
    Hang,
}

/// Data broker whose transactions answer a fixed response and count closes
pub struct FakeDataBroker {
    response: ReadResponse,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub reads: Arc<Mutex<Vec<(LogicalDatastoreType, InstanceIdentifier)>>>,
}

impl FakeDataBroker {
    pub fn new(response: ReadResponse) -> Self {
        Self {
            response,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl DataBroker for FakeDataBroker {
    fn new_read_only_transaction(&self) -> Box<dyn ReadTransaction> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeTransaction {
            response: self.response.clone(),
            closed: Arc::clone(&self.closed),
            reads: Arc::clone(&self.reads),
        })
    }
}

struct FakeTransaction {
    response: ReadResponse,
    closed: Arc<AtomicUsize>,
    reads: Arc<Mutex<Vec<(LogicalDatastoreType, InstanceIdentifier)>>>,
}

#[async_trait]
impl ReadTransaction for FakeTransaction {
    async fn read(
        &self,
        store: LogicalDatastoreType,
        path: &InstanceIdentifier,
    ) -> Result<Option<DataNode>, ReadFailedError> {
        self.reads.lock().unwrap().push((store, path.clone()));
        match &self.response {
            ReadResponse::Found(node) => Ok(Some(node.clone())),
            ReadResponse::Absent => Ok(None),
            ReadResponse::Fail(message) => Err(ReadFailedError::new(message.clone())),
            ReadResponse::Hang => std::future::pending().await,
        }
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Rpc service recording every request and answering a fixed reply
pub struct RecordingRpcService {
    reply: Result<RpcResult, RpcError>,
    pub requests: Mutex<Vec<(SchemaPath, ContainerNode)>>,
}

impl RecordingRpcService {
    pub fn replying(reply: Result<RpcResult, RpcError>) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::replying(Ok(RpcResult::success(None)))
    }

    pub fn requests(&self) -> Vec<(SchemaPath, ContainerNode)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RpcService for RecordingRpcService {
    fn invoke_rpc(&self, operation: &SchemaPath, input: ContainerNode) -> RpcFuture {
        self.requests
            .lock()
            .unwrap()
            .push((operation.clone(), input));
        Box::pin(futures::future::ready(self.reply.clone()))
    }
}

/// Mount exposing all three services
pub struct Harness {
    pub rpc: Arc<RecordingRpcService>,
    pub broker: Arc<FakeDataBroker>,
    pub router: NotificationRouter,
    pub mount: EventSourceMount,
}

impl Harness {
    pub fn new(rpc: RecordingRpcService, broker: FakeDataBroker) -> Self {
        let rpc = Arc::new(rpc);
        let broker = Arc::new(broker);
        let router = NotificationRouter::new(runtime_handle());

        let mount_point = DomMountPoint::new(Arc::new(SchemaContext::default()))
            .with_rpc_service(rpc.clone())
            .with_notification_service(Arc::new(router.clone()))
            .with_data_broker(broker.clone());

        let mount = EventSourceMount::new(
            NodeDescriptor::new("device-1").with_address("192.0.2.1", 830),
            Arc::new(mount_point),
            codec(),
        )
        .expect("mount with every service");

        Self {
            rpc,
            broker,
            router,
            mount,
        }
    }

    pub fn with_streams(streams: DataNode) -> Self {
        Self::new(
            RecordingRpcService::succeeding(),
            FakeDataBroker::new(ReadResponse::Found(streams)),
        )
    }
}

pub fn codec() -> Arc<NotificationCodec> {
    NotificationCodec::shared().expect("codec bootstrap")
}
