//! In-process notification delivery
//!
//! [`NotificationRouter`] fans notifications received from a session out to
//! the listeners registered for their type. Every registration owns an
//! ordered queue drained by its own task, so one slow listener does not hold
//! back the others and each listener sees notifications in arrival order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{DomNotification, ListenerRegistration, NotificationListener, NotificationService};
use crate::model::SchemaPath;

struct Subscriber {
    path: SchemaPath,
    queue: mpsc::UnboundedSender<Arc<DomNotification>>,
    active: Arc<AtomicBool>,
}

type Subscribers = Arc<Mutex<HashMap<Uuid, Subscriber>>>;

/// Notification service delivering on tokio tasks
///
/// Delivery tasks run on the runtime the router was built with, so listeners
/// may be registered from any thread, inside that runtime or not.
#[derive(Clone)]
pub struct NotificationRouter {
    subscribers: Subscribers,
    runtime: Handle,
}

impl NotificationRouter {
    /// Router delivering on `runtime`
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            subscribers: Subscribers::default(),
            runtime,
        }
    }

    /// Router delivering on the runtime of the calling context
    ///
    /// # Errors
    ///
    /// Returns error if called outside a tokio runtime
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    /// Queue `notification` for every listener registered for its type
    ///
    /// Returns how many registrations accepted it.
    pub fn publish(&self, notification: DomNotification) -> usize {
        let notification = Arc::new(notification);
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let accepted = subscribers
            .values()
            .filter(|s| s.path == notification.path)
            .filter(|s| s.queue.send(Arc::clone(&notification)).is_ok())
            .count();

        tracing::trace!(path = %notification.path, accepted, "published notification");
        accepted
    }

    /// Number of live registrations
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl NotificationService for NotificationRouter {
    fn register_notification_listener(
        &self,
        listener: Arc<dyn NotificationListener>,
        path: SchemaPath,
    ) -> ListenerRegistration {
        let id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<DomNotification>>();
        let active = Arc::new(AtomicBool::new(true));

        let running = Arc::clone(&active);
        self.runtime.spawn(async move {
            while let Some(notification) = rx.recv().await {
                if !running.load(Ordering::Acquire) {
                    break;
                }
                listener.on_notification(&notification);
            }
        });

        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Subscriber {
                    path: path.clone(),
                    queue: tx,
                    active: Arc::clone(&active),
                },
            );
        tracing::debug!(registration = %id, path = %path, "listener registered");

        let subscribers = Arc::clone(&self.subscribers);
        ListenerRegistration::with_id(id, path, move || {
            let removed = subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
            if let Some(subscriber) = removed {
                subscriber.active.store(false, Ordering::Release);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::{ContainerNode, QName, QNameModule};

    fn path(name: &str) -> SchemaPath {
        SchemaPath::top_level(QName::new(&QNameModule::new("urn:test", None), name))
    }

    fn notification(path: &SchemaPath, seq: u32) -> DomNotification {
        let name = path.last().unwrap().clone();
        DomNotification {
            path: path.clone(),
            body: ContainerNode::new(name.clone())
                .with_leaf(name.sibling("seq"), crate::model::LeafValue::Uint32(seq)),
            event_time: None,
        }
    }

    fn seq_of(n: &DomNotification) -> u32 {
        match n.body.children.first() {
            Some(crate::model::DataNode::Leaf(leaf)) => match leaf.value {
                crate::model::LeafValue::Uint32(seq) => seq,
                _ => u32::MAX,
            },
            _ => u32::MAX,
        }
    }

    #[tokio::test]
    async fn delivers_in_arrival_order() {
        let router = NotificationRouter::try_current().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let event = path("event");
        let _registration = router.register_notification_listener(
            Arc::new(move |n: &DomNotification| {
                let _ = tx.send(seq_of(n));
            }),
            event.clone(),
        );

        for seq in 0..5 {
            assert_eq!(router.publish(notification(&event, seq)), 1);
        }

        let mut received = Vec::new();
        for _ in 0..5 {
            received.push(
                tokio::time::timeout(Duration::from_secs(1), rx.recv())
                    .await
                    .unwrap()
                    .unwrap(),
            );
        }
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn only_matching_type_is_delivered() {
        let router = NotificationRouter::try_current().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _registration = router.register_notification_listener(
            Arc::new(move |n: &DomNotification| {
                let _ = tx.send(n.path.clone());
            }),
            path("wanted"),
        );

        assert_eq!(router.publish(notification(&path("other"), 0)), 0);
        assert_eq!(router.publish(notification(&path("wanted"), 1)), 1);

        let got = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, path("wanted"));
    }

    #[tokio::test]
    async fn closing_stops_delivery() {
        let router = NotificationRouter::try_current().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let event = path("event");
        let registration = router.register_notification_listener(
            Arc::new(move |n: &DomNotification| {
                let _ = tx.send(seq_of(n));
            }),
            event.clone(),
        );
        assert_eq!(router.listener_count(), 1);

        registration.close();
        assert_eq!(router.listener_count(), 0);
        assert_eq!(router.publish(notification(&event, 7)), 0);

        // delivery task exits and drops the listener, closing the channel
        let end = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(end, None);
    }

    #[test]
    fn registers_outside_runtime_context() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let router = NotificationRouter::new(runtime.handle().clone());
        let event = path("event");

        let (tx, rx) = std::sync::mpsc::channel();
        let registration = router.register_notification_listener(
            Arc::new(move |n: &DomNotification| {
                let _ = tx.send(seq_of(n));
            }),
            event.clone(),
        );

        assert_eq!(router.publish(notification(&event, 3)), 1);
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 3);

        registration.close();
        assert_eq!(router.listener_count(), 0);
    }

    #[test]
    fn try_current_fails_outside_runtime() {
        assert!(NotificationRouter::try_current().is_err());
    }
}
