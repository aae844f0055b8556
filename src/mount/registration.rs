//! Listener registration handle

use std::fmt;

use uuid::Uuid;

use crate::model::SchemaPath;

type Closer = Box<dyn FnOnce() + Send>;

/// Handle keeping a notification listener registered
///
/// Delivery stops once the handle is closed or dropped.
#[must_use = "dropping the registration stops notification delivery"]
pub struct ListenerRegistration {
    id: Uuid,
    path: SchemaPath,
    closer: Option<Closer>,
}

impl ListenerRegistration {
    /// Registration released by running `closer`
    pub fn new(path: SchemaPath, closer: impl FnOnce() + Send + 'static) -> Self {
        Self::with_id(Uuid::new_v4(), path, closer)
    }

    /// Registration with a caller-chosen id
    pub fn with_id(id: Uuid, path: SchemaPath, closer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            path,
            closer: Some(Box::new(closer)),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Notification type the listener receives
    #[must_use]
    pub const fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// Stop delivery to the listener
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(closer) = self.closer.take() {
            tracing::debug!(registration = %self.id, path = %self.path, "closing listener registration");
            closer();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
