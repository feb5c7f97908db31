//! Document store abstraction: push-based listeners plus one-shot writes.
//!
//! Listeners deliver full snapshots through a [`Subscription`]. Dropping the
//! subscription (or its [`ListenerRegistration`]) detaches the backend listener.
//! Writes never touch local state; their effect arrives as a later snapshot.

mod codec;
mod firestore;
mod memory;
mod path;

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

pub use firestore::{FirestoreStore, TokenSource};
pub use memory::MemoryStore;
pub use path::{CollectionPath, DocumentPath, UserPaths};

/// Schema-less document body.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A document inside a collection snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Full state of a collection at one point in time. Order is not meaningful.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSnapshot {
    pub documents: Vec<Document>,
}

/// Full state of a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSnapshot {
    Exists(Fields),
    Absent,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Document store API error: {0}")]
    Api(String),
    #[error("Document store requires a signed-in user")]
    Unauthenticated,
    #[error("Invalid document path: {0}")]
    InvalidPath(String),
    #[error("Document store listeners need a running tokio runtime")]
    NoRuntime,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle for an attached backend listener. Dropping it detaches the listener.
pub struct ListenerRegistration {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Detach the listener now.
    pub fn remove(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ListenerRegistration")
            .field("attached", &self.cancel.is_some())
            .finish()
    }
}

/// Stream of snapshots for one listener.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    registration: ListenerRegistration,
}

impl<T> Subscription<T> {
    pub const fn new(
        receiver: mpsc::UnboundedReceiver<T>,
        registration: ListenerRegistration,
    ) -> Self {
        Self {
            receiver,
            registration,
        }
    }

    /// Wait for the next snapshot. `None` once the listener has shut down.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take an already delivered snapshot without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Detach the backend listener and discard undelivered snapshots.
    pub fn unsubscribe(self) {
        let Self {
            mut receiver,
            registration,
        } = self;
        registration.remove();
        receiver.close();
    }
}

/// Backend document store consumed by the synchronizer.
pub trait DocumentStore: Send + Sync + 'static {
    /// Attach a listener that receives the whole collection on every change,
    /// starting with the current state.
    fn listen_collection(
        &self,
        path: &CollectionPath,
    ) -> StoreResult<Subscription<CollectionSnapshot>>;

    /// Attach a listener to one document, starting with its current state.
    fn listen_document(&self, path: &DocumentPath) -> StoreResult<Subscription<DocumentSnapshot>>;

    /// Create a document with a backend-generated id and return that id.
    fn add_document(
        &self,
        path: &CollectionPath,
        fields: Fields,
    ) -> impl Future<Output = StoreResult<String>> + Send;

    /// Create or fully replace a document.
    fn set_document(
        &self,
        path: &DocumentPath,
        fields: Fields,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn delete_document(&self, path: &DocumentPath) -> impl Future<Output = StoreResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn dropping_registration_runs_cancel_once() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let registration = ListenerRegistration::new(move || {
            assert!(!flag.swap(true, Ordering::SeqCst), "cancel ran twice");
        });
        assert!(!cancelled.load(Ordering::SeqCst));
        drop(registration);
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn unsubscribe_detaches_listener() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let (sender, receiver) = mpsc::unbounded_channel::<u8>();
        let subscription =
            Subscription::new(receiver, ListenerRegistration::new(move || flag.store(true, Ordering::SeqCst)));
        subscription.unsubscribe();
        assert!(cancelled.load(Ordering::SeqCst));
        assert!(sender.send(1).is_err());
    }
}
