//! In-process document store.
//!
//! Behaves like the hosted store from a listener's point of view: every
//! listener receives the current state on attach and a fresh full snapshot
//! after each write that touches what it watches.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;

use super::{
    CollectionPath, CollectionSnapshot, Document, DocumentPath, DocumentSnapshot, DocumentStore,
    Fields, ListenerRegistration, StoreResult, Subscription,
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    collections: HashMap<CollectionPath, BTreeMap<String, Fields>>,
    listeners: HashMap<u64, Listener>,
    next_listener_id: u64,
    operations: u64,
}

enum Listener {
    Collection {
        path: CollectionPath,
        sender: mpsc::UnboundedSender<CollectionSnapshot>,
    },
    Document {
        path: DocumentPath,
        sender: mpsc::UnboundedSender<DocumentSnapshot>,
    },
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Number of listen and write calls received so far.
    #[must_use]
    pub fn operation_count(&self) -> u64 {
        self.lock().operations
    }

    /// Write a document directly, as another client of the backend would.
    pub fn put(&self, path: &DocumentPath, fields: Fields) {
        let mut inner = self.lock();
        inner
            .collections
            .entry(path.collection().clone())
            .or_default()
            .insert(path.id().to_string(), fields);
        inner.notify(path);
    }

    /// Remove a document directly. Returns whether it existed.
    pub fn remove(&self, path: &DocumentPath) -> bool {
        let mut inner = self.lock();
        let existed = inner
            .collections
            .get_mut(path.collection())
            .and_then(|documents| documents.remove(path.id()))
            .is_some();
        if existed {
            inner.notify(path);
        }
        existed
    }

    /// Current fields of a document, if present.
    #[must_use]
    pub fn get(&self, path: &DocumentPath) -> Option<Fields> {
        self.lock()
            .collections
            .get(path.collection())
            .and_then(|documents| documents.get(path.id()))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, inner: &mut MemoryInner, listener: Listener) -> ListenerRegistration {
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.operations += 1;
        inner.listeners.insert(id, listener);

        let weak: Weak<Mutex<MemoryInner>> = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                inner.listeners.remove(&id);
            }
        })
    }
}

impl MemoryInner {
    fn collection_snapshot(&self, path: &CollectionPath) -> CollectionSnapshot {
        let documents = self
            .collections
            .get(path)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        CollectionSnapshot { documents }
    }

    fn document_snapshot(&self, path: &DocumentPath) -> DocumentSnapshot {
        self.collections
            .get(path.collection())
            .and_then(|documents| documents.get(path.id()))
            .map_or(DocumentSnapshot::Absent, |fields| {
                DocumentSnapshot::Exists(fields.clone())
            })
    }

    fn notify(&self, changed: &DocumentPath) {
        for listener in self.listeners.values() {
            match listener {
                Listener::Collection { path, sender } if path == changed.collection() => {
                    let _ = sender.send(self.collection_snapshot(path));
                }
                Listener::Document { path, sender } if path == changed => {
                    let _ = sender.send(self.document_snapshot(path));
                }
                _ => {}
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    fn listen_collection(
        &self,
        path: &CollectionPath,
    ) -> StoreResult<Subscription<CollectionSnapshot>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let _ = sender.send(inner.collection_snapshot(path));
        let registration = self.register(&mut inner, Listener::Collection {
            path: path.clone(),
            sender,
        });
        Ok(Subscription::new(receiver, registration))
    }

    fn listen_document(&self, path: &DocumentPath) -> StoreResult<Subscription<DocumentSnapshot>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let _ = sender.send(inner.document_snapshot(path));
        let registration = self.register(&mut inner, Listener::Document {
            path: path.clone(),
            sender,
        });
        Ok(Subscription::new(receiver, registration))
    }

    async fn add_document(&self, path: &CollectionPath, fields: Fields) -> StoreResult<String> {
        let id = uuid::Uuid::now_v7().simple().to_string();
        let document = path.doc(&id)?;
        self.lock().operations += 1;
        self.put(&document, fields);
        Ok(id)
    }

    async fn set_document(&self, path: &DocumentPath, fields: Fields) -> StoreResult<()> {
        self.lock().operations += 1;
        self.put(path, fields);
        Ok(())
    }

    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()> {
        self.lock().operations += 1;
        self.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    fn schedules() -> CollectionPath {
        CollectionPath::from_segments(["artifacts", "app", "users", "u1", "schedules"]).unwrap()
    }

    #[tokio::test]
    async fn collection_listener_gets_initial_and_updated_snapshots() {
        let store = MemoryStore::new();
        let path = schedules();
        store.put(&path.doc("a").unwrap(), fields(json!({"description": "A"})));

        let mut subscription = store.listen_collection(&path).unwrap();
        let initial = subscription.try_next().unwrap();
        assert_eq!(initial.documents.len(), 1);

        let id = store
            .add_document(&path, fields(json!({"description": "B"})))
            .await
            .unwrap();
        let updated = subscription.try_next().unwrap();
        assert_eq!(updated.documents.len(), 2);
        assert!(updated.documents.iter().any(|document| document.id == id));
        assert!(subscription.try_next().is_none());
    }

    #[tokio::test]
    async fn document_listener_reports_absent_after_delete() {
        let store = MemoryStore::new();
        let note = CollectionPath::from_segments(["artifacts", "app", "users", "u1", "notes"])
            .unwrap()
            .doc("2026-10-17")
            .unwrap();

        let mut subscription = store.listen_document(&note).unwrap();
        assert_eq!(subscription.try_next(), Some(DocumentSnapshot::Absent));

        store
            .set_document(&note, fields(json!({"content": "hi"})))
            .await
            .unwrap();
        assert!(matches!(
            subscription.try_next(),
            Some(DocumentSnapshot::Exists(_))
        ));

        store.delete_document(&note).await.unwrap();
        assert_eq!(subscription.try_next(), Some(DocumentSnapshot::Absent));
    }

    #[test]
    fn dropping_subscription_detaches_listener() {
        let store = MemoryStore::new();
        let subscription = store.listen_collection(&schedules()).unwrap();
        assert_eq!(store.listener_count(), 1);
        drop(subscription);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn listeners_ignore_other_collections() {
        let store = MemoryStore::new();
        let mut subscription = store.listen_collection(&schedules()).unwrap();
        subscription.try_next();

        let payments =
            CollectionPath::from_segments(["artifacts", "app", "users", "u1", "payments"]).unwrap();
        store.put(&payments.doc("p").unwrap(), Fields::new());
        assert!(subscription.try_next().is_none());
    }
}
