//! One-shot writes against the signed-in identity's documents.
//!
//! A write never touches a mirror. Its effect shows up only when the store
//! delivers the next snapshot.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Collection, DailyNote, Entity, UserSettings};
use crate::store::{DocumentStore, Fields, UserPaths};
use crate::util::normalize_text_option;

/// A validated mutation, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    Create {
        collection: Collection,
        fields: Fields,
    },
    Replace {
        collection: Collection,
        id: String,
        fields: Fields,
    },
    Delete {
        collection: Collection,
        id: String,
    },
    SaveNote(DailyNote),
    SaveSettings(UserSettings),
}

impl WriteRequest {
    /// Add a new entry with a backend-assigned id.
    pub fn create<T: Entity>(entry: T) -> Result<Self> {
        Ok(Self::Create {
            collection: T::COLLECTION,
            fields: entry.normalized()?.to_fields()?,
        })
    }

    /// Overwrite an existing entry.
    pub fn replace<T: Entity>(id: impl Into<String>, entry: T) -> Result<Self> {
        Ok(Self::Replace {
            collection: T::COLLECTION,
            id: id.into(),
            fields: entry.normalized()?.to_fields()?,
        })
    }

    pub fn delete(collection: Collection, id: impl Into<String>) -> Self {
        Self::Delete {
            collection,
            id: id.into(),
        }
    }

    /// Save today's note.
    pub const fn save_note(note: DailyNote) -> Self {
        Self::SaveNote(note)
    }

    /// Save settings. A blank PIN clears the lock.
    pub fn save_settings(settings: UserSettings) -> Self {
        Self::SaveSettings(UserSettings {
            note_pin: normalize_text_option(settings.note_pin),
            ..settings
        })
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Replace { .. } => "replace",
            Self::Delete { .. } => "delete",
            Self::SaveNote(_) => "save note",
            Self::SaveSettings(_) => "save settings",
        }
    }
}

/// Sends [`WriteRequest`]s to the store under one identity's paths.
pub struct Writer<S> {
    store: Arc<S>,
    paths: UserPaths,
    today: NaiveDate,
}

impl<S> Clone for Writer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            paths: self.paths.clone(),
            today: self.today,
        }
    }
}

impl<S: DocumentStore> Writer<S> {
    pub(super) const fn new(store: Arc<S>, paths: UserPaths, today: NaiveDate) -> Self {
        Self {
            store,
            paths,
            today,
        }
    }

    /// Send one write and wait for the store to accept it.
    pub async fn execute(&self, request: WriteRequest) -> Result<()> {
        match request {
            WriteRequest::Create { collection, fields } => {
                let path = self.paths.collection(collection)?;
                let id = self.store.add_document(&path, fields).await?;
                tracing::debug!("Created {}/{}", collection.segment(), id);
            }
            WriteRequest::Replace {
                collection,
                id,
                fields,
            } => {
                let path = self.paths.collection(collection)?.doc(&id)?;
                self.store.set_document(&path, fields).await?;
            }
            WriteRequest::Delete { collection, id } => {
                let path = self.paths.collection(collection)?.doc(&id)?;
                self.store.delete_document(&path).await?;
            }
            WriteRequest::SaveNote(note) => {
                let path = self.paths.note(self.today)?;
                self.store.set_document(&path, note.to_fields()).await?;
            }
            WriteRequest::SaveSettings(settings) => {
                let path = self.paths.settings()?;
                self.store.set_document(&path, settings.to_fields()).await?;
            }
        }
        Ok(())
    }

    /// Send a write in the background. Failures are logged and dropped.
    pub fn spawn(&self, request: WriteRequest) {
        let writer = self.clone();
        tokio::spawn(async move {
            let label = request.label();
            if let Err(error) = writer.execute(request).await {
                tracing::warn!("Write ({}) failed: {}", label, error);
            }
        });
    }
}
