//! Identity-scoped document paths.

use std::fmt;

use chrono::NaiveDate;

use super::{StoreError, StoreResult};
use crate::models::Collection;

const SETTINGS_COLLECTION: &str = "settings";
const SETTINGS_DOCUMENT: &str = "userSettings";
const NOTES_COLLECTION: &str = "notes";

/// Slash-separated path to a collection (odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> StoreResult<Self> {
        let segments: Vec<&str> = segments.into_iter().collect();
        for segment in &segments {
            validate_segment(segment)?;
        }
        if segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(format!(
                "collection path needs an odd number of segments: {}",
                segments.join("/")
            )));
        }
        Ok(Self(segments.join("/")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of a document inside this collection.
    pub fn doc(&self, id: &str) -> StoreResult<DocumentPath> {
        validate_segment(id)?;
        Ok(DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path to a single document: its collection plus document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    #[must_use]
    pub const fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// All paths owned by one identity under `artifacts/{app_id}/users/{uid}`.
///
/// Every path is built from the identity's id, so one identity's paths can
/// never address another identity's documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPaths {
    app_id: String,
    uid: String,
}

impl UserPaths {
    pub fn new(app_id: &str, uid: &str) -> StoreResult<Self> {
        validate_segment(app_id)?;
        validate_segment(uid)?;
        Ok(Self {
            app_id: app_id.to_string(),
            uid: uid.to_string(),
        })
    }

    pub fn collection(&self, collection: Collection) -> StoreResult<CollectionPath> {
        self.user_collection(collection.segment())
    }

    /// `notes/{YYYY-MM-DD}`
    pub fn note(&self, date: NaiveDate) -> StoreResult<DocumentPath> {
        self.user_collection(NOTES_COLLECTION)?
            .doc(&date.format("%Y-%m-%d").to_string())
    }

    /// `settings/userSettings`
    pub fn settings(&self) -> StoreResult<DocumentPath> {
        self.user_collection(SETTINGS_COLLECTION)?
            .doc(SETTINGS_DOCUMENT)
    }

    fn user_collection(&self, name: &str) -> StoreResult<CollectionPath> {
        CollectionPath::from_segments([
            "artifacts",
            self.app_id.as_str(),
            "users",
            self.uid.as_str(),
            name,
        ])
    }
}

fn validate_segment(segment: &str) -> StoreResult<()> {
    if segment.trim().is_empty() {
        return Err(StoreError::InvalidPath("path segment must not be empty".to_string()));
    }
    if segment.contains('/') {
        return Err(StoreError::InvalidPath(format!(
            "path segment must not contain '/': {segment}"
        )));
    }
    Ok(())
}
