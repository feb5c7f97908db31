//! Daily note model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{DocumentSnapshot, Fields};

/// The single note for one identity and calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNote {
    pub content: String,
    pub is_locked: bool,
}

impl DailyNote {
    /// Decode a document snapshot; an absent document is an empty, unlocked note.
    #[must_use]
    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        match snapshot {
            DocumentSnapshot::Exists(fields) => Self::from_fields(fields),
            DocumentSnapshot::Absent => Self::default(),
        }
    }

    /// Lenient field decoding: wrong or missing types fall back to defaults.
    #[must_use]
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            content: fields
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_locked: fields
                .get("isLocked")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    #[must_use]
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("content".to_string(), Value::String(self.content.clone()));
        fields.insert("isLocked".to_string(), Value::Bool(self.is_locked));
        fields
    }
}
