//! Identity-owned collection entries: schedules, payments and accomplishments

use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::store::{Document, Fields};
use crate::util::normalize_text_option;

/// The identity-scoped collections mirrored as lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Schedules,
    Payments,
    Accomplishments,
}

impl Collection {
    /// Path segment under `artifacts/{app}/users/{uid}/`.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Schedules => "schedules",
            Self::Payments => "payments",
            Self::Accomplishments => "accomplishments",
        }
    }
}

/// A mirrored document: backend id plus decoded fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: String,
    pub data: T,
}

impl<T: Entity> Record<T> {
    /// Decode a store document. Every field decodes leniently, so each
    /// document yields exactly one record.
    pub fn from_document(document: &Document) -> Self {
        let data = serde_json::from_value::<T>(Value::Object(document.fields.clone()))
            .unwrap_or_else(|error| {
                tracing::warn!(
                    "Falling back to defaults for {} document {}: {}",
                    T::COLLECTION.segment(),
                    document.id,
                    error
                );
                T::default()
            });
        Self {
            id: document.id.clone(),
            data,
        }
    }
}

/// A typed entry stored in one of the list collections.
pub trait Entity: Serialize + DeserializeOwned + Clone + Default + PartialEq {
    const COLLECTION: Collection;

    /// Trim and validate user input before it is written.
    fn normalized(self) -> Result<Self>;

    /// Encode as a schema-less field map.
    fn to_fields(&self) -> Result<Fields> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(Error::InvalidInput(format!(
                "{} entry encoded as {other}, expected an object",
                Self::COLLECTION.segment()
            ))),
        }
    }
}

/// A scheduled item for a given day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    /// Optional start time, `HH:MM`
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_text"
    )]
    pub time: Option<String>,
}

impl Schedule {
    /// Whether this entry falls on `day`.
    #[must_use]
    pub fn is_on(&self, day: NaiveDate) -> bool {
        parse_date(&self.date) == Some(day)
    }
}

impl Entity for Schedule {
    const COLLECTION: Collection = Collection::Schedules;

    fn normalized(self) -> Result<Self> {
        let description = required_text(self.description, "Schedule description")?;
        let date = self.date.trim().to_string();
        if parse_date(&date).is_none() {
            return Err(Error::InvalidInput(format!(
                "Schedule date must be YYYY-MM-DD, got '{date}'"
            )));
        }
        let time = normalize_text_option(self.time);
        if let Some(time) = &time {
            if NaiveTime::parse_from_str(time, "%H:%M").is_err() {
                return Err(Error::InvalidInput(format!(
                    "Schedule time must be HH:MM, got '{time}'"
                )));
            }
        }
        Ok(Self {
            description,
            date,
            time,
        })
    }
}

/// A payment to track. Amounts are stored currency-agnostic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_text"
    )]
    pub due_date: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub paid: bool,
}

impl Entity for Payment {
    const COLLECTION: Collection = Collection::Payments;

    fn normalized(self) -> Result<Self> {
        let description = required_text(self.description, "Payment description")?;
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Payment amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        let due_date = optional_date(self.due_date, "Payment due date")?;
        Ok(Self {
            description,
            amount: self.amount,
            due_date,
            paid: self.paid,
        })
    }
}

/// A completed task worth remembering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Accomplishment {
    #[serde(deserialize_with = "lenient_text")]
    pub text: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_text"
    )]
    pub date: Option<String>,
}

impl Entity for Accomplishment {
    const COLLECTION: Collection = Collection::Accomplishments;

    fn normalized(self) -> Result<Self> {
        Ok(Self {
            text: required_text(self.text, "Accomplishment")?,
            date: optional_date(self.date, "Accomplishment date")?,
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn required_text(value: String, label: &str) -> Result<String> {
    normalize_text_option(Some(value))
        .ok_or_else(|| Error::InvalidInput(format!("{label} cannot be empty")))
}

fn optional_date(value: Option<String>, label: &str) -> Result<Option<String>> {
    match normalize_text_option(value) {
        Some(date) if parse_date(&date).is_none() => Err(Error::InvalidInput(format!(
            "{label} must be YYYY-MM-DD, got '{date}'"
        ))),
        other => Ok(other),
    }
}

/// Strings pass through, other scalars and containers keep their JSON text.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Only strings are meaningful for optional dates and times.
fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let amount = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if amount.is_finite() { amount } else { 0.0 })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => matches!(text.trim(), "true" | "1" | "yes"),
        Value::Number(number) => number.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}
