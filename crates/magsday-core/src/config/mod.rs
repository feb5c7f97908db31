//! Startup configuration.
//!
//! Read once from the environment (after `.env` has been loaded by the
//! binary) and passed explicitly to every component that needs it.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assist::DEFAULT_GEMINI_MODEL;
use crate::error::{Error, Result};
use crate::util::normalize_text_option;

pub const ENV_FIREBASE_CONFIG: &str = "MAGSDAY_FIREBASE_CONFIG";
pub const ENV_APP_ID: &str = "MAGSDAY_APP_ID";
pub const ENV_GEMINI_API_KEY: &str = "MAGSDAY_GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "MAGSDAY_GEMINI_MODEL";
pub const ENV_POLL_INTERVAL_MS: &str = "MAGSDAY_POLL_INTERVAL_MS";

pub const DEFAULT_APP_ID: &str = "default-mags-day-app";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Public backend project descriptor, as issued by the hosting console.
///
/// These values are safe to ship; they identify the project but grant no access
/// by themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendDescriptor {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub auth_domain: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

impl BackendDescriptor {
    /// Parse the JSON blob; an empty or blank blob is an empty descriptor.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let descriptor: Self = serde_json::from_str(raw)
            .map_err(|error| Error::Config(format!("{ENV_FIREBASE_CONFIG} is not valid JSON: {error}")))?;
        Ok(Self {
            api_key: normalize_text_option(descriptor.api_key),
            project_id: normalize_text_option(descriptor.project_id),
            auth_domain: normalize_text_option(descriptor.auth_domain),
            storage_bucket: normalize_text_option(descriptor.storage_bucket),
            messaging_sender_id: normalize_text_option(descriptor.messaging_sender_id),
            app_id: normalize_text_option(descriptor.app_id),
        })
    }
}

/// Backend settings that are actually required to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseSettings<'a> {
    pub api_key: &'a str,
    pub project_id: &'a str,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AssistConfig {
    pub api_key: Option<String>,
    pub model: String,
}

impl fmt::Debug for AssistConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AssistConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .finish()
    }
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

/// Process-wide configuration, immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendDescriptor,
    /// Namespace under `artifacts/` that isolates this deployment's data
    pub app_id: String,
    pub assist: AssistConfig,
    pub poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendDescriptor::default(),
            app_id: DEFAULT_APP_ID.to_string(),
            assist: AssistConfig::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Missing keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend = match lookup(ENV_FIREBASE_CONFIG) {
            Some(raw) => BackendDescriptor::parse(&raw)?,
            None => BackendDescriptor::default(),
        };

        let app_id = normalize_text_option(lookup(ENV_APP_ID))
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string());
        if app_id.contains('/') {
            return Err(Error::Config(format!(
                "{ENV_APP_ID} must not contain '/', got '{app_id}'"
            )));
        }

        let assist = AssistConfig {
            api_key: normalize_text_option(lookup(ENV_GEMINI_API_KEY)),
            model: normalize_text_option(lookup(ENV_GEMINI_MODEL))
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        };

        let poll_interval = match normalize_text_option(lookup(ENV_POLL_INTERVAL_MS)) {
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|_| {
                    Error::Config(format!(
                        "{ENV_POLL_INTERVAL_MS} must be a whole number of milliseconds, got '{raw}'"
                    ))
                })?;
                Duration::from_millis(millis.max(MIN_POLL_INTERVAL_MS))
            }
            None => Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        };

        Ok(Self {
            backend,
            app_id,
            assist,
            poll_interval,
        })
    }

    /// The API key and project id, or a configuration error naming what is missing.
    pub fn require_firebase(&self) -> Result<FirebaseSettings<'_>> {
        let api_key = self.backend.api_key.as_deref().ok_or_else(|| {
            Error::Config(format!("{ENV_FIREBASE_CONFIG} has no apiKey"))
        })?;
        let project_id = self.backend.project_id.as_deref().ok_or_else(|| {
            Error::Config(format!("{ENV_FIREBASE_CONFIG} has no projectId"))
        })?;
        Ok(FirebaseSettings {
            api_key,
            project_id,
        })
    }
}
