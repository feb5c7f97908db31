//! Generative text assist: prompt construction, the Gemini client and modal state.

use std::fmt::Write as _;
use std::future::Future;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Accomplishment, Currency, Payment, Record, Schedule};
use crate::util::{compact_text, describe_api_error};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("AI assist is not configured. Set MAGSDAY_GEMINI_API_KEY to enable it.")]
    NotConfigured,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AI assist API error: {0}")]
    Api(String),
    #[error("AI assist returned no text")]
    EmptyResponse,
}

pub type AssistResult<T> = Result<T, AssistError>;

/// A single request/response text generation service.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate(&self, prompt: &str) -> impl Future<Output = AssistResult<String>> + Send;
}

#[derive(Clone, PartialEq, Eq)]
enum GeminiMode {
    Disabled,
    Enabled { api_key: String, model: String },
}

/// Gemini `generateContent` client. Without an API key every call fails with
/// [`AssistError::NotConfigured`].
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    mode: GeminiMode,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let model = match &self.mode {
            GeminiMode::Disabled => None,
            GeminiMode::Enabled { model, .. } => Some(model.as_str()),
        };
        formatter
            .debug_struct("GeminiClient")
            .field("enabled", &model.is_some())
            .field("model", &model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> AssistResult<Self> {
        let mode = match api_key {
            Some(api_key) if !api_key.trim().is_empty() => GeminiMode::Enabled {
                api_key: api_key.trim().to_string(),
                model: model.into(),
            },
            _ => GeminiMode::Disabled,
        };
        Ok(Self {
            client: Client::builder().build()?,
            mode,
        })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self.mode, GeminiMode::Enabled { .. })
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> AssistResult<String> {
        let GeminiMode::Enabled { api_key, model } = &self.mode else {
            return Err(AssistError::NotConfigured);
        };

        let payload = serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        });
        let response = self
            .client
            .post(format!("{GEMINI_API_URL}/models/{model}:generateContent"))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistError::Api(describe_api_error(status, &body)));
        }

        let body: GenerateContentResponse = response.json().await?;
        body.text().ok_or(AssistError::EmptyResponse)
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// The assist actions offered on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistRequest {
    PlanDay,
    CelebrateWins,
}

impl AssistRequest {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PlanDay => "Plan my day",
            Self::CelebrateWins => "Celebrate my wins",
        }
    }
}

/// Prompt asking for a plan around today's schedule and unpaid bills.
#[must_use]
pub fn plan_day_prompt(
    today: NaiveDate,
    schedules: &[&Record<Schedule>],
    outstanding: &[&Record<Payment>],
    currency: Currency,
) -> String {
    let mut prompt = format!(
        "You are a friendly personal assistant. Today is {}. \
         Suggest a short, encouraging plan for the day.\n",
        today.format("%A, %B %-d, %Y")
    );

    if schedules.is_empty() {
        prompt.push_str("\nNothing is scheduled today.\n");
    } else {
        prompt.push_str("\nToday's schedule:\n");
        for schedule in schedules {
            let time = schedule.data.time.as_deref().unwrap_or("any time");
            let _ = writeln!(prompt, "- {time}: {}", compact_text(&schedule.data.description));
        }
    }

    if !outstanding.is_empty() {
        prompt.push_str("\nPayments still due:\n");
        for payment in outstanding {
            let _ = write!(
                prompt,
                "- {} ({})",
                compact_text(&payment.data.description),
                currency.format(payment.data.amount)
            );
            if let Some(due) = &payment.data.due_date {
                let _ = write!(prompt, ", due {due}");
            }
            prompt.push('\n');
        }
    }

    prompt.push_str("\nKeep it under 150 words.");
    prompt
}

/// Prompt asking for a celebration of recorded accomplishments.
#[must_use]
pub fn celebrate_prompt(accomplishments: &[Record<Accomplishment>]) -> String {
    let mut prompt = String::from(
        "You are an upbeat cheerleader. Write a short, warm message celebrating \
         these accomplishments.\n",
    );
    if accomplishments.is_empty() {
        prompt.push_str("\nNo accomplishments are recorded yet; encourage a first small win.\n");
    } else {
        prompt.push('\n');
        for accomplishment in accomplishments {
            let _ = writeln!(prompt, "- {}", compact_text(&accomplishment.data.text));
        }
    }
    prompt.push_str("\nKeep it under 100 words.");
    prompt
}

/// What the assist modal shows once a request finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistOutput {
    Text(String),
    Error(String),
}

/// Identifies one assist request; results carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistTicket(u64);

/// Modal state for the assist feature. Requests cannot be cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistState {
    pub modal_open: bool,
    pub loading: bool,
    pub request: Option<AssistRequest>,
    pub output: Option<AssistOutput>,
    generation: u64,
}

impl AssistState {
    /// Open the modal in the loading state. Returns `None` if a request is
    /// already in flight.
    pub fn begin(&mut self, request: AssistRequest) -> Option<AssistTicket> {
        if self.loading {
            return None;
        }
        self.generation += 1;
        self.modal_open = true;
        self.loading = true;
        self.request = Some(request);
        self.output = None;
        Some(AssistTicket(self.generation))
    }

    /// Store the result of the request identified by `ticket`. Results of
    /// requests started before the last [`AssistState::reset`] are dropped.
    pub fn finish(&mut self, ticket: AssistTicket, result: AssistResult<String>) {
        if ticket != AssistTicket(self.generation) || !self.loading {
            tracing::debug!("Dropping stale AI assist result");
            return;
        }
        self.loading = false;
        self.output = Some(match result {
            Ok(text) => AssistOutput::Text(text),
            Err(error) => {
                tracing::warn!("AI assist failed: {}", error);
                AssistOutput::Error(error.to_string())
            }
        });
    }

    /// Hide the modal. An in-flight request still lands in `output`.
    pub fn close(&mut self) {
        self.modal_open = false;
    }

    /// Clear everything and invalidate requests still in flight.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn schedule(description: &str, time: Option<&str>) -> Record<Schedule> {
        Record {
            id: description.to_string(),
            data: Schedule {
                description: description.to_string(),
                date: "2026-10-17".to_string(),
                time: time.map(str::to_string),
            },
        }
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "Hello "}, {"text": "Mags"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("Hello Mags"));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[tokio::test]
    async fn missing_api_key_is_an_inline_error() {
        let client = GeminiClient::new(Some("  ".to_string()), DEFAULT_GEMINI_MODEL).unwrap();
        assert!(!client.is_enabled());
        assert!(matches!(
            client.generate("hi").await,
            Err(AssistError::NotConfigured)
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let client = GeminiClient::new(Some("secret-key".to_string()), "m").unwrap();
        assert!(!format!("{client:?}").contains("secret-key"));
    }

    #[test]
    fn plan_prompt_lists_schedule_and_payments() {
        let standup = schedule("Standup", Some("09:30"));
        let gym = schedule("Gym", None);
        let rent = Record {
            id: "p1".to_string(),
            data: Payment {
                description: "Rent".to_string(),
                amount: 1500.0,
                due_date: Some("2026-10-20".to_string()),
                paid: false,
            },
        };
        let prompt = plan_day_prompt(
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            &[&standup, &gym],
            &[&rent],
            Currency::Gbp,
        );
        assert!(prompt.contains("Saturday, October 17, 2026"));
        assert!(prompt.contains("- 09:30: Standup"));
        assert!(prompt.contains("- any time: Gym"));
        assert!(prompt.contains("- Rent (£1,500.00), due 2026-10-20"));
    }

    #[test]
    fn celebrate_prompt_handles_empty_list() {
        assert!(celebrate_prompt(&[]).contains("first small win"));
    }

    #[test]
    fn state_tracks_loading_and_output() {
        let mut state = AssistState::default();
        let ticket = state.begin(AssistRequest::PlanDay).unwrap();
        assert_eq!(state.begin(AssistRequest::CelebrateWins), None);
        assert!(state.loading && state.modal_open);

        state.finish(ticket, Err(AssistError::EmptyResponse));
        assert!(!state.loading);
        assert_eq!(
            state.output,
            Some(AssistOutput::Error("AI assist returned no text".to_string()))
        );

        state.close();
        assert!(!state.modal_open);
    }

    #[test]
    fn results_started_before_reset_are_dropped() {
        let mut state = AssistState::default();
        let stale = state.begin(AssistRequest::PlanDay).unwrap();
        state.reset();
        assert!(!state.loading && !state.modal_open);

        let current = state.begin(AssistRequest::CelebrateWins).unwrap();
        state.finish(stale, Ok("someone else's plan".to_string()));
        assert!(state.loading);
        assert_eq!(state.output, None);

        state.finish(current, Ok("Well done".to_string()));
        assert_eq!(state.output, Some(AssistOutput::Text("Well done".to_string())));
    }
}
