//! Owned dashboard state and the update functions that mutate it.

use chrono::NaiveDate;

use crate::assist::{celebrate_prompt, plan_day_prompt, AssistRequest, AssistState};
use crate::auth::{AuthError, AuthState};
use crate::gate::{LockGate, PinOutcome};
use crate::models::{Accomplishment, Currency, DailyNote, Payment, Record, Schedule, Theme, UserSettings};
use crate::session::auth_error_message;
use crate::sync::Change;
use crate::view::View;

/// Local copies of the signed-in identity's data, replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mirrors {
    pub schedules: Vec<Record<Schedule>>,
    pub payments: Vec<Record<Payment>>,
    pub accomplishments: Vec<Record<Accomplishment>>,
    pub note: DailyNote,
    pub settings: UserSettings,
}

/// Figures shown on the dashboard panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<'a> {
    /// Today's schedules, untimed entries first, then by time
    pub today_schedules: Vec<&'a Record<Schedule>>,
    pub outstanding: Vec<&'a Record<Payment>>,
    pub outstanding_total: f64,
    pub accomplishment_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub auth: AuthState,
    /// Message from the last failed sign-in or sign-up
    pub auth_error: Option<String>,
    pub mirrors: Mirrors,
    pub view: View,
    pub gate: LockGate,
    pub assist: AssistState,
    pub today: NaiveDate,
}

impl DashboardState {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            auth: AuthState::Pending,
            auth_error: None,
            mirrors: Mirrors::default(),
            view: View::default(),
            gate: LockGate::new(),
            assist: AssistState::default(),
            today,
        }
    }

    /// Replace one mirror with a fresh snapshot.
    pub fn apply(&mut self, change: Change) {
        match change {
            Change::Schedules(records) => self.mirrors.schedules = records,
            Change::Payments(records) => self.mirrors.payments = records,
            Change::Accomplishments(records) => self.mirrors.accomplishments = records,
            Change::Note(note) => {
                self.gate.observe_note(&note);
                self.mirrors.note = note;
            }
            Change::Settings(settings) => {
                if settings.note_pin != self.mirrors.settings.note_pin {
                    self.gate.pin_changed(&self.mirrors.note);
                }
                self.mirrors.settings = settings;
            }
        }
    }

    /// Record an identity transition. Data of a previous identity is dropped.
    pub fn on_auth_state(&mut self, auth: AuthState) {
        if auth.identity() != self.auth.identity() {
            self.mirrors = Mirrors::default();
            self.gate.reset();
            self.assist.reset();
            self.view = View::default();
        }
        if auth.identity().is_some() {
            self.auth_error = None;
        }
        self.auth = auth;
    }

    pub fn set_auth_error(&mut self, error: &AuthError) {
        self.auth_error = Some(auth_error_message(error));
    }

    /// Switch panels. Never touches mirrors or the backend.
    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.mirrors.settings.theme
    }

    #[must_use]
    pub fn currency(&self) -> Currency {
        self.mirrors.settings.currency
    }

    #[must_use]
    pub fn format_amount(&self, amount: f64) -> String {
        self.currency().format(amount)
    }

    #[must_use]
    pub fn note_pin(&self) -> Option<&str> {
        self.mirrors.settings.note_pin.as_deref()
    }

    #[must_use]
    pub fn note_visible(&self) -> bool {
        self.gate
            .is_content_visible(&self.mirrors.note, self.note_pin())
    }

    /// Note content, or `None` while the lock gate hides it.
    #[must_use]
    pub fn visible_note(&self) -> Option<&str> {
        self.note_visible()
            .then_some(self.mirrors.note.content.as_str())
    }

    pub fn submit_pin(&mut self) -> PinOutcome {
        let pin = self.mirrors.settings.note_pin.clone();
        self.gate.submit_pin(pin.as_deref())
    }

    #[must_use]
    pub fn summary(&self) -> Summary<'_> {
        let mut today_schedules: Vec<_> = self
            .mirrors
            .schedules
            .iter()
            .filter(|record| record.data.is_on(self.today))
            .collect();
        today_schedules.sort_by(|left, right| left.data.time.cmp(&right.data.time));

        let outstanding: Vec<_> = self
            .mirrors
            .payments
            .iter()
            .filter(|record| !record.data.paid)
            .collect();
        let outstanding_total = outstanding.iter().map(|record| record.data.amount).sum();

        Summary {
            today_schedules,
            outstanding,
            outstanding_total,
            accomplishment_count: self.mirrors.accomplishments.len(),
        }
    }

    /// Prompt text for an assist request, built from the current mirrors.
    #[must_use]
    pub fn assist_prompt(&self, request: AssistRequest) -> String {
        match request {
            AssistRequest::PlanDay => {
                let summary = self.summary();
                plan_day_prompt(
                    self.today,
                    &summary.today_schedules,
                    &summary.outstanding,
                    self.currency(),
                )
            }
            AssistRequest::CelebrateWins => celebrate_prompt(&self.mirrors.accomplishments),
        }
    }
}
