//! Application state management
//!
//! Global state accessible via Dioxus context providers.

use dioxus::prelude::*;

use magsday_core::assist::AssistRequest;
use magsday_core::models::{Currency, Theme, UserSettings};
use magsday_core::{DashboardState, WriteRequest};

use crate::theme::{palette, ColorPalette};

/// Work that has to go through the backend, handled by the app coroutine.
#[derive(Clone)]
pub enum Command {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
    /// A write issued while `uid` was signed in
    Write { uid: String, request: WriteRequest },
    Assist(AssistRequest),
}

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// Mirrors, session, view and lock state
    pub dashboard: Signal<DashboardState>,
    /// Channel into the coroutine that owns the backend
    pub commands: Coroutine<Command>,
}

impl AppState {
    pub fn send(&self, command: Command) {
        self.commands.send(command);
    }

    /// Queue a write on behalf of the identity signed in right now.
    pub fn submit(&self, request: WriteRequest) {
        let uid = self
            .dashboard
            .peek()
            .auth
            .identity()
            .map(|identity| identity.id.clone());
        match uid {
            Some(uid) => self.send(Command::Write { uid, request }),
            None => tracing::warn!("Dropping write issued while signed out"),
        }
    }

    /// Queue a validated write, or report why it was rejected.
    pub fn write(&self, request: magsday_core::Result<WriteRequest>) -> Option<String> {
        match request {
            Ok(request) => {
                self.submit(request);
                None
            }
            Err(error) => Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn palette(&self) -> &'static ColorPalette {
        palette(self.dashboard.read().theme())
    }

    #[must_use]
    pub fn settings(&self) -> UserSettings {
        self.dashboard.read().mirrors.settings.clone()
    }

    pub fn save_theme(&self, theme: Theme) {
        self.submit(WriteRequest::save_settings(UserSettings {
            theme,
            ..self.settings()
        }));
    }

    pub fn save_currency(&self, currency: Currency) {
        self.submit(WriteRequest::save_settings(UserSettings {
            currency,
            ..self.settings()
        }));
    }

    pub fn save_pin(&self, pin: Option<String>) {
        self.submit(WriteRequest::save_settings(UserSettings {
            note_pin: pin,
            ..self.settings()
        }));
    }
}
