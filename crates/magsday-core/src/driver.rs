//! Event loop glue between the session manager, the synchronizer and the
//! dashboard state.

use crate::auth::{AuthBackend, AuthState};
use crate::error::Result;
use crate::session::SessionManager;
use crate::state::DashboardState;
use crate::store::DocumentStore;
use crate::sync::{Change, Synchronizer, Writer};

/// Something the UI loop has to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Auth(AuthState),
    Data(Change),
    /// The auth backend stopped publishing identity changes
    AuthClosed,
}

pub struct Driver<A, S> {
    session: SessionManager<A>,
    sync: Synchronizer<S>,
    auth_open: bool,
}

impl<A: AuthBackend, S: DocumentStore> Driver<A, S> {
    pub const fn new(session: SessionManager<A>, sync: Synchronizer<S>) -> Self {
        Self {
            session,
            sync,
            auth_open: true,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &SessionManager<A> {
        &self.session
    }

    #[must_use]
    pub const fn synchronizer(&self) -> &Synchronizer<S> {
        &self.sync
    }

    pub fn writer(&self) -> Result<Writer<S>> {
        self.sync.writer()
    }

    /// Writer for a request issued while `uid` was signed in.
    pub fn writer_for(&self, uid: &str) -> Result<Writer<S>> {
        self.sync.writer_for(uid)
    }

    /// Restore the persisted session and apply whatever state results.
    pub async fn prime(&mut self, state: &mut DashboardState) {
        if let Err(error) = self.session.restore().await {
            tracing::warn!("Failed to restore session: {}", error);
        }
        let current = self.session.try_changed().unwrap_or_else(|| self.session.state());
        self.apply(Event::Auth(current), state);
    }

    /// Wait for the next identity transition or data snapshot.
    ///
    /// Identity transitions win ties so that no snapshot of a departing
    /// identity is applied after it signed out.
    pub async fn next_event(&mut self) -> Event {
        tokio::select! {
            biased;
            auth = self.session.changed(), if self.auth_open => {
                auth.map_or(Event::AuthClosed, Event::Auth)
            }
            change = self.sync.next_change() => Event::Data(change),
        }
    }

    pub fn apply(&mut self, event: Event, state: &mut DashboardState) {
        match event {
            Event::Auth(auth) => {
                if let Err(error) = self.sync.follow(&auth) {
                    tracing::warn!("Failed to open subscriptions: {}", error);
                }
                state.on_auth_state(auth);
                for change in self.sync.drain() {
                    state.apply(change);
                }
            }
            Event::Data(change) => state.apply(change),
            Event::AuthClosed => {
                tracing::warn!("Auth backend closed its identity channel");
                self.auth_open = false;
            }
        }
    }

    /// Apply everything that is ready without waiting.
    pub fn pump(&mut self, state: &mut DashboardState) {
        if let Some(auth) = self.session.try_changed() {
            self.apply(Event::Auth(auth), state);
        }
        for change in self.sync.drain() {
            state.apply(change);
        }
    }
}
