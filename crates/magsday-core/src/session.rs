//! Session manager: the single source of truth for "who is signed in".

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::{AuthBackend, AuthError, AuthResult, AuthState};
use crate::models::Identity;

/// User-facing text for a failed sign-in or sign-up.
#[must_use]
pub fn auth_error_message(error: &AuthError) -> String {
    format!("Authentication Error: {error}")
}

/// Tracks the identity reported by an [`AuthBackend`].
///
/// Credential calls never change the identity directly. The new identity is
/// observed through [`SessionManager::changed`] once the backend confirms it.
pub struct SessionManager<A> {
    backend: Arc<A>,
    state: watch::Receiver<AuthState>,
}

impl<A> Clone for SessionManager<A> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: self.state.clone(),
        }
    }
}

impl<A: AuthBackend> SessionManager<A> {
    pub fn new(backend: A) -> Self {
        let state = backend.watch();
        Self {
            backend: Arc::new(backend),
            state,
        }
    }

    /// Latest identity state reported by the backend.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Ask the backend for its initial state, restoring a persisted session.
    pub async fn restore(&self) -> AuthResult<()> {
        self.backend.restore().await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<()> {
        match self.backend.sign_up(email, password).await {
            Ok(identity) => {
                tracing::info!("Sign-up accepted for {}", identity.id);
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Sign-up failed: {}", error);
                Err(error)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<()> {
        match self.backend.sign_in(email, password).await {
            Ok(identity) => {
                tracing::info!("Sign-in accepted for {}", identity.id);
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Sign-in failed: {}", error);
                Err(error)
            }
        }
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.backend.sign_out().await
    }

    /// Wait for the next identity transition and return the new state.
    ///
    /// Returns `None` once the backend has shut down.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Take a transition that has already been published, without waiting.
    pub fn try_changed(&mut self) -> Option<AuthState> {
        if self.state.has_changed().unwrap_or(false) {
            Some(self.state.borrow_and_update().clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::MemoryAuth;

    #[tokio::test]
    async fn identity_changes_only_after_backend_confirms() {
        let auth = MemoryAuth::new();
        auth.register("mags@example.com", "secret1").unwrap();
        let mut session = SessionManager::new(auth);
        assert!(!session.is_ready());

        session.restore().await.unwrap();
        assert_eq!(session.changed().await, Some(AuthState::SignedOut));
        assert!(session.is_ready());

        session.sign_in("mags@example.com", "secret1").await.unwrap();
        let state = session.try_changed().unwrap();
        assert_eq!(
            state.identity().and_then(|identity| identity.email.as_deref()),
            Some("mags@example.com")
        );
        assert!(session.try_changed().is_none());
    }

    #[tokio::test]
    async fn failed_sign_in_keeps_state_and_formats_message() {
        let mut session = SessionManager::new(MemoryAuth::new());
        session.restore().await.unwrap();
        session.try_changed();

        let error = session.sign_in("nobody@example.com", "secret1").await.unwrap_err();
        assert_eq!(
            auth_error_message(&error),
            "Authentication Error: INVALID_LOGIN_CREDENTIALS"
        );
        assert_eq!(session.state(), AuthState::SignedOut);
        assert!(session.try_changed().is_none());
    }

    #[tokio::test]
    async fn sign_out_reports_signed_out() {
        let auth = MemoryAuth::new();
        auth.register("mags@example.com", "secret1").unwrap();
        let mut session = SessionManager::new(auth);
        session.restore().await.unwrap();
        session.sign_in("mags@example.com", "secret1").await.unwrap();
        assert!(session.identity().is_some());

        session.sign_out().await.unwrap();
        assert_eq!(session.try_changed(), Some(AuthState::SignedOut));
        assert_eq!(session.identity(), None);
    }
}
