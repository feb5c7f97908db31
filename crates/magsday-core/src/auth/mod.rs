//! Authentication backends and identity lifecycle.

mod firebase;
mod memory;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::Identity;
use crate::util::unix_timestamp_now;

pub use firebase::FirebaseAuth;
pub use memory::MemoryAuth;

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Identity lifecycle as reported by the auth backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// The backend has not reported its initial state yet
    #[default]
    Pending,
    SignedOut,
    SignedIn(Identity),
}

impl AuthState {
    /// Whether the backend has reported its initial state.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::Pending | Self::SignedOut => None,
        }
    }
}

/// Tokens for an authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: Identity,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }

    /// Seconds until the token should be refreshed.
    #[must_use]
    pub fn refresh_in(&self) -> u64 {
        u64::try_from(self.expires_at - EXPIRY_SKEW_SECONDS - unix_timestamp_now()).unwrap_or(0)
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth backend is not configured: {0}")]
    NotConfigured(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a signed-in session is kept between launches.
pub trait SessionPersistence: Send + Sync + 'static {
    fn load(&self) -> AuthResult<Option<AuthSession>>;
    fn save(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear(&self) -> AuthResult<()>;
}

/// Persistence that forgets the session when the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralSessions;

impl SessionPersistence for EphemeralSessions {
    fn load(&self) -> AuthResult<Option<AuthSession>> {
        Ok(None)
    }

    fn save(&self, _session: &AuthSession) -> AuthResult<()> {
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        Ok(())
    }
}

/// Hosted authentication backend.
///
/// Identity transitions are pushed through [`AuthBackend::watch`]; the sign-in
/// calls only report whether the request was accepted.
pub trait AuthBackend: Send + Sync + 'static {
    fn watch(&self) -> watch::Receiver<AuthState>;

    /// Report the initial identity, restoring a persisted session if possible.
    fn restore(&self) -> impl Future<Output = AuthResult<()>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = AuthResult<Identity>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = AuthResult<Identity>> + Send;

    fn sign_out(&self) -> impl Future<Output = AuthResult<()>> + Send;
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: i64) -> AuthSession {
        AuthSession {
            id_token: "secret-id-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at,
            user: Identity::new("uid", None),
        }
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let rendered = format!("{:?}", session(1_700_000_000));
        assert!(!rendered.contains("secret-id-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn expiry_accounts_for_skew() {
        let now = unix_timestamp_now();
        assert!(session(now + 30).is_expired());
        assert!(!session(now + 3600).is_expired());
        assert_eq!(session(now - 10).refresh_in(), 0);
        assert!(session(now + 3600).refresh_in() > 3000);
    }

    #[test]
    fn readiness_and_identity() {
        assert!(!AuthState::Pending.is_ready());
        assert!(AuthState::SignedOut.is_ready());
        let identity = Identity::new("uid", None);
        let state = AuthState::SignedIn(identity.clone());
        assert_eq!(state.identity(), Some(&identity));
        assert_eq!(AuthState::SignedOut.identity(), None);
    }

    #[test]
    fn credentials_must_be_present() {
        assert!(validate_credentials(" ", "pw").is_err());
        assert!(validate_credentials("a@b.c", "").is_err());
        assert!(validate_credentials("a@b.c", "pw").is_ok());
    }
}
