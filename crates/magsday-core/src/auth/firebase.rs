//! Firebase Authentication over the Identity Toolkit REST API.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{
    validate_credentials, AuthBackend, AuthError, AuthResult, AuthSession, AuthState,
    SessionPersistence,
};
use crate::models::Identity;
use crate::store::TokenSource;
use crate::util::{describe_api_error, unix_timestamp_now};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;

pub struct FirebaseAuth<P: SessionPersistence> {
    inner: Arc<FirebaseInner<P>>,
}

impl<P: SessionPersistence> Clone for FirebaseAuth<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct FirebaseInner<P> {
    api_key: String,
    client: Client,
    persistence: P,
    state: watch::Sender<AuthState>,
    tokens: watch::Sender<Option<String>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl<P: SessionPersistence> FirebaseAuth<P> {
    pub fn new(api_key: impl Into<String>, persistence: P) -> AuthResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AuthError::NotConfigured(
                "backend descriptor has no apiKey".to_string(),
            ));
        }

        let (state, _) = watch::channel(AuthState::Pending);
        let (tokens, _) = watch::channel(None);
        Ok(Self {
            inner: Arc::new(FirebaseInner {
                api_key,
                client: Client::builder().build()?,
                persistence,
                state,
                tokens,
                refresh_task: Mutex::new(None),
            }),
        })
    }

    /// ID token of the signed-in user, for authorizing document store requests.
    #[must_use]
    pub fn token_source(&self) -> TokenSource {
        self.inner.tokens.subscribe()
    }

    async fn password_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;
        let payload = serde_json::json!({
            "email": email.trim(),
            "password": password,
            "returnSecureToken": true,
        });
        let request = self
            .inner
            .client
            .post(format!("{IDENTITY_TOOLKIT_URL}/accounts:{endpoint}"))
            .query(&[("key", self.inner.api_key.as_str())])
            .json(&payload);

        let response: PasswordAuthResponse = send_json(request).await?;
        Ok(response.into_session())
    }

    async fn refresh(&self, current: &AuthSession) -> AuthResult<AuthSession> {
        let payload = serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": current.refresh_token,
        });
        let request = self
            .inner
            .client
            .post(SECURE_TOKEN_URL)
            .query(&[("key", self.inner.api_key.as_str())])
            .json(&payload);

        let response: RefreshResponse = send_json(request).await?;
        Ok(response.into_session(&current.user))
    }

    /// Publish a session as the current identity and keep its token fresh.
    fn install(&self, session: AuthSession) {
        if let Err(error) = self.inner.persistence.save(&session) {
            tracing::warn!("Failed to persist auth session: {}", error);
        }
        self.publish_session(&session);
        self.spawn_refresh_loop(session);
    }

    fn publish_session(&self, session: &AuthSession) {
        self.inner
            .tokens
            .send_replace(Some(session.id_token.clone()));
        let signed_in = AuthState::SignedIn(session.user.clone());
        self.inner.state.send_if_modified(|state| {
            if *state == signed_in {
                false
            } else {
                *state = signed_in;
                true
            }
        });
    }

    fn clear(&self) {
        if let Some(task) = lock(&self.inner.refresh_task).take() {
            task.abort();
        }
        if let Err(error) = self.inner.persistence.clear() {
            tracing::warn!("Failed to clear persisted auth session: {}", error);
        }
        self.inner.tokens.send_replace(None);
        self.inner.state.send_replace(AuthState::SignedOut);
    }

    fn spawn_refresh_loop(&self, session: AuthSession) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No tokio runtime; token refresh disabled");
            return;
        };

        let auth = self.clone();
        let task = runtime.spawn(async move {
            let mut session = session;
            loop {
                tokio::time::sleep(Duration::from_secs(session.refresh_in())).await;
                match auth.refresh(&session).await {
                    Ok(refreshed) => {
                        tracing::debug!("Refreshed ID token for {}", refreshed.user.id);
                        if let Err(error) = auth.inner.persistence.save(&refreshed) {
                            tracing::warn!("Failed to persist refreshed session: {}", error);
                        }
                        auth.publish_session(&refreshed);
                        session = refreshed;
                    }
                    Err(error) => {
                        tracing::warn!("Token refresh failed, signing out: {}", error);
                        auth.inner.tokens.send_replace(None);
                        auth.inner.state.send_replace(AuthState::SignedOut);
                        if let Err(error) = auth.inner.persistence.clear() {
                            tracing::warn!("Failed to clear persisted auth session: {}", error);
                        }
                        break;
                    }
                }
            }
        });

        if let Some(previous) = lock(&self.inner.refresh_task).replace(task) {
            previous.abort();
        }
    }
}

impl<P: SessionPersistence> AuthBackend for FirebaseAuth<P> {
    fn watch(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    async fn restore(&self) -> AuthResult<()> {
        let stored = match self.inner.persistence.load() {
            Ok(stored) => stored,
            Err(error) => {
                self.inner.state.send_replace(AuthState::SignedOut);
                return Err(error);
            }
        };

        let Some(stored) = stored else {
            tracing::info!("No persisted session; starting signed out");
            self.inner.state.send_replace(AuthState::SignedOut);
            return Ok(());
        };

        if !stored.is_expired() {
            tracing::info!("Restored session for {}", stored.user.id);
            self.install(stored);
            return Ok(());
        }

        match self.refresh(&stored).await {
            Ok(refreshed) => {
                tracing::info!("Refreshed persisted session for {}", refreshed.user.id);
                self.install(refreshed);
            }
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.clear();
            }
        }
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let session = self.password_request("signUp", email, password).await?;
        let identity = session.user.clone();
        tracing::info!("Created account {}", identity.id);
        self.install(session);
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let session = self
            .password_request("signInWithPassword", email, password)
            .await?;
        let identity = session.user.clone();
        tracing::info!("Signed in {}", identity.id);
        self.install(session);
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        tracing::info!("Signing out");
        self.clear();
        Ok(())
    }
}

async fn send_json<T: serde::de::DeserializeOwned>(request: RequestBuilder) -> AuthResult<T> {
    let response = request.send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Api(describe_api_error(status, &body)));
    }
    Ok(response.json::<T>().await?)
}

fn expires_at(expires_in: Option<&str>) -> i64 {
    let seconds = expires_in
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECONDS);
    unix_timestamp_now().saturating_add(seconds)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    local_id: String,
    email: Option<String>,
}

impl PasswordAuthResponse {
    fn into_session(self) -> AuthSession {
        AuthSession {
            expires_at: expires_at(self.expires_in.as_deref()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            user: Identity::new(self.local_id, self.email),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    user_id: Option<String>,
}

impl RefreshResponse {
    fn into_session(self, previous: &Identity) -> AuthSession {
        let user = match self.user_id {
            Some(id) if id != previous.id => Identity::new(id, None),
            _ => previous.clone(),
        };
        AuthSession {
            expires_at: expires_at(self.expires_in.as_deref()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::EphemeralSessions;

    #[test]
    fn new_requires_api_key() {
        assert!(matches!(
            FirebaseAuth::new("  ", EphemeralSessions),
            Err(AuthError::NotConfigured(_))
        ));
    }

    #[test]
    fn password_response_maps_to_session() {
        let response: PasswordAuthResponse = serde_json::from_str(
            r#"{
                "kind": "identitytoolkit#VerifyPasswordResponse",
                "localId": "uid-1",
                "email": "mags@example.com",
                "idToken": "id",
                "refreshToken": "refresh",
                "expiresIn": "3600"
            }"#,
        )
        .unwrap();
        let session = response.into_session();
        assert_eq!(session.user, Identity::new("uid-1", Some("mags@example.com".to_string())));
        assert!(!session.is_expired());
    }

    #[test]
    fn refresh_response_keeps_identity_email() {
        let response: RefreshResponse = serde_json::from_str(
            r#"{"id_token": "new-id", "refresh_token": "new-refresh", "expires_in": "3600", "user_id": "uid-1"}"#,
        )
        .unwrap();
        let previous = Identity::new("uid-1", Some("mags@example.com".to_string()));
        let session = response.into_session(&previous);
        assert_eq!(session.user, previous);
        assert_eq!(session.id_token, "new-id");
    }

    #[test]
    fn malformed_expiry_uses_default_lifetime() {
        let now = unix_timestamp_now();
        let at = expires_at(Some("soon"));
        assert!(at >= now + DEFAULT_EXPIRES_IN_SECONDS);
    }

    #[tokio::test]
    async fn restore_without_persisted_session_reports_signed_out() {
        let auth = FirebaseAuth::new("key", EphemeralSessions).unwrap();
        let watch = auth.watch();
        assert_eq!(*watch.borrow(), AuthState::Pending);
        auth.restore().await.unwrap();
        assert_eq!(*watch.borrow(), AuthState::SignedOut);
        assert_eq!(*auth.token_source().borrow(), None);
    }

    #[tokio::test]
    async fn sign_out_clears_token() {
        let auth = FirebaseAuth::new("key", EphemeralSessions).unwrap();
        auth.install(AuthSession {
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: unix_timestamp_now() + 3600,
            user: Identity::new("uid-1", None),
        });
        let tokens = auth.token_source();
        assert_eq!(tokens.borrow().as_deref(), Some("id"));
        assert!(auth.watch().borrow().identity().is_some());

        auth.sign_out().await.unwrap();
        assert_eq!(*tokens.borrow(), None);
        assert_eq!(*auth.watch().borrow(), AuthState::SignedOut);
    }
}
