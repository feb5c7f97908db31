//! In-process auth backend with email/password accounts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::{validate_credentials, AuthBackend, AuthError, AuthResult, AuthState};
use crate::models::Identity;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct MemoryAuth {
    inner: Arc<MemoryAuthInner>,
}

struct MemoryAuthInner {
    accounts: Mutex<HashMap<String, Account>>,
    remembered: Mutex<Option<Identity>>,
    state: watch::Sender<AuthState>,
}

struct Account {
    password: String,
    identity: Identity,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Pending);
        Self {
            inner: Arc::new(MemoryAuthInner {
                accounts: Mutex::new(HashMap::new()),
                remembered: Mutex::new(None),
                state,
            }),
        }
    }

    /// Register an account without signing in. Returns its identity.
    pub fn register(&self, email: &str, password: &str) -> AuthResult<Identity> {
        validate_credentials(email, password)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Api(
                "WEAK_PASSWORD : Password should be at least 6 characters".to_string(),
            ));
        }

        let email = normalize_email(email);
        let mut accounts = lock(&self.inner.accounts);
        if accounts.contains_key(&email) {
            return Err(AuthError::Api("EMAIL_EXISTS".to_string()));
        }

        let identity = Identity::new(uuid::Uuid::now_v7().simple().to_string(), Some(email.clone()));
        accounts.insert(
            email,
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        Ok(identity)
    }

    /// Make the next [`AuthBackend::restore`] report this identity as signed in.
    pub fn remember(&self, identity: Identity) {
        *lock(&self.inner.remembered) = Some(identity);
    }

    /// Current state as last published.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    fn publish(&self, state: AuthState) {
        tracing::debug!("Auth state changed: {:?}", state);
        self.inner.state.send_replace(state);
    }
}

impl AuthBackend for MemoryAuth {
    fn watch(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    async fn restore(&self) -> AuthResult<()> {
        let remembered = lock(&self.inner.remembered).take();
        self.publish(remembered.map_or(AuthState::SignedOut, AuthState::SignedIn));
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let identity = self.register(email, password)?;
        self.publish(AuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        validate_credentials(email, password)?;
        let identity = lock(&self.inner.accounts)
            .get(&normalize_email(email))
            .filter(|account| account.password == password)
            .map(|account| account.identity.clone())
            .ok_or_else(|| AuthError::Api("INVALID_LOGIN_CREDENTIALS".to_string()))?;
        self.publish(AuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.publish(AuthState::SignedOut);
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
