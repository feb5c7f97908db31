//! Keyring-backed session persistence.

use keyring::Entry;

use magsday_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence};

const KEYRING_SERVICE_NAME: &str = "mags-day";
const KEYRING_SESSION_USERNAME: &str = "firebase_session";

/// Keeps the signed-in session in the OS credential store between launches.
#[derive(Debug, Clone)]
pub struct KeyringSessions {
    service_name: String,
    username: String,
}

impl Default for KeyringSessions {
    fn default() -> Self {
        Self {
            service_name: KEYRING_SERVICE_NAME.to_string(),
            username: KEYRING_SESSION_USERNAME.to_string(),
        }
    }
}

impl KeyringSessions {
    fn entry(&self) -> AuthResult<Entry> {
        Entry::new(&self.service_name, &self.username)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for KeyringSessions {
    fn load(&self) -> AuthResult<Option<AuthSession>> {
        match self.entry()?.get_password() {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => Ok(Some(session)),
                Err(error) => {
                    tracing::warn!("Discarding unreadable stored session: {}", error);
                    self.clear()?;
                    Ok(None)
                }
            },
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }

    fn save(&self, session: &AuthSession) -> AuthResult<()> {
        let serialized = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&serialized)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }

    fn clear(&self) -> AuthResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }
}
