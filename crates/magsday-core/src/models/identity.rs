//! Authenticated user identity

use serde::{Deserialize, Serialize};

/// The authenticated principal of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Backend-assigned unique id; scopes every document path
    pub id: String,
    /// Email used to sign in, when the backend reports one
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }

    /// Short label for greetings: the part of the email before `@`, or the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }
}
