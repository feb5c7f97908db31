//! Error types for magsday-core

use thiserror::Error;

use crate::assist::AssistError;
use crate::auth::AuthError;
use crate::store::StoreError;

/// Result type alias using magsday-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in magsday-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Startup configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication backend error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Document store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generative text service error
    #[error(transparent)]
    Assist(#[from] AssistError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A data operation was attempted without a signed-in identity
    #[error("No user is signed in")]
    NotSignedIn,

    /// A write was issued by an identity that is no longer signed in
    #[error("Write issued by {0} dropped after the identity changed")]
    IdentityChanged(String),
}
