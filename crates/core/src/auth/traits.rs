use async_trait::async_trait;
use thiserror::Error;

use super::types::Session;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read session: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Source of the identity session that every store call is made under.
///
/// Obtaining the token (the identity provider handshake) happens elsewhere;
/// a provider only hands out what it holds and forgets it on sign-out.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, or `None` when the user is signed out
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Drop the held credential
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Name of this session method
    fn method_name(&self) -> &'static str;
}
