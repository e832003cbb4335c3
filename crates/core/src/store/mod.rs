//! Remote student store.
//!
//! The store is a set of authenticated edge functions that own every piece of
//! durable state: the student profile, the registration record and the issued
//! pass. The client only ever holds transient copies.

mod http;
mod types;

pub use http::HttpStudentStore;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Session;

/// Errors that can occur when talking to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Store answered with a non-2xx status. `message` is the `error` field
    /// of the response body, empty when the body had none.
    #[error("Store error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured.
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl StoreError {
    /// Message to show the user: the store's own `error` text when it sent
    /// one, `fallback` for an empty rejection, the transport error otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            StoreError::ApiError { message, .. } if !message.trim().is_empty() => message.clone(),
            StoreError::ApiError { .. } => fallback.to_string(),
            StoreError::HttpError(e) => e.to_string(),
            StoreError::ParseError(_) | StoreError::NotConfigured(_) => fallback.to_string(),
        }
    }
}

/// The three store calls the client makes.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Fetch the authoritative profile of the signed-in student.
    async fn fetch_profile(&self, session: &Session) -> Result<StudentProfile, StoreError>;

    /// Persist a registration.
    async fn submit_registration(
        &self,
        session: &Session,
        request: &RegistrationRequest,
    ) -> Result<(), StoreError>;

    /// Fetch the QR payload and holder snapshot of an issued pass.
    async fn fetch_ticket(&self, session: &Session, pass_id: &str)
        -> Result<TicketPayload, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_store_text() {
        let err = StoreError::ApiError {
            status: 403,
            message: "Email not found in student records".to_string(),
        };
        assert_eq!(
            err.user_message("Failed to fetch profile"),
            "Email not found in student records"
        );
    }

    #[test]
    fn test_user_message_falls_back_on_empty_rejection() {
        let err = StoreError::ApiError {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message("Registration failed."), "Registration failed.");
    }

    #[test]
    fn test_user_message_parse_error_uses_fallback() {
        let err = StoreError::ParseError("expected value".to_string());
        assert_eq!(err.user_message("Failed to fetch profile"), "Failed to fetch profile");
    }
}
