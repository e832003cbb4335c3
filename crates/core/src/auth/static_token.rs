//! Session backed by a token given in configuration or the environment.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{AuthError, Session, SessionProvider};

/// Provider holding a token in memory. Signing out forgets it for the rest
/// of the process.
pub struct StaticTokenProvider {
    session: Mutex<Option<Session>>,
}

impl StaticTokenProvider {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            session: Mutex::new(access_token.and_then(Session::new)),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticTokenProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self
            .session
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *session = None;
        Ok(())
    }

    fn method_name(&self) -> &'static str {
        "token"
    }
}
