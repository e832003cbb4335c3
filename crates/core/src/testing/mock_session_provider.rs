//! Mock session provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::auth::{AuthError, Session, SessionProvider};

/// In-memory session that counts sign-outs.
#[derive(Debug, Clone, Default)]
pub struct MockSessionProvider {
    session: Arc<Mutex<Option<Session>>>,
    sign_outs: Arc<AtomicUsize>,
    fail_sign_out: Arc<AtomicBool>,
}

impl MockSessionProvider {
    /// A provider with no session.
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(access_token: &str) -> Self {
        let provider = Self::default();
        *provider.session() = Session::new(access_token);
        provider
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().is_some()
    }

    /// Make every sign-out fail with a storage error.
    pub fn fail_sign_out(&self) {
        self.fail_sign_out.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.session().clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Storage(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "session store is read-only",
            )));
        }
        *self.session() = None;
        Ok(())
    }

    fn method_name(&self) -> &'static str {
        "mock"
    }
}
