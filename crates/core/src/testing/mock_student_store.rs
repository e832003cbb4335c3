//! Mock student store for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::auth::Session;
use crate::store::{RegistrationRequest, StoreError, StudentProfile, StudentStore, TicketPayload};

/// A recorded store call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedStoreCall {
    FetchProfile { access_token: String },
    SubmitRegistration {
        access_token: String,
        request: RegistrationRequest,
    },
    FetchTicket { access_token: String, pass_id: String },
}

impl RecordedStoreCall {
    /// Name of the trait method this call went through.
    pub fn method(&self) -> &'static str {
        match self {
            RecordedStoreCall::FetchProfile { .. } => "fetch_profile",
            RecordedStoreCall::SubmitRegistration { .. } => "submit_registration",
            RecordedStoreCall::FetchTicket { .. } => "fetch_ticket",
        }
    }
}

/// Mock implementation of the StudentStore trait.
///
/// Behaves like the real store:
/// - Answers profile lookups with the configured profile
/// - Re-validates registrations and rejects invalid ones with a 400
/// - Marks the profile registered and issues a pass on a successful submit
/// - Serves the configured ticket payload for the issued pass
///
/// Every call is recorded, including failed ones, so tests can assert that
/// nothing reached the network.
#[derive(Debug, Clone)]
pub struct MockStudentStore {
    profile: Arc<RwLock<Option<StudentProfile>>>,
    ticket: Arc<RwLock<Option<TicketPayload>>>,
    calls: Arc<RwLock<Vec<RecordedStoreCall>>>,
    /// If set, the next call of any kind fails with this error.
    next_error: Arc<RwLock<Option<StoreError>>>,
    /// If set, the next call to the named method fails with this error.
    method_error: Arc<RwLock<Option<(&'static str, StoreError)>>>,
    submit_delay: Arc<RwLock<Duration>>,
}

impl Default for MockStudentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStudentStore {
    pub fn new() -> Self {
        Self {
            profile: Arc::new(RwLock::new(None)),
            ticket: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            method_error: Arc::new(RwLock::new(None)),
            submit_delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub async fn set_profile(&self, profile: StudentProfile) {
        *self.profile.write().await = Some(profile);
    }

    pub async fn profile(&self) -> Option<StudentProfile> {
        self.profile.read().await.clone()
    }

    pub async fn set_ticket(&self, payload: TicketPayload) {
        *self.ticket.write().await = Some(payload);
    }

    /// Hold every registration submit for `delay` before answering.
    pub async fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.write().await = delay;
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: StoreError) {
        *self.next_error.write().await = Some(error);
    }

    /// Configure the next call to `method` to fail with the given error.
    pub async fn fail_call(&self, method: &'static str, error: StoreError) {
        *self.method_error.write().await = Some((method, error));
    }

    async fn take_error(&self, method: &'static str) -> Option<StoreError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }

        let mut pending = self.method_error.write().await;
        match pending.as_ref() {
            Some((target, _)) if *target == method => pending.take().map(|(_, err)| err),
            _ => None,
        }
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    pub async fn recorded_calls(&self) -> Vec<RecordedStoreCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Registration bodies received, in order.
    pub async fn submitted_requests(&self) -> Vec<RegistrationRequest> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedStoreCall::SubmitRegistration { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: RecordedStoreCall) {
        self.calls.write().await.push(call);
    }
}

fn not_found(message: &str) -> StoreError {
    StoreError::ApiError {
        status: 404,
        message: message.to_string(),
    }
}

#[async_trait]
impl StudentStore for MockStudentStore {
    async fn fetch_profile(&self, session: &Session) -> Result<StudentProfile, StoreError> {
        self.record(RecordedStoreCall::FetchProfile {
            access_token: session.access_token().to_string(),
        })
        .await;

        if let Some(err) = self.take_error("fetch_profile").await {
            return Err(err);
        }

        self.profile()
            .await
            .ok_or_else(|| not_found("Student not found"))
    }

    async fn submit_registration(
        &self,
        session: &Session,
        request: &RegistrationRequest,
    ) -> Result<(), StoreError> {
        self.record(RecordedStoreCall::SubmitRegistration {
            access_token: session.access_token().to_string(),
            request: request.clone(),
        })
        .await;

        let delay = *self.submit_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error("submit_registration").await {
            return Err(err);
        }

        if let Err(errors) = request.validate() {
            return Err(StoreError::ApiError {
                status: 400,
                message: errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            });
        }

        let mut profile = self.profile.write().await;
        let profile = profile
            .as_mut()
            .ok_or_else(|| not_found("Student not found"))?;
        if profile.is_registered {
            return Err(StoreError::ApiError {
                status: 409,
                message: "Student already registered".to_string(),
            });
        }

        profile.is_registered = true;
        profile.guest_count = Some(request.guest_count);
        profile.guardian1 = request.guest_1_name.clone();
        profile.guardian2 = request.guest_2_name.clone();
        profile.pass_id = Some(super::fixtures::PASS_ID.to_string());
        Ok(())
    }

    async fn fetch_ticket(
        &self,
        session: &Session,
        pass_id: &str,
    ) -> Result<TicketPayload, StoreError> {
        self.record(RecordedStoreCall::FetchTicket {
            access_token: session.access_token().to_string(),
            pass_id: pass_id.to_string(),
        })
        .await;

        if let Some(err) = self.take_error("fetch_ticket").await {
            return Err(err);
        }

        self.ticket
            .read()
            .await
            .clone()
            .ok_or_else(|| not_found("Pass not found"))
    }
}
