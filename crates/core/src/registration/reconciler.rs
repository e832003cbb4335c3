//! Registration reconciler.
//!
//! Aligns the local draft with the authoritative profile and submits it.
//!
//! ```text
//! Loading ──► Editing ──► Submitting ──► RedirectedToTicket
//!    │           ▲            │
//!    │           └────────────┘ (rejected)
//!    └──► Registered (terminal, read-only)
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::draft::{DraftError, DraftField, FieldError, GuardianSlot, RegistrationDraft};
use crate::auth::Session;
use crate::flow::{FailureKind, FlowError, FlowResult};
use crate::store::{StudentProfile, StudentStore};

const PROFILE_FETCH_FALLBACK: &str = "Failed to fetch profile";
const SUBMIT_FALLBACK: &str = "Registration failed.";

/// Reconciler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Editing,
    Submitting,
    Registered,
    RedirectedToTicket,
}

/// Identity fields shown read-only on the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentIdentity {
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub programme: String,
    pub year_of_passing: String,
}

impl From<&StudentProfile> for StudentIdentity {
    fn from(profile: &StudentProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            roll_no: profile.roll_no.clone(),
            programme: profile.programme.clone(),
            year_of_passing: profile.year_of_passing.clone(),
        }
    }
}

/// Why a submit call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Another submit is outstanding.
    InFlight,
    /// The form is not editable in this phase.
    NotEditable(Phase),
}

/// Result of a submit call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Stored. The caller moves on to the ticket screen.
    Submitted,
    /// No-op, no network call was made.
    Ignored(IgnoreReason),
}

/// Point-in-time copy of the form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcilerView {
    pub phase: Phase,
    pub identity: Option<StudentIdentity>,
    pub draft: RegistrationDraft,
    pub field_errors: Vec<FieldError>,
    pub message: Option<String>,
}

struct Inner {
    phase: Phase,
    identity: Option<StudentIdentity>,
    draft: RegistrationDraft,
    field_errors: Vec<FieldError>,
    message: Option<String>,
}

/// State and operations of the registration screen.
pub struct Reconciler {
    store: Arc<dyn StudentStore>,
    inner: Mutex<Inner>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self {
            store,
            inner: Mutex::new(Inner {
                phase: Phase::Loading,
                identity: None,
                draft: RegistrationDraft::new(),
                field_errors: Vec::new(),
                message: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn is_registered(&self) -> bool {
        self.phase() == Phase::Registered
    }

    pub fn view(&self) -> ReconcilerView {
        let inner = self.lock();
        ReconcilerView {
            phase: inner.phase,
            identity: inner.identity.clone(),
            draft: inner.draft.clone(),
            field_errors: inner.field_errors.clone(),
            message: inner.message.clone(),
        }
    }

    /// Fetch the profile and set the form up from it.
    ///
    /// A registered profile locks the form for good: its guest values are
    /// shown as stored and no edit or submit is accepted afterwards. Once the
    /// form is locked, handed off, or has a submit outstanding, loading again
    /// leaves the state alone and returns the identity already held.
    pub async fn load(&self, session: Option<&Session>) -> FlowResult<StudentIdentity> {
        {
            let mut inner = self.lock();
            if let (Phase::Submitting | Phase::Registered | Phase::RedirectedToTicket, Some(held)) =
                (inner.phase, &inner.identity)
            {
                debug!("Load ignored in phase {:?}", inner.phase);
                return Ok(held.clone());
            }

            inner.phase = Phase::Loading;
            inner.identity = None;
            inner.draft = RegistrationDraft::new();
            inner.field_errors.clear();
            inner.message = None;
        }

        let session = session.ok_or_else(FlowError::session_absent)?;

        let profile = self.store.fetch_profile(session).await.map_err(|e| {
            warn!("Profile fetch failed: {}", e);
            FlowError::new(
                FailureKind::ProfileFetchFailed,
                e.user_message(PROFILE_FETCH_FALLBACK),
            )
        })?;

        let identity = StudentIdentity::from(&profile);
        let mut inner = self.lock();
        inner.identity = Some(identity.clone());

        if profile.is_registered {
            inner.draft = RegistrationDraft::from_profile(&profile);
            inner.phase = Phase::Registered;
            info!("Profile {} already registered, form locked", identity.roll_no);
        } else {
            inner.phase = Phase::Editing;
            info!("Profile {} loaded, awaiting registration", identity.roll_no);
        }

        Ok(identity)
    }

    /// Set or unset the guest count.
    pub fn set_guest_count(&self, count: Option<i64>) -> Result<(), DraftError> {
        let mut inner = self.lock();
        if inner.phase != Phase::Editing {
            return Err(DraftError::Immutable);
        }

        let cleared = inner.draft.set_guest_count(count);
        inner.field_errors.retain(|e| {
            e.field != DraftField::GuestCount && !cleared.iter().any(|slot| slot.field() == e.field)
        });
        debug!("Guest count set to {:?}, cleared slots {:?}", count, cleared);
        Ok(())
    }

    /// Edit a guardian name. The slot must be open for the current guest count.
    pub fn set_guardian(
        &self,
        slot: GuardianSlot,
        value: impl Into<String>,
    ) -> Result<(), DraftError> {
        let mut inner = self.lock();
        if inner.phase != Phase::Editing {
            return Err(DraftError::Immutable);
        }

        inner.draft.set_guardian(slot, value)?;
        inner.field_errors.retain(|e| e.field != slot.field());
        Ok(())
    }

    /// Validate the draft and send it to the store.
    ///
    /// Validation and the session check happen before any network call. The
    /// phase moves to `Submitting` under the same lock as the editable check,
    /// so a second call while one is outstanding is a no-op.
    pub async fn submit(&self, session: Option<&Session>) -> FlowResult<SubmitOutcome> {
        let (session, request) = {
            let mut inner = self.lock();
            match inner.phase {
                Phase::Editing => {}
                Phase::Submitting => {
                    debug!("Submit ignored, another submit is in flight");
                    return Ok(SubmitOutcome::Ignored(IgnoreReason::InFlight));
                }
                other => {
                    debug!("Submit ignored in phase {:?}", other);
                    return Ok(SubmitOutcome::Ignored(IgnoreReason::NotEditable(other)));
                }
            }

            inner.message = None;
            let request = match inner.draft.validate() {
                Ok(request) => request,
                Err(errors) => {
                    inner.field_errors = errors.clone();
                    return Err(FlowError::validation(errors));
                }
            };
            inner.field_errors.clear();

            let session = session.ok_or_else(FlowError::session_absent)?;
            inner.phase = Phase::Submitting;
            (session, request)
        };

        let result = self.store.submit_registration(session, &request).await;

        let mut inner = self.lock();
        match result {
            Ok(()) => {
                inner.phase = Phase::RedirectedToTicket;
                info!("Registration stored with {} guest(s)", request.guest_count);
                Ok(SubmitOutcome::Submitted)
            }
            Err(e) => {
                warn!("Registration rejected: {}", e);
                let message = e.user_message(SUBMIT_FALLBACK);
                inner.phase = Phase::Editing;
                inner.message = Some(message.clone());
                Err(FlowError::new(FailureKind::SubmitFailed, message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::testing::{fixtures, MockStudentStore};

    fn session() -> Session {
        Session::new("test-token").unwrap()
    }

    async fn editing(store: &Arc<MockStudentStore>) -> Reconciler {
        store.set_profile(fixtures::unregistered_profile()).await;
        let reconciler = Reconciler::new(store.clone());
        reconciler.load(Some(&session())).await.unwrap();
        reconciler
    }

    #[tokio::test]
    async fn test_load_without_session() {
        let store = Arc::new(MockStudentStore::new());
        let reconciler = Reconciler::new(store.clone());

        let err = reconciler.load(None).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::SessionAbsent);
        assert_eq!(store.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_load_failure_is_profile_fetch_failed() {
        let store = Arc::new(MockStudentStore::new());
        store
            .set_next_error(StoreError::ApiError {
                status: 404,
                message: "Student not found".to_string(),
            })
            .await;
        let reconciler = Reconciler::new(store.clone());

        let err = reconciler.load(Some(&session())).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::ProfileFetchFailed);
        assert_eq!(err.message, "Student not found");
        assert!(err.kind.invalidates_session());
    }

    #[tokio::test]
    async fn test_load_unregistered_enters_editing() {
        let store = Arc::new(MockStudentStore::new());
        let reconciler = editing(&store).await;

        let view = reconciler.view();
        assert_eq!(view.phase, Phase::Editing);
        assert_eq!(view.draft.guest_count(), None);
        assert_eq!(view.identity.unwrap().name, "Asha Menon");
    }

    #[tokio::test]
    async fn test_guest_count_change_drops_stale_errors() {
        let store = Arc::new(MockStudentStore::new());
        let reconciler = editing(&store).await;

        reconciler.set_guest_count(Some(2)).unwrap();
        let err = reconciler.submit(Some(&session())).await.unwrap_err();
        assert_eq!(err.field_errors.len(), 2);

        reconciler.set_guest_count(Some(1)).unwrap();
        let view = reconciler.view();
        assert_eq!(view.field_errors, vec![FieldError::required(DraftField::Guardian1)]);

        reconciler.set_guardian(GuardianSlot::First, "Ravi").unwrap();
        assert!(reconciler.view().field_errors.is_empty());
    }

    #[tokio::test]
    async fn test_submit_failure_preserves_draft() {
        let store = Arc::new(MockStudentStore::new());
        let reconciler = editing(&store).await;
        reconciler.set_guest_count(Some(1)).unwrap();
        reconciler.set_guardian(GuardianSlot::First, "Ravi").unwrap();

        store
            .set_next_error(StoreError::ApiError {
                status: 500,
                message: String::new(),
            })
            .await;

        let err = reconciler.submit(Some(&session())).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::SubmitFailed);
        assert_eq!(err.message, "Registration failed.");

        let view = reconciler.view();
        assert_eq!(view.phase, Phase::Editing);
        assert_eq!(view.draft.guardian(GuardianSlot::First), "Ravi");
        assert_eq!(view.message.as_deref(), Some("Registration failed."));

        // Re-enterable
        let outcome = reconciler.submit(Some(&session())).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Submitted);
    }

    #[tokio::test]
    async fn test_submit_without_session_makes_no_call() {
        let store = Arc::new(MockStudentStore::new());
        let reconciler = editing(&store).await;
        reconciler.set_guest_count(Some(0)).unwrap();

        let calls_before = store.call_count().await;
        let err = reconciler.submit(None).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::SessionAbsent);
        assert_eq!(store.call_count().await, calls_before);
        assert_eq!(reconciler.phase(), Phase::Editing);
    }

    #[tokio::test]
    async fn test_reload_keeps_registered_lock() {
        let store = Arc::new(MockStudentStore::new());
        store.set_profile(fixtures::registered_profile()).await;
        let reconciler = Reconciler::new(store.clone());
        reconciler.load(Some(&session())).await.unwrap();
        let locked = reconciler.view();

        // Even a reload that would fail leaves the locked form untouched
        store
            .set_next_error(StoreError::ApiError {
                status: 500,
                message: String::new(),
            })
            .await;
        let identity = reconciler.load(Some(&session())).await.unwrap();

        assert_eq!(identity.roll_no, "CUK2025-017");
        assert_eq!(reconciler.view(), locked);
        assert_eq!(store.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_reload_after_hand_off_is_ignored() {
        let store = Arc::new(MockStudentStore::new());
        let reconciler = editing(&store).await;
        reconciler.set_guest_count(Some(0)).unwrap();
        reconciler.submit(Some(&session())).await.unwrap();

        reconciler.load(Some(&session())).await.unwrap();
        assert_eq!(reconciler.phase(), Phase::RedirectedToTicket);
    }

    #[tokio::test]
    async fn test_submit_before_load_is_ignored() {
        let store = Arc::new(MockStudentStore::new());
        let reconciler = Reconciler::new(store.clone());

        let outcome = reconciler.submit(Some(&session())).await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Ignored(IgnoreReason::NotEditable(Phase::Loading))
        );
        assert_eq!(store.call_count().await, 0);
    }
}
