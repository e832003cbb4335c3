//! Failure model shared by the screens.
//!
//! Operations never navigate. They return `Ok(data)` or a [`FlowError`] whose
//! [`FailureKind`] tells the caller where to go next and whether the held
//! credential has to be dropped.

use serde::Serialize;
use thiserror::Error;

use crate::registration::FieldError;

/// What went wrong, at the granularity the caller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No identity session. Redirect to entry without a message.
    SessionAbsent,
    /// The profile could not be fetched. Sign out and redirect with the reason.
    ProfileFetchFailed,
    /// Ticket requested for a student without an issued pass.
    NotRegistered,
    /// The draft broke one or more field rules.
    ValidationFailed,
    /// The store rejected the registration.
    SubmitFailed,
    /// The pass or its QR payload could not be loaded.
    TicketLoadFailed,
    /// The ticket document could not be produced.
    DocumentGenerationFailed,
}

/// Where the caller should take the user after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Disposition {
    /// Leave the screen for the entry screen.
    RedirectToEntry { show_message: bool },
    /// Stay on the screen and show the message in place.
    Inline { retryable: bool },
}

impl FailureKind {
    pub fn disposition(self) -> Disposition {
        match self {
            FailureKind::SessionAbsent => Disposition::RedirectToEntry {
                show_message: false,
            },
            FailureKind::ProfileFetchFailed | FailureKind::NotRegistered => {
                Disposition::RedirectToEntry { show_message: true }
            }
            FailureKind::ValidationFailed
            | FailureKind::SubmitFailed
            | FailureKind::DocumentGenerationFailed => Disposition::Inline { retryable: true },
            FailureKind::TicketLoadFailed => Disposition::Inline { retryable: false },
        }
    }

    /// Whether the caller has to terminate the identity session.
    pub fn invalidates_session(self) -> bool {
        matches!(
            self,
            FailureKind::SessionAbsent | FailureKind::ProfileFetchFailed
        )
    }
}

/// A failed screen operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FlowError {
    pub kind: FailureKind,
    pub message: String,
    /// Per-field problems, only filled for `ValidationFailed`.
    pub field_errors: Vec<FieldError>,
}

impl FlowError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn session_absent() -> Self {
        Self::new(FailureKind::SessionAbsent, "")
    }

    pub fn validation(field_errors: Vec<FieldError>) -> Self {
        Self {
            kind: FailureKind::ValidationFailed,
            message: "Please correct the highlighted fields.".to_string(),
            field_errors,
        }
    }

    pub fn disposition(&self) -> Disposition {
        self.kind.disposition()
    }
}

pub type FlowResult<T> = Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::DraftField;

    #[test]
    fn test_only_session_failures_invalidate_credentials() {
        let all = [
            FailureKind::SessionAbsent,
            FailureKind::ProfileFetchFailed,
            FailureKind::NotRegistered,
            FailureKind::ValidationFailed,
            FailureKind::SubmitFailed,
            FailureKind::TicketLoadFailed,
            FailureKind::DocumentGenerationFailed,
        ];
        let invalidating: Vec<FailureKind> = all
            .into_iter()
            .filter(|k| k.invalidates_session())
            .collect();
        assert_eq!(
            invalidating,
            vec![FailureKind::SessionAbsent, FailureKind::ProfileFetchFailed]
        );
    }

    #[test]
    fn test_dispositions() {
        assert_eq!(
            FailureKind::SessionAbsent.disposition(),
            Disposition::RedirectToEntry {
                show_message: false
            }
        );
        assert_eq!(
            FailureKind::ProfileFetchFailed.disposition(),
            Disposition::RedirectToEntry { show_message: true }
        );
        assert_eq!(
            FailureKind::TicketLoadFailed.disposition(),
            Disposition::Inline { retryable: false }
        );
        assert_eq!(
            FailureKind::DocumentGenerationFailed.disposition(),
            Disposition::Inline { retryable: true }
        );
    }

    #[test]
    fn test_validation_error_carries_fields() {
        let err = FlowError::validation(vec![FieldError::required(DraftField::Guardian1)]);
        assert_eq!(err.kind, FailureKind::ValidationFailed);
        assert_eq!(err.field_errors.len(), 1);
        assert_eq!(err.field_errors[0].field, DraftField::Guardian1);
    }

    #[test]
    fn test_session_absent_is_silent() {
        let err = FlowError::session_absent();
        assert!(err.message.is_empty());
        assert_eq!(err.to_string(), "");
    }
}
