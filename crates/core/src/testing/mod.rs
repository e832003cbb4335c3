//! Testing utilities and mock implementations.
//!
//! Mocks of the store and the session provider let the screen operations be
//! exercised end to end without a backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatepass_core::testing::{fixtures, MockStudentStore};
//!
//! let store = Arc::new(MockStudentStore::new());
//! store.set_profile(fixtures::unregistered_profile()).await;
//!
//! let reconciler = Reconciler::new(store.clone());
//! reconciler.load(Some(&fixtures::session())).await?;
//! ```

mod mock_session_provider;
mod mock_student_store;

pub use mock_session_provider::MockSessionProvider;
pub use mock_student_store::{MockStudentStore, RecordedStoreCall};

use crate::ticket::{read_text_runs, DocumentError, TextRun};

/// Label/value pairs of the holder section of a generated ticket, read back
/// from the PDF bytes.
///
/// Pairs are the bold `Label:` runs after the holder heading, each followed
/// by its value run.
pub fn holder_details_from_pdf(pdf: &[u8]) -> Result<Vec<(String, String)>, DocumentError> {
    let runs = read_text_runs(pdf)?;
    let start = runs
        .iter()
        .position(|r| r.text == crate::ticket::HOLDER_HEADING)
        .map_or(runs.len(), |i| i + 1);

    let mut details = Vec::new();
    let mut rest = runs[start..].iter().peekable();
    while let Some(TextRun { text, bold, .. }) = rest.next() {
        let label = match text.strip_suffix(':') {
            Some(label) if *bold => label,
            _ => continue,
        };
        if let Some(value) = rest.next_if(|r| !r.bold) {
            details.push((label.to_string(), value.text.clone()));
        }
    }
    Ok(details)
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::auth::Session;
    use crate::store::{StudentProfile, TicketPayload};
    use crate::ticket::TicketRecord;

    pub const ACCESS_TOKEN: &str = "test-access-token";
    pub const PASS_ID: &str = "PASS-2025-0042";

    /// A 21-module QR-shaped SVG: three finder patterns and a few data modules.
    pub const QR_SVG: &str = concat!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 21 21" width="21" height="21" shape-rendering="crispEdges">"#,
        r##"<path fill="#000" d="M0 0h7v7h-7zM14 0h7v7h-7zM0 14h7v7h-7z"/>"##,
        r##"<path fill="#fff" d="M1 1h5v5h-5zM15 1h5v5h-5zM1 15h5v5h-5z"/>"##,
        r##"<path fill="#000" d="M2 2h3v3h-3zM16 2h3v3h-3zM2 16h3v3h-3z"/>"##,
        r##"<path fill="#000" d="M8 8h1v1h-1zM10 9h2v1h-2zM12 12h1v3h-1zM9 16h3v1h-3z"/>"##,
        "</svg>"
    );

    pub fn session() -> Session {
        Session::new(ACCESS_TOKEN).expect("fixture token is not blank")
    }

    /// Profile of a student who has not registered yet.
    pub fn unregistered_profile() -> StudentProfile {
        StudentProfile {
            name: "Asha Menon".to_string(),
            email: "asha.menon@example.edu".to_string(),
            roll_no: "CUK2025-017".to_string(),
            programme: "MSc Physics".to_string(),
            year_of_passing: "2025".to_string(),
            ..StudentProfile::default()
        }
    }

    /// The same student after registering with one guest.
    pub fn registered_profile() -> StudentProfile {
        StudentProfile {
            is_registered: true,
            guest_count: Some(1),
            guardian1: Some("Ravi Menon".to_string()),
            guardian2: None,
            pass_id: Some(PASS_ID.to_string()),
            ..unregistered_profile()
        }
    }

    /// Ticket lookup response for [`registered_profile`].
    pub fn ticket_payload() -> TicketPayload {
        TicketPayload {
            qr_svg: Some(QR_SVG.to_string()),
            name: Some("Asha Menon".to_string()),
            email: Some("asha.menon@example.edu".to_string()),
            roll_no: Some("CUK2025-017".to_string()),
            guest_1_name: Some("Ravi Menon".to_string()),
            guest_2_name: None,
            programme: Some("MSc Physics".to_string()),
            year_of_passing: Some("2025".to_string()),
        }
    }

    /// A complete ticket with the given guests.
    pub fn ticket_record(guest_1: Option<&str>, guest_2: Option<&str>) -> TicketRecord {
        TicketRecord {
            pass_id: PASS_ID.to_string(),
            qr_svg: QR_SVG.to_string(),
            name: "Asha Menon".to_string(),
            email: "asha.menon@example.edu".to_string(),
            roll_no: "CUK2025-017".to_string(),
            programme: Some("MSc Physics".to_string()),
            year_of_passing: Some("2025".to_string()),
            guest_1_name: guest_1.map(str::to_string),
            guest_2_name: guest_2.map(str::to_string),
        }
    }
}
