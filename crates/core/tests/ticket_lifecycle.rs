//! Ticket lifecycle integration tests.
//!
//! These tests load a ticket through the mock store, render it, and read the
//! produced PDF back:
//! - Holder detail lines in order, guest lines only when named
//! - Rejection of incomplete payloads
//! - Saving the file and ending the session

use std::sync::Arc;

use tempfile::TempDir;

use gatepass_core::{
    store::StudentStore,
    testing::{fixtures, holder_details_from_pdf, MockSessionProvider, MockStudentStore},
    ticket::{read_text_runs, render_document, TicketRecord, HOLDER_HEADING, SCAN_CAPTION},
    FailureKind, TicketConfig, TicketRenderer,
};

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(l, v)| (l.to_string(), v.to_string()))
        .collect()
}

async fn renderer_with(
    payload_edit: impl FnOnce(&mut gatepass_core::TicketPayload),
) -> (Arc<MockStudentStore>, TicketRenderer) {
    let store = Arc::new(MockStudentStore::new());
    store.set_profile(fixtures::registered_profile()).await;
    let mut payload = fixtures::ticket_payload();
    payload_edit(&mut payload);
    store.set_ticket(payload).await;

    let renderer = TicketRenderer::new(
        store.clone() as Arc<dyn StudentStore>,
        TicketConfig::default(),
    );
    (store, renderer)
}

#[tokio::test]
async fn test_absent_second_guest_has_no_line() {
    let (_store, renderer) = renderer_with(|p| p.guest_2_name = None).await;
    let ticket = renderer.load(Some(&fixtures::session())).await.unwrap();
    let document = renderer.render(&ticket).unwrap();

    let details = holder_details_from_pdf(&document.bytes).unwrap();
    assert_eq!(
        details,
        pairs(&[
            ("Student", "Asha Menon"),
            ("Roll No", "CUK2025-017"),
            ("Programme", "MSc Physics"),
            ("Year of Passing", "2025"),
            ("Email", "asha.menon@example.edu"),
            ("Guest 1", "Ravi Menon"),
        ])
    );
}

#[test]
fn test_guest_lines_follow_supplied_names() {
    let config = TicketConfig::default();
    let cases = [
        (None, None, vec![]),
        (Some("Ravi Menon"), None, vec!["Guest 1"]),
        (None, Some("Lata Menon"), vec!["Guest 2"]),
        (Some("Ravi Menon"), Some("Lata Menon"), vec!["Guest 1", "Guest 2"]),
        (Some("  "), Some(""), vec![]),
    ];

    for (guest_1, guest_2, expected) in cases {
        let ticket = fixtures::ticket_record(guest_1, guest_2);
        let document = render_document(&ticket, &config).unwrap();
        let details = holder_details_from_pdf(&document.bytes).unwrap();

        let labels: Vec<&str> = details.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(
            &labels[..5],
            ["Student", "Roll No", "Programme", "Year of Passing", "Email"]
        );
        assert_eq!(labels[5..].to_vec(), expected, "{:?} {:?}", guest_1, guest_2);
    }
}

#[test]
fn test_missing_optional_identity_prints_dash() {
    let mut ticket = fixtures::ticket_record(None, None);
    ticket.programme = None;
    ticket.year_of_passing = Some(" ".to_string());

    let document = render_document(&ticket, &TicketConfig::default()).unwrap();
    let details = holder_details_from_pdf(&document.bytes).unwrap();
    assert_eq!(details[2], ("Programme".to_string(), "-".to_string()));
    assert_eq!(details[3], ("Year of Passing".to_string(), "-".to_string()));
}

#[test]
fn test_configured_wording_is_printed() {
    let config = TicketConfig {
        event_title: "SPRING GALA 2026".to_string(),
        footer: "Spring Gala Ticket".to_string(),
        ..TicketConfig::default()
    };
    let document = render_document(&fixtures::ticket_record(None, None), &config).unwrap();

    let texts: Vec<String> = read_text_runs(&document.bytes)
        .unwrap()
        .into_iter()
        .map(|r| r.text)
        .collect();
    assert_eq!(texts.first().map(String::as_str), Some(SCAN_CAPTION));
    assert!(texts.contains(&"SPRING GALA 2026".to_string()));
    assert_eq!(texts.last().map(String::as_str), Some("Spring Gala Ticket"));
    assert!(texts.contains(&HOLDER_HEADING.to_string()));
}

#[test]
fn test_rendering_is_deterministic() {
    let ticket = fixtures::ticket_record(Some("Ravi Menon"), None);
    let config = TicketConfig::default();
    let first = render_document(&ticket, &config).unwrap();
    let second = render_document(&ticket, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.file_name, "CUK_Convocation_Ticket_CUK2025-017.pdf");
}

#[tokio::test]
async fn test_each_missing_mandatory_field_fails_load() {
    for field in ["qrSvgString", "name", "email", "roll_no"] {
        let (store, renderer) = renderer_with(|p| match field {
            "qrSvgString" => p.qr_svg = None,
            "name" => p.name = None,
            "email" => p.email = None,
            _ => p.roll_no = None,
        })
        .await;

        let err = renderer
            .load(Some(&fixtures::session()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::TicketLoadFailed, "{}", field);
        assert_eq!(err.message, "Incomplete QR code data received from server.");
        assert!(!err.kind.invalidates_session());
        assert_eq!(store.call_count().await, 2);
    }
}

#[tokio::test]
async fn test_deliver_saves_and_ends_session() {
    let (_store, renderer) = renderer_with(|_| {}).await;
    let sessions = MockSessionProvider::signed_in(fixtures::ACCESS_TOKEN);
    let out = TempDir::new().expect("Failed to create temp dir");

    let ticket = renderer.load(Some(&fixtures::session())).await.unwrap();
    let path = renderer
        .deliver(&ticket, &out.path().join("tickets"), &sessions)
        .await
        .unwrap();

    assert!(path.ends_with("tickets/CUK_Convocation_Ticket_CUK2025-017.pdf"));
    let details = holder_details_from_pdf(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(details.len(), 6);
    assert!(!sessions.is_signed_in());
}

#[tokio::test]
async fn test_sign_out_failure_does_not_lose_ticket() {
    let (_store, renderer) = renderer_with(|_| {}).await;
    let sessions = MockSessionProvider::signed_in(fixtures::ACCESS_TOKEN);
    sessions.fail_sign_out();
    let out = TempDir::new().expect("Failed to create temp dir");

    let ticket = renderer.load(Some(&fixtures::session())).await.unwrap();
    let path = renderer.deliver(&ticket, out.path(), &sessions).await.unwrap();
    assert!(path.exists());
    assert_eq!(sessions.sign_out_count(), 1);
}

#[test]
fn test_generation_failure_can_be_retried() {
    let store = Arc::new(MockStudentStore::new());
    let renderer = TicketRenderer::new(store as Arc<dyn StudentStore>, TicketConfig::default());

    let good = fixtures::ticket_record(None, None);
    let broken = TicketRecord {
        qr_svg: r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#.to_string(),
        ..good.clone()
    };

    let err = renderer.render(&broken).unwrap_err();
    assert_eq!(err.kind, FailureKind::DocumentGenerationFailed);
    assert_eq!(err.message, "Failed to generate ticket. Please try again.");

    assert!(renderer.render(&good).is_ok());
}
