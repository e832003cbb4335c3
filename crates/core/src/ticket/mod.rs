//! Entry ticket: loading the issued pass and producing the printable document.

mod config;
mod fonts;
mod layout;
mod pdf;
mod qr;
mod renderer;

pub use config::TicketConfig;
pub use fonts::Font;
pub use layout::{
    holder_details, layout_ticket, Align, DrawOp, Rgb, TicketLayout, ENTRY_HEADING, HOLDER_HEADING,
    PAGE_HEIGHT_MM, PAGE_WIDTH_MM, SCAN_CAPTION,
};
pub use pdf::{read_text_runs, write_pdf, TextRun};
pub use qr::{rasterize_qr, QrRaster, QR_RASTER_SIZE};
pub use renderer::{document_file_name, render_document, GeneratedDocument, TicketRenderer};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::TicketPayload;

/// Errors from producing the ticket document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("QR rasterization failed: {0}")]
    Rasterize(String),

    #[error("ticket field '{0}' is missing")]
    MissingField(&'static str),

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An issued ticket with every mandatory field present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub pass_id: String,
    pub qr_svg: String,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub programme: Option<String>,
    pub year_of_passing: Option<String>,
    pub guest_1_name: Option<String>,
    pub guest_2_name: Option<String>,
}

impl TicketRecord {
    /// Accept a ticket lookup response.
    ///
    /// Returns the wire names of every mandatory field that is absent or
    /// blank; a partial record is never built.
    pub fn from_payload(
        pass_id: impl Into<String>,
        payload: TicketPayload,
    ) -> Result<Self, Vec<&'static str>> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let qr_svg = present(payload.qr_svg);
        let name = present(payload.name);
        let email = present(payload.email);
        let roll_no = present(payload.roll_no);

        match (qr_svg, name, email, roll_no) {
            (Some(qr_svg), Some(name), Some(email), Some(roll_no)) => Ok(Self {
                pass_id: pass_id.into(),
                qr_svg,
                name,
                email,
                roll_no,
                programme: payload.programme,
                year_of_passing: payload.year_of_passing,
                guest_1_name: payload.guest_1_name,
                guest_2_name: payload.guest_2_name,
            }),
            (qr_svg, name, email, roll_no) => Err([
                ("qrSvgString", qr_svg.is_none()),
                ("name", name.is_none()),
                ("email", email.is_none()),
                ("roll_no", roll_no.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_complete_payload() {
        let record = TicketRecord::from_payload("PASS-1", fixtures::ticket_payload()).unwrap();
        assert_eq!(record.pass_id, "PASS-1");
        assert_eq!(record.roll_no, "CUK2025-017");
        assert_eq!(record.guest_1_name.as_deref(), Some("Ravi Menon"));
        assert_eq!(record.guest_2_name, None);
    }

    #[test]
    fn test_each_mandatory_field_rejected() {
        let strip: [(&str, fn(&mut TicketPayload)); 4] = [
            ("qrSvgString", |p| p.qr_svg = None),
            ("name", |p| p.name = None),
            ("email", |p| p.email = Some("  ".to_string())),
            ("roll_no", |p| p.roll_no = None),
        ];

        for (field, remove) in strip {
            let mut payload = fixtures::ticket_payload();
            remove(&mut payload);
            let missing = TicketRecord::from_payload("PASS-1", payload).unwrap_err();
            assert_eq!(missing, vec![field]);
        }
    }

    #[test]
    fn test_all_missing_reported_together() {
        let missing = TicketRecord::from_payload("PASS-1", TicketPayload::default()).unwrap_err();
        assert_eq!(missing, vec!["qrSvgString", "name", "email", "roll_no"]);
    }
}
