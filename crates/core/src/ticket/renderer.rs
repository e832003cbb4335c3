//! Ticket screen operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::layout::layout_ticket;
use super::pdf::write_pdf;
use super::qr::{rasterize_qr, QR_RASTER_SIZE};
use super::{DocumentError, TicketConfig, TicketRecord};
use crate::auth::{Session, SessionProvider};
use crate::flow::{FailureKind, FlowError, FlowResult};
use crate::store::StudentStore;

const PROFILE_FETCH_FALLBACK: &str = "Failed to fetch profile";
const NOT_REGISTERED_MESSAGE: &str =
    "Registration incomplete or pass ID missing. Please register first or contact support.";
const TICKET_LOAD_FALLBACK: &str = "Failed to load QR code details.";
const INCOMPLETE_TICKET_MESSAGE: &str = "Incomplete QR code data received from server.";
const GENERATION_FAILED_MESSAGE: &str = "Failed to generate ticket. Please try again.";

/// A finished ticket document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `<prefix>_<roll_no>.pdf`, with characters that cannot appear in a file
/// name replaced by `_`.
pub fn document_file_name(prefix: &str, roll_no: &str) -> String {
    let safe: String = roll_no
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}_{}.pdf", prefix, safe)
}

/// Produce the ticket PDF. Pure: same record and config give the same bytes.
pub fn render_document(
    ticket: &TicketRecord,
    config: &TicketConfig,
) -> Result<GeneratedDocument, DocumentError> {
    let layout = layout_ticket(ticket, config)?;
    let qr = rasterize_qr(&ticket.qr_svg, QR_RASTER_SIZE)?;
    let title = format!("{} - {}", config.event_title, ticket.roll_no);
    let bytes = write_pdf(&layout, &qr, &title)?;

    Ok(GeneratedDocument {
        file_name: document_file_name(&config.file_prefix, &ticket.roll_no),
        bytes,
    })
}

/// Loads the issued pass and turns it into a saved document.
pub struct TicketRenderer {
    store: Arc<dyn StudentStore>,
    config: TicketConfig,
}

impl TicketRenderer {
    pub fn new(store: Arc<dyn StudentStore>, config: TicketConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TicketConfig {
        &self.config
    }

    /// Fetch the profile, then the pass it points at.
    ///
    /// A student without an issued pass is sent back to the entry screen; a
    /// pass payload missing any mandatory field is rejected as a whole.
    pub async fn load(&self, session: Option<&Session>) -> FlowResult<TicketRecord> {
        let session = session.ok_or_else(FlowError::session_absent)?;

        let profile = self.store.fetch_profile(session).await.map_err(|e| {
            warn!("Profile fetch failed: {}", e);
            FlowError::new(
                FailureKind::TicketLoadFailed,
                e.user_message(PROFILE_FETCH_FALLBACK),
            )
        })?;

        let pass_id = match profile.pass_id {
            Some(pass_id) if profile.is_registered => pass_id,
            _ => {
                info!("Profile {} has no issued pass", profile.roll_no);
                return Err(FlowError::new(
                    FailureKind::NotRegistered,
                    NOT_REGISTERED_MESSAGE,
                ));
            }
        };

        let payload = self
            .store
            .fetch_ticket(session, &pass_id)
            .await
            .map_err(|e| {
                warn!("Ticket fetch for pass {} failed: {}", pass_id, e);
                FlowError::new(
                    FailureKind::TicketLoadFailed,
                    e.user_message(TICKET_LOAD_FALLBACK),
                )
            })?;

        let ticket = TicketRecord::from_payload(pass_id, payload).map_err(|missing| {
            warn!("Ticket payload missing fields: {}", missing.join(", "));
            FlowError::new(FailureKind::TicketLoadFailed, INCOMPLETE_TICKET_MESSAGE)
        })?;

        info!("Loaded pass {} for {}", ticket.pass_id, ticket.roll_no);
        Ok(ticket)
    }

    /// Produce the document for a loaded ticket. The ticket is only borrowed,
    /// so a failed attempt can simply be repeated.
    pub fn render(&self, ticket: &TicketRecord) -> FlowResult<GeneratedDocument> {
        render_document(ticket, &self.config).map_err(|e| {
            warn!("Ticket generation for {} failed: {}", ticket.roll_no, e);
            FlowError::new(
                FailureKind::DocumentGenerationFailed,
                GENERATION_FAILED_MESSAGE,
            )
        })
    }

    /// Render, save into `dir`, then end the session.
    ///
    /// Nothing is signed out unless the file was written.
    pub async fn deliver(
        &self,
        ticket: &TicketRecord,
        dir: &Path,
        sessions: &dyn SessionProvider,
    ) -> FlowResult<PathBuf> {
        let document = self.render(ticket)?;
        let path = dir.join(&document.file_name);

        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, &document.bytes).await
        }
        .await;

        if let Err(e) = written {
            warn!("Saving {} failed: {}", path.display(), e);
            return Err(FlowError::new(
                FailureKind::DocumentGenerationFailed,
                GENERATION_FAILED_MESSAGE,
            ));
        }
        debug!("Wrote {} bytes to {}", document.bytes.len(), path.display());

        if let Err(e) = sessions.sign_out().await {
            warn!("Sign-out after ticket download failed: {}", e);
        }
        info!("Ticket saved to {}, session ended", path.display());

        Ok(path)
    }
}
