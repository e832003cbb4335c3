//! Entry routing.
//!
//! Decides which screen a signed-in student lands on. Nothing here navigates;
//! the caller follows the returned [`EntryRoute`].

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{Session, SessionProvider};
use crate::store::{StoreError, StudentStore};

const VERIFICATION_FALLBACK: &str = "Verification failed. Please try again.";
const CONNECT_FALLBACK: &str = "Failed to connect to server.";

/// Where the student goes from the entry screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum EntryRoute {
    /// Stay on the entry screen and sign in, showing `error` if there is one.
    SignIn { error: Option<String> },
    /// Registration form.
    Register,
    /// Ticket screen.
    Ticket,
}

/// Route a student from the entry screen.
///
/// An error carried over from a screen that redirected here is shown as is,
/// without looking at the profile, so a failing store cannot bounce the user
/// around. A failed profile lookup ends the session.
pub async fn resolve_entry(
    session: Option<&Session>,
    store: &dyn StudentStore,
    sessions: &dyn SessionProvider,
    carried_error: Option<String>,
) -> EntryRoute {
    if let Some(error) = carried_error.filter(|e| !e.trim().is_empty()) {
        return EntryRoute::SignIn { error: Some(error) };
    }

    let Some(session) = session else {
        return EntryRoute::SignIn { error: None };
    };

    match store.fetch_profile(session).await {
        Ok(profile) if profile.is_registered => {
            info!("{} is registered, routing to ticket", profile.roll_no);
            EntryRoute::Ticket
        }
        Ok(profile) => {
            info!("{} is not registered, routing to form", profile.roll_no);
            EntryRoute::Register
        }
        Err(e) => {
            warn!("Profile fetch failed on entry: {}", e);
            if let Err(e) = sessions.sign_out().await {
                warn!("Sign-out after failed profile fetch failed: {}", e);
            }
            let error = match e {
                StoreError::HttpError(_) => CONNECT_FALLBACK.to_string(),
                e => e.user_message(VERIFICATION_FALLBACK),
            };
            EntryRoute::SignIn { error: Some(error) }
        }
    }
}
