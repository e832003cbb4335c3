//! Session persisted in a token file.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{AuthError, Session, SessionProvider};

/// Provider reading the access token from a file on every call.
///
/// A missing or blank file means no session. Signing out removes the file.
pub struct TokenFileProvider {
    path: PathBuf,
}

impl TokenFileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionProvider for TokenFileProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Session::new(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::Storage(e)),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed token file {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(e)),
        }
    }

    fn method_name(&self) -> &'static str {
        "token_file"
    }
}
