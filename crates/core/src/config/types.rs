use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ticket::TicketConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ticket: TicketConfig,
}

/// Remote student store (edge functions) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Project URL, e.g. "https://abcd.supabase.co"
    pub base_url: String,
    /// Public anon key sent as the `apikey` header
    pub anon_key: String,
    /// Path under `base_url` where the functions live
    #[serde(default = "default_functions_path")]
    pub functions_path: String,
    /// Optional request timeout in seconds. Requests wait indefinitely when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_functions_path() -> String {
    "functions/v1".to_string()
}

/// Where the access token comes from
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub method: SessionMethod,
    /// Access token (used when method = "token")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Token file (required when method = "token_file")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionMethod {
    #[default]
    Token,
    TokenFile,
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub store: SanitizedStoreConfig,
    pub session: SanitizedSessionConfig,
    pub ticket: TicketConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStoreConfig {
    pub base_url: String,
    pub functions_path: String,
    pub anon_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Sanitized session config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSessionConfig {
    pub method: String,
    pub access_token_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            store: SanitizedStoreConfig {
                base_url: config.store.base_url.clone(),
                functions_path: config.store.functions_path.clone(),
                anon_key_configured: !config.store.anon_key.is_empty(),
                timeout_secs: config.store.timeout_secs,
            },
            session: SanitizedSessionConfig {
                method: match config.session.method {
                    SessionMethod::Token => "token".to_string(),
                    SessionMethod::TokenFile => "token_file".to_string(),
                },
                access_token_configured: config
                    .session
                    .access_token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
                token_file: config.session.token_file.clone(),
            },
            ticket: config.ticket.clone(),
        }
    }
}
