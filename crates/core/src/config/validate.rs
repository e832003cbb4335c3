use super::{types::Config, ConfigError, SessionMethod};

/// Validate configuration
/// Currently validates:
/// - Store URL is http(s) and the anon key is set
/// - Session method has the field it needs
/// - Ticket file prefix is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.store.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "store.base_url must be an http(s) URL, got '{}'",
            config.store.base_url
        )));
    }

    if config.store.anon_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "store.anon_key cannot be empty".to_string(),
        ));
    }

    if config.store.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "store.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.session.method == SessionMethod::TokenFile && config.session.token_file.is_none() {
        return Err(ConfigError::ValidationError(
            "session.token_file must be set when method = \"token_file\"".to_string(),
        ));
    }

    if config.ticket.file_prefix.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "ticket.file_prefix cannot be empty".to_string(),
        ));
    }

    Ok(())
}
