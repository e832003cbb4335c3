mod static_token;
mod token_file;
mod traits;
mod types;

pub use static_token::*;
pub use token_file::*;
pub use traits::*;
pub use types::*;

use crate::config::SessionConfig;

/// Factory function to create a session provider from config
pub fn create_session_provider(
    config: &SessionConfig,
) -> Result<Box<dyn SessionProvider>, AuthError> {
    use crate::config::SessionMethod;

    match config.method {
        SessionMethod::Token => Ok(Box::new(StaticTokenProvider::new(
            config.access_token.clone(),
        ))),
        SessionMethod::TokenFile => {
            let path = config.token_file.clone().ok_or_else(|| {
                AuthError::ConfigurationError(
                    "token_file must be set when using TokenFile session method".to_string(),
                )
            })?;
            Ok(Box::new(TokenFileProvider::new(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionMethod;

    #[test]
    fn test_create_session_provider_token() {
        let config = SessionConfig {
            method: SessionMethod::Token,
            access_token: Some("jwt".to_string()),
            token_file: None,
        };
        let provider = create_session_provider(&config).unwrap();
        assert_eq!(provider.method_name(), "token");
    }

    #[test]
    fn test_create_session_provider_token_file() {
        let config = SessionConfig {
            method: SessionMethod::TokenFile,
            access_token: None,
            token_file: Some("/tmp/gatepass.token".into()),
        };
        let provider = create_session_provider(&config).unwrap();
        assert_eq!(provider.method_name(), "token_file");
    }

    #[test]
    fn test_create_session_provider_token_file_missing_path() {
        let config = SessionConfig {
            method: SessionMethod::TokenFile,
            access_token: None,
            token_file: None,
        };
        let result = create_session_provider(&config);
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }
}
