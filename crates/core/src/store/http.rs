//! HTTP client for the store's edge functions.
//!
//! Every call carries the project's anon key as `apikey` and the session's
//! access token as a bearer `Authorization` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{ErrorBody, RegistrationRequest, StudentProfile, TicketPayload};
use super::{StoreError, StudentStore};
use crate::auth::Session;
use crate::config::StoreConfig;

const PROFILE_FUNCTION: &str = "get-student-info-by-auth";
const REGISTER_FUNCTION: &str = "register-student-by-auth";
const TICKET_FUNCTION: &str = "get-qr";

/// Store client speaking to the edge functions over HTTP.
pub struct HttpStudentStore {
    client: Client,
    functions_url: String,
    anon_key: String,
}

impl HttpStudentStore {
    /// Create a new store client.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.anon_key.is_empty() {
            return Err(StoreError::NotConfigured(
                "store anon key is required".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let functions_url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.functions_path.trim_matches('/')
        );

        Ok(Self {
            client,
            functions_url,
            anon_key: config.anon_key.clone(),
        })
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.functions_url, name)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header(reqwest::header::AUTHORIZATION, session.bearer())
    }

    /// Turn a non-2xx response into `ApiError`, reading `{error}` when present.
    async fn check_status(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_default();

        warn!("Store call rejected: status={}, error='{}'", status, message);

        Err(StoreError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_json<T: DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> Result<T, StoreError> {
        response.json().await.map_err(|e| {
            StoreError::ParseError(format!("Failed to parse {} response: {}", what, e))
        })
    }
}

#[async_trait]
impl StudentStore for HttpStudentStore {
    async fn fetch_profile(&self, session: &Session) -> Result<StudentProfile, StoreError> {
        let url = self.function_url(PROFILE_FUNCTION);

        debug!("Fetching student profile: {}", url);

        let response = self
            .authorized(self.client.post(&url), session)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Self::parse_json(response, "profile").await
    }

    async fn submit_registration(
        &self,
        session: &Session,
        request: &RegistrationRequest,
    ) -> Result<(), StoreError> {
        let url = self.function_url(REGISTER_FUNCTION);

        debug!(
            "Submitting registration: guest_count={}",
            request.guest_count
        );

        let response = self
            .authorized(self.client.post(&url), session)
            .json(request)
            .send()
            .await?;

        // Success carries no required body
        Self::check_status(response).await?;
        Ok(())
    }

    async fn fetch_ticket(
        &self,
        session: &Session,
        pass_id: &str,
    ) -> Result<TicketPayload, StoreError> {
        let url = self.function_url(TICKET_FUNCTION);

        debug!("Fetching ticket: pass_id={}", pass_id);

        let response = self
            .authorized(self.client.get(&url), session)
            .query(&[("pass_id", pass_id)])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Self::parse_json(response, "ticket").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StoreConfig {
        StoreConfig {
            base_url: base_url.to_string(),
            anon_key: "anon".to_string(),
            functions_path: "/functions/v1/".to_string(),
            timeout_secs: None,
        }
    }

    #[test]
    fn test_function_url_joins_cleanly() {
        let store = HttpStudentStore::new(&config("https://project.example.co/")).unwrap();
        assert_eq!(
            store.function_url(PROFILE_FUNCTION),
            "https://project.example.co/functions/v1/get-student-info-by-auth"
        );
    }

    #[test]
    fn test_missing_anon_key_rejected() {
        let mut cfg = config("https://project.example.co");
        cfg.anon_key = String::new();
        assert!(matches!(
            HttpStudentStore::new(&cfg),
            Err(StoreError::NotConfigured(_))
        ));
    }
}
