//! HTTP client for the refund backend

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{BackendError, RefundBackend};
use crate::config::BackendConfig;
use crate::refund::{EmailLookupResult, RefundRequestData, StatusLookupResult, SubmissionResult};

const BACKEND_NAME: &str = "http";

/// Refund backend reached over HTTP/JSON
pub struct HttpBackend {
    base_url: String,
    api_token: Option<String>,
    client: Client,
}

impl HttpBackend {
    /// Create a backend client with an explicit token
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::not_configured(
                BACKEND_NAME,
                "backend.base_url is empty",
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::not_configured(BACKEND_NAME, e.to_string()))?;

        Ok(Self {
            base_url,
            api_token,
            client,
        })
    }

    /// Create from config. The bearer token, if any, is read from the
    /// environment variable named in `backend.api_token_env`.
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let api_token = config
            .api_token_env
            .as_deref()
            .and_then(|var| env::var(var).ok())
            .filter(|token| !token.is_empty());

        if config.api_token_env.is_some() && api_token.is_none() {
            warn!(
                var = config.api_token_env.as_deref().unwrap_or_default(),
                "backend token variable is not set, sending unauthenticated requests"
            );
        }

        Self::new(
            &config.base_url,
            api_token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .authorize(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::network(BACKEND_NAME, e.to_string()))?;

        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| BackendError::network(BACKEND_NAME, e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return match status.as_u16() {
                429 => Err(BackendError::rate_limited(BACKEND_NAME, retry_after)),
                code => Err(BackendError::from_status(BACKEND_NAME, code, body)),
            };
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::invalid_response(BACKEND_NAME, e.to_string()))
    }
}

#[derive(Serialize)]
struct ValidateEmailRequest<'a> {
    email: &'a str,
}

#[async_trait]
impl RefundBackend for HttpBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn validate_email(&self, email: &str) -> Result<EmailLookupResult, BackendError> {
        self.post_json("refunds/validate_email", &ValidateEmailRequest { email })
            .await
    }

    async fn submit_refund(
        &self,
        request: &RefundRequestData,
    ) -> Result<SubmissionResult, BackendError> {
        self.post_json("refunds", request).await
    }

    async fn lookup_status(
        &self,
        confirmation_number: &str,
    ) -> Result<StatusLookupResult, BackendError> {
        let path = format!("refunds/status/{}", confirmation_number.trim());
        self.get_json(&path).await
    }
}
