//! Refund backend collaborators
//!
//! The workflow core never does I/O. Email lookup, submission and status
//! lookup go through a [`RefundBackend`], either the HTTP client for the
//! real backend or an in-memory stand-in for local runs and tests.

mod error;
mod http;
mod memory;

pub use error::BackendError;
pub use http::HttpBackend;
pub use memory::InMemoryBackend;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendConfig, BackendKind};
use crate::refund::{EmailLookupResult, RefundRequestData, StatusLookupResult, SubmissionResult};

/// Request/response contracts consumed by the refund workflow
#[async_trait]
pub trait RefundBackend: Send + Sync {
    /// Backend name for logs and errors (e.g. "http", "memory")
    fn name(&self) -> &str;

    /// Look up the pass purchased with an (already normalized) email
    async fn validate_email(&self, email: &str) -> Result<EmailLookupResult, BackendError>;

    /// Submit a completed refund request
    async fn submit_refund(
        &self,
        request: &RefundRequestData,
    ) -> Result<SubmissionResult, BackendError>;

    /// Look up a submitted request by confirmation number
    async fn lookup_status(
        &self,
        confirmation_number: &str,
    ) -> Result<StatusLookupResult, BackendError>;
}

/// Build the backend selected in config
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn RefundBackend>, BackendError> {
    match config.kind {
        BackendKind::Http => {
            let backend = HttpBackend::from_config(config)?;
            tracing::info!(base_url = %config.base_url, "using HTTP refund backend");
            Ok(Arc::new(backend))
        }
        BackendKind::Memory => {
            tracing::info!("using in-memory refund backend with demo pass holders");
            Ok(Arc::new(InMemoryBackend::demo()))
        }
    }
}
