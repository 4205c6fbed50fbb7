//! Errors from the refund backend collaborators

use thiserror::Error;

/// Failures talking to the refund backend.
///
/// A refusal carried inside a well-formed response (e.g. `not_found` from
/// the email lookup) is not an error at this level; see
/// [`crate::refund::EmailLookupResult`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// 401/403 from the backend
    #[error("{backend}: unauthorized")]
    Unauthorized { backend: String },

    /// 429 from the backend
    #[error("{backend}: rate limited")]
    RateLimited {
        backend: String,
        retry_after_secs: Option<u64>,
    },

    /// Transport failure or timeout
    #[error("{backend}: network error: {message}")]
    Network { backend: String, message: String },

    /// Any other non-success status
    #[error("{backend}: HTTP {status}: {message}")]
    Http {
        backend: String,
        status: u16,
        message: String,
    },

    /// Response body did not match the contract
    #[error("{backend}: invalid response: {message}")]
    InvalidResponse { backend: String, message: String },

    /// Backend is missing configuration (e.g. base URL)
    #[error("{backend}: not configured: {message}")]
    NotConfigured { backend: String, message: String },
}

impl BackendError {
    pub fn unauthorized(backend: &str) -> Self {
        Self::Unauthorized {
            backend: backend.to_string(),
        }
    }

    pub fn rate_limited(backend: &str, retry_after_secs: Option<u64>) -> Self {
        Self::RateLimited {
            backend: backend.to_string(),
            retry_after_secs,
        }
    }

    pub fn network(backend: &str, message: impl Into<String>) -> Self {
        Self::Network {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    pub fn http(backend: &str, status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            backend: backend.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(backend: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    pub fn not_configured(backend: &str, message: impl Into<String>) -> Self {
        Self::NotConfigured {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status to an error
    pub fn from_status(backend: &str, status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::unauthorized(backend),
            429 => Self::rate_limited(backend, None),
            _ => Self::http(backend, status, body),
        }
    }

    pub fn backend_name(&self) -> &str {
        match self {
            BackendError::Unauthorized { backend }
            | BackendError::RateLimited { backend, .. }
            | BackendError::Network { backend, .. }
            | BackendError::Http { backend, .. }
            | BackendError::InvalidResponse { backend, .. }
            | BackendError::NotConfigured { backend, .. } => backend,
        }
    }

    /// Whether trying again later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::RateLimited { .. } | BackendError::Network { .. } => true,
            BackendError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            BackendError::from_status("http", 401, String::new()),
            BackendError::Unauthorized { .. }
        ));
        assert!(matches!(
            BackendError::from_status("http", 403, String::new()),
            BackendError::Unauthorized { .. }
        ));
        assert!(matches!(
            BackendError::from_status("http", 429, String::new()),
            BackendError::RateLimited { .. }
        ));
        assert_eq!(
            BackendError::from_status("http", 500, "boom".to_string()),
            BackendError::http("http", 500, "boom")
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(BackendError::network("http", "reset").is_transient());
        assert!(BackendError::http("http", 503, "").is_transient());
        assert!(!BackendError::http("http", 404, "").is_transient());
        assert!(!BackendError::unauthorized("http").is_transient());
    }

    #[test]
    fn test_display_includes_backend() {
        let err = BackendError::http("http", 502, "bad gateway");
        assert_eq!(err.to_string(), "http: HTTP 502: bad gateway");
        assert_eq!(err.backend_name(), "http");
    }
}
