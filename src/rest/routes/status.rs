//! Refund status lookup endpoint.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::refund::StatusLookupResult;
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Look up a submitted refund request by confirmation number
#[utoipa::path(
    get,
    path = "/api/v1/refunds/status/{confirmation}",
    tag = "Status",
    params(
        ("confirmation" = String, Path, description = "Confirmation number issued at submission")
    ),
    responses(
        (status = 200, description = "Request status", body = StatusLookupResult),
        (status = 404, description = "No request with that confirmation number", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn lookup(
    State(state): State<ApiState>,
    Path(confirmation): Path<String>,
) -> Result<Json<StatusLookupResult>, ApiError> {
    let confirmation = confirmation.trim();
    if confirmation.is_empty() {
        return Err(ApiError::BadRequest(
            "Confirmation number is required".to_string(),
        ));
    }

    let result = state
        .backend
        .lookup_status(confirmation)
        .await
        .map_err(|e| {
            tracing::warn!(backend = e.backend_name(), error = %e, "status lookup failed");
            ApiError::from(e)
        })?;

    if !result.success {
        return Err(ApiError::NotFound(result.error.unwrap_or_else(|| {
            format!("No refund request found for {}", confirmation)
        })));
    }

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InMemoryBackend, RefundBackend};
    use crate::config::Config;
    use crate::refund::{PassType, PaymentMethod, RefundDecision, RefundRequestData, RefundStatus};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lookup_known_request() {
        let backend = Arc::new(InMemoryBackend::new());
        let submitted = backend
            .submit_refund(&RefundRequestData {
                email: "a@b.com".to_string(),
                pass_type: PassType::VipPass,
                amount_paid: 300.0,
                decision: RefundDecision::Full,
                refund_amount: 300.0,
                payment_method: PaymentMethod::Wise,
                zelle_info: None,
                wise_info: None,
                final_refund_amount: 300.0,
                ticket_holder_page_id: None,
            })
            .await
            .unwrap();
        let confirmation = submitted.confirmation_number.unwrap();

        let state = ApiState::new(Config::default(), backend);
        let resp = lookup(State(state), Path(confirmation.clone())).await.unwrap();

        let record = resp.0.request.unwrap();
        assert_eq!(record.confirmation_number, confirmation);
        assert_eq!(record.status, RefundStatus::Pending);
        assert_eq!(record.payment_method, Some(PaymentMethod::Wise));
    }

    #[tokio::test]
    async fn test_lookup_unknown_request() {
        let state = ApiState::new(Config::default(), Arc::new(InMemoryBackend::new()));
        let err = lookup(State(state), Path("RF-MISSING".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lookup_blank_confirmation() {
        let state = ApiState::new(Config::default(), Arc::new(InMemoryBackend::new()));
        let err = lookup(State(state), Path("  ".to_string())).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
