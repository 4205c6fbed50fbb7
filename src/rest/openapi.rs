//! OpenAPI specification builder using utoipa.

use axum::Json;
use utoipa::OpenApi;

use crate::refund::{
    EmailLookupResult, LookupErrorCode, PassHolder, PassType, PaymentMethod, RefundDecision,
    RefundRequestData, RefundStatus, RefundStatusRecord, RefundStep, StatusLookupResult,
    SubmissionResult, WiseInfo, ZelleInfo,
};
use crate::rest::dto::{
    DecisionRequest, EmailRequest, HealthResponse, NavigateRequest, NavigateResponse,
    PaymentRequest, SessionSnapshot,
};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the refund desk REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Refund Desk API",
        version = "0.1.0",
        description = "Step-by-step refund requests for festival pass holders.",
        license(name = "MIT")
    ),
    paths(
        // Health endpoints
        crate::rest::routes::health::health,
        // Session endpoints
        crate::rest::routes::sessions::create,
        crate::rest::routes::sessions::get_one,
        crate::rest::routes::sessions::delete,
        crate::rest::routes::sessions::submit_email,
        crate::rest::routes::sessions::confirm_pass_details,
        crate::rest::routes::sessions::set_decision,
        crate::rest::routes::sessions::set_payment,
        crate::rest::routes::sessions::navigate,
        crate::rest::routes::sessions::go_back,
        crate::rest::routes::sessions::reset,
        crate::rest::routes::sessions::submission,
        crate::rest::routes::sessions::submit,
        // Status endpoints
        crate::rest::routes::status::lookup,
    ),
    components(
        schemas(
            // Response types
            HealthResponse,
            SessionSnapshot,
            NavigateResponse,
            SubmissionResult,
            StatusLookupResult,
            RefundStatusRecord,
            EmailLookupResult,
            ErrorResponse,
            // Request types
            EmailRequest,
            DecisionRequest,
            PaymentRequest,
            NavigateRequest,
            // Domain types
            RefundStep,
            PassType,
            PassHolder,
            RefundDecision,
            PaymentMethod,
            ZelleInfo,
            WiseInfo,
            RefundRequestData,
            RefundStatus,
            LookupErrorCode,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Sessions", description = "Refund wizard sessions"),
        (name = "Status", description = "Submitted request status"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

/// Serve the OpenAPI document
pub async fn spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
