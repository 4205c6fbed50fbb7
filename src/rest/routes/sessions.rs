//! Refund wizard session endpoints.
//!
//! Each session owns one [`RefundWorkflow`](crate::refund::RefundWorkflow).
//! Step input is validated here before the matching transition action runs.
//! While the email lookup or submission for a session is awaiting the
//! backend, the session is busy and every other mutation is refused.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::refund::validation::{validate_decision, validate_email, validate_payment_info};
use crate::refund::{
    LookupErrorCode, PaymentInfo, RefundRequestData, RefundStep, SubmissionResult,
};
use crate::rest::dto::{
    DecisionRequest, EmailRequest, NavigateRequest, NavigateResponse, PaymentRequest,
    SessionSnapshot,
};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;
use crate::rest::store::{Session, SessionStore};

fn live_session<'a>(
    store: &'a mut SessionStore,
    id: Uuid,
    state: &ApiState,
) -> Result<&'a mut Session, ApiError> {
    store
        .live_mut(id, state.config.session_ttl(), Utc::now())
        .ok_or_else(|| ApiError::NotFound(format!("Refund session '{}' not found", id)))
}

fn ensure_idle(session: &Session) -> Result<(), ApiError> {
    if session.is_busy() {
        return Err(ApiError::SessionBusy(
            "Still waiting on the previous request, please try again in a moment".to_string(),
        ));
    }
    Ok(())
}

fn ensure_step(session: &Session, step: RefundStep) -> Result<(), ApiError> {
    if !session.workflow.can_complete_step(step) {
        return Err(ApiError::InvalidStep(format!(
            "The '{}' step isn't available yet",
            step.label()
        )));
    }
    Ok(())
}

/// Releases a session's busy mark when a handler is dropped while it awaits
/// the backend (client disconnect, timeout). The normal path clears the mark
/// itself under the store lock and then disarms the guard.
struct BusyGuard {
    sessions: Arc<RwLock<SessionStore>>,
    id: Uuid,
    armed: bool,
}

impl BusyGuard {
    fn new(state: &ApiState, id: Uuid) -> Self {
        Self {
            sessions: Arc::clone(&state.sessions),
            id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let id = self.id;
        tracing::debug!(%id, "backend call abandoned, releasing session");

        if let Ok(mut store) = self.sessions.try_write() {
            if let Some(session) = store.get_mut(id) {
                session.clear_busy();
            }
            return;
        }

        let sessions = Arc::clone(&self.sessions);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Some(session) = sessions.write().await.get_mut(id) {
                        session.clear_busy();
                    }
                });
            }
            Err(_) => warn!(%id, "no runtime to release busy session"),
        }
    }
}

/// Run `f` against an idle session and return the resulting snapshot
async fn with_idle_session<F>(state: &ApiState, id: Uuid, f: F) -> Result<SessionSnapshot, ApiError>
where
    F: FnOnce(&mut Session) -> Result<(), ApiError>,
{
    let mut store = state.sessions.write().await;
    let session = live_session(&mut store, id, state)?;
    ensure_idle(session)?;
    f(session)?;
    Ok(SessionSnapshot::new(id, session))
}

/// Start a new refund request
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions",
    tag = "Sessions",
    responses(
        (status = 201, description = "Session created", body = SessionSnapshot)
    )
)]
pub async fn create(State(state): State<ApiState>) -> (StatusCode, Json<SessionSnapshot>) {
    let mut store = state.sessions.write().await;

    let purged = store.purge_expired(state.config.session_ttl(), Utc::now());
    if purged > 0 {
        tracing::debug!(purged, "expired refund sessions purged");
    }

    let (id, session) = store.create(Utc::now());
    tracing::debug!(%id, "refund session created");
    (StatusCode::CREATED, Json(SessionSnapshot::new(id, session)))
}

/// Get the current state of a session
#[utoipa::path(
    get,
    path = "/api/v1/refunds/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session state", body = SessionSnapshot),
        (status = 404, description = "Session not found or expired", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let mut store = state.sessions.write().await;
    let session = live_session(&mut store, id, &state)?;
    Ok(Json(SessionSnapshot::new(id, session)))
}

/// Abandon a session
#[utoipa::path(
    delete,
    path = "/api/v1/refunds/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "A backend call is in flight", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.sessions.write().await;
    ensure_idle(live_session(&mut store, id, &state)?)?;
    store.remove(id);
    Ok(StatusCode::NO_CONTENT)
}

/// Validate the purchase email and load the pass holder
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/email",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Pass holder found, now on pass details", body = SessionSnapshot),
        (status = 400, description = "Malformed email", body = ErrorResponse),
        (status = 409, description = "A backend call is in flight", body = ErrorResponse),
        (status = 422, description = "Lookup refused (not_found, chargeback, already_submitted, server_error)", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn submit_email(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let email = validate_email(&req.email)?;

    let guard = {
        let mut store = state.sessions.write().await;
        let session = live_session(&mut store, id, &state)?;
        ensure_idle(session)?;
        session.mark_busy(Utc::now());
        BusyGuard::new(&state, id)
    };

    let result = state.backend.validate_email(&email).await;

    let mut store = state.sessions.write().await;
    guard.disarm();
    let session = live_session(&mut store, id, &state)?;
    session.clear_busy();

    let lookup = result.map_err(|e| {
        warn!(
            backend = e.backend_name(),
            transient = e.is_transient(),
            error = %e,
            "email lookup failed"
        );
        ApiError::from(e)
    })?;

    if !lookup.success {
        let code = lookup.error.unwrap_or(LookupErrorCode::ServerError);
        let message = lookup
            .error_message
            .unwrap_or_else(|| code.default_message().to_string());
        info!(code = code.as_str(), "email lookup refused");
        return Err(ApiError::LookupRejected { code, message });
    }

    let pass_holder = lookup.pass_holder.ok_or_else(|| {
        ApiError::Upstream("Email lookup succeeded without a pass holder".to_string())
    })?;

    // Answers given for another pass holder don't carry over
    if session
        .workflow
        .pass_holder()
        .is_some_and(|current| *current != pass_holder)
    {
        info!(%id, "different pass holder found, starting the request over");
        session.workflow.reset();
    }

    session.workflow.set_email_validated(email, pass_holder);
    Ok(Json(SessionSnapshot::new(id, session)))
}

/// Confirm the pass details shown to the user
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/pass-details",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Now on the decision step", body = SessionSnapshot),
        (status = 409, description = "Step not reachable or session busy", body = ErrorResponse)
    )
)]
pub async fn confirm_pass_details(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    with_idle_session(&state, id, |session| {
        ensure_step(session, RefundStep::PassDetails)?;
        session.workflow.confirm_pass_details();
        Ok(())
    })
    .await
    .map(Json)
}

/// Record the refund decision
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/decision",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Now on contact (payouts) or review (waive)", body = SessionSnapshot),
        (status = 400, description = "Partial amount out of range", body = ErrorResponse),
        (status = 409, description = "Step not reachable or session busy", body = ErrorResponse)
    )
)]
pub async fn set_decision(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let min_partial_amount = state.config.refunds.min_partial_amount;

    with_idle_session(&state, id, |session| {
        ensure_step(session, RefundStep::Decision)?;
        let pass_holder = session.workflow.pass_holder().ok_or_else(|| {
            ApiError::InvalidStep("No pass has been found for this session yet".to_string())
        })?;
        let partial_amount =
            validate_decision(req.decision, req.partial_amount, pass_holder, min_partial_amount)?;
        session.workflow.set_decision(req.decision, partial_amount);
        Ok(())
    })
    .await
    .map(Json)
}

/// Record payout contact details
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/payment",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Now on review", body = SessionSnapshot),
        (status = 400, description = "Missing or malformed contact", body = ErrorResponse),
        (status = 409, description = "Step not reachable or session busy", body = ErrorResponse)
    )
)]
pub async fn set_payment(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let info = PaymentInfo::try_from(req)?;
    validate_payment_info(&info)?;

    with_idle_session(&state, id, |session| {
        ensure_step(session, RefundStep::Contact)?;
        session.workflow.set_payment_info(info);
        Ok(())
    })
    .await
    .map(Json)
}

/// Jump to a step; disallowed jumps are reported, not rejected
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/navigate",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Navigation outcome", body = NavigateResponse),
        (status = 409, description = "A backend call is in flight", body = ErrorResponse)
    )
)]
pub async fn navigate(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, ApiError> {
    let mut moved = false;
    let session = with_idle_session(&state, id, |session| {
        moved = session.workflow.go_to_step(req.step);
        Ok(())
    })
    .await?;

    Ok(Json(NavigateResponse { moved, session }))
}

/// Step back once
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/back",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session state", body = SessionSnapshot),
        (status = 409, description = "A backend call is in flight", body = ErrorResponse)
    )
)]
pub async fn go_back(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    with_idle_session(&state, id, |session| {
        session.workflow.go_back();
        Ok(())
    })
    .await
    .map(Json)
}

/// Start over within the same session
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/reset",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session back on the email step", body = SessionSnapshot),
        (status = 409, description = "A backend call is in flight", body = ErrorResponse)
    )
)]
pub async fn reset(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    with_idle_session(&state, id, |session| {
        session.workflow.reset();
        Ok(())
    })
    .await
    .map(Json)
}

/// Preview the payload that would be submitted
#[utoipa::path(
    get,
    path = "/api/v1/refunds/sessions/{id}/submission",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Submission payload", body = RefundRequestData),
        (status = 409, description = "Pass holder or decision missing", body = ErrorResponse)
    )
)]
pub async fn submission(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RefundRequestData>, ApiError> {
    let mut store = state.sessions.write().await;
    let session = live_session(&mut store, id, &state)?;
    session
        .workflow
        .submission_data()
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotSubmittable("Pass details and a decision are required first".to_string())
        })
}

/// Submit the request to the backend. The session is discarded on success
/// and left untouched on failure so the user can retry.
#[utoipa::path(
    post,
    path = "/api/v1/refunds/sessions/{id}/submit",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Request accepted", body = SubmissionResult),
        (status = 409, description = "Not ready to submit or session busy", body = ErrorResponse),
        (status = 422, description = "Backend declined the request", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionResult>, ApiError> {
    let (request, guard) = {
        let mut store = state.sessions.write().await;
        let session = live_session(&mut store, id, &state)?;
        ensure_idle(session)?;
        if !session.workflow.can_submit() {
            return Err(ApiError::NotSubmittable(
                "Please complete every step before submitting".to_string(),
            ));
        }
        let (Some(pass_holder), Some(request)) =
            (session.workflow.pass_holder(), session.workflow.submission_data())
        else {
            return Err(ApiError::NotSubmittable(
                "Pass details and a decision are required first".to_string(),
            ));
        };

        // The refund may never exceed what the current pass holder paid
        validate_decision(
            request.decision,
            session.workflow.state().partial_amount,
            pass_holder,
            state.config.refunds.min_partial_amount,
        )?;

        session.mark_busy(Utc::now());
        (request, BusyGuard::new(&state, id))
    };

    let result = state.backend.submit_refund(&request).await;

    let mut store = state.sessions.write().await;
    guard.disarm();
    let session = live_session(&mut store, id, &state)?;
    session.clear_busy();

    let outcome = result.map_err(|e| {
        warn!(
            backend = e.backend_name(),
            transient = e.is_transient(),
            error = %e,
            "refund submission failed"
        );
        ApiError::from(e)
    })?;

    if !outcome.success {
        let message = outcome
            .error
            .unwrap_or_else(|| "The refund request was not accepted".to_string());
        warn!(%message, "refund submission declined");
        return Err(ApiError::SubmissionFailed(message));
    }

    store.remove(id);
    info!(
        confirmation = outcome.confirmation_number.as_deref().unwrap_or_default(),
        pass = request.pass_type.label(),
        decision = ?request.decision,
        refund = request.final_refund_amount,
        "refund request submitted"
    );
    Ok(Json(outcome))
}
