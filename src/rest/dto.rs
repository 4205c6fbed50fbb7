//! Data Transfer Objects for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::refund::validation::ValidationError;
use crate::refund::{
    PassHolder, PaymentInfo, PaymentMethod, RefundDecision, RefundStep, WiseInfo, ZelleInfo,
};
use crate::rest::store::Session;

// =============================================================================
// Health
// =============================================================================

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Which refund backend answers lookups and submissions
    pub backend: String,
    /// Wizard sessions currently held in memory
    pub active_sessions: usize,
}

// =============================================================================
// Session DTOs
// =============================================================================

/// Everything a client needs to render the wizard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub current_step: RefundStep,
    pub current_step_index: usize,
    pub required_steps: Vec<RefundStep>,
    pub completed_steps: Vec<RefundStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_holder: Option<PassHolder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<RefundDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zelle_info: Option<ZelleInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wise_info: Option<WiseInfo>,
    pub calculated_refund: f64,
    pub final_refund_amount: f64,
    pub can_submit: bool,
    pub busy: bool,
}

impl SessionSnapshot {
    pub fn new(session_id: Uuid, session: &Session) -> Self {
        let workflow = &session.workflow;
        let state = workflow.state();
        Self {
            session_id,
            current_step: state.current_step,
            current_step_index: workflow.current_step_index(),
            required_steps: workflow.required_steps(),
            completed_steps: state.completed_steps.clone(),
            email: state.email.clone(),
            pass_holder: state.pass_holder.clone(),
            decision: state.decision,
            partial_amount: state.partial_amount,
            payment_method: state.payment_method,
            zelle_info: state.zelle_info.clone(),
            wise_info: state.wise_info.clone(),
            calculated_refund: workflow.calculated_refund(),
            final_refund_amount: workflow.final_refund(),
            can_submit: workflow.can_submit(),
            busy: session.is_busy(),
        }
    }
}

/// Email entered on the first step
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

/// Refund decision
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub decision: RefundDecision,
    /// Required for partial refunds, ignored otherwise
    #[serde(default)]
    pub partial_amount: Option<f64>,
}

/// Payout contact, `{"method": "zelle", "zelle": {...}}` or
/// `{"method": "wise", "wise": {...}}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    #[serde(default)]
    pub zelle: Option<ZelleInfo>,
    #[serde(default)]
    pub wise: Option<WiseInfo>,
}

impl TryFrom<PaymentRequest> for PaymentInfo {
    type Error = ValidationError;

    /// Exactly the contact matching `method` must be present
    fn try_from(req: PaymentRequest) -> Result<Self, Self::Error> {
        match (req.method, req.zelle, req.wise) {
            (PaymentMethod::Zelle, Some(zelle), None) => Ok(PaymentInfo::Zelle { zelle }),
            (PaymentMethod::Wise, None, Some(wise)) => Ok(PaymentInfo::Wise { wise }),
            (PaymentMethod::Zelle, ..) => Err(ValidationError::PaymentMethodMismatch(
                "zelle".to_string(),
            )),
            (PaymentMethod::Wise, ..) => {
                Err(ValidationError::PaymentMethodMismatch("wise".to_string()))
            }
        }
    }
}

/// Jump to a step
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub step: RefundStep,
}

/// Result of a jump; disallowed jumps leave the session untouched
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NavigateResponse {
    pub moved: bool,
    pub session: SessionSnapshot,
}
