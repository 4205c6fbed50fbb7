//! Type definitions for the refund request workflow
//!
//! These are the wire contracts shared with the browser UI and the
//! refund backend. Field names serialize as camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Steps in the refund request wizard, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum RefundStep {
    /// Enter and validate the purchase email
    Email,
    /// Review the pass that was found for the email
    PassDetails,
    /// Choose full refund, partial refund or waive
    Decision,
    /// Payment contact (only when money is sent back)
    Contact,
    /// Final review before submission
    Review,
}

impl RefundStep {
    pub fn label(&self) -> &'static str {
        match self {
            RefundStep::Email => "Email",
            RefundStep::PassDetails => "Pass Details",
            RefundStep::Decision => "Your Decision",
            RefundStep::Contact => "Payment Info",
            RefundStep::Review => "Review",
        }
    }
}

/// Kinds of festival pass that can be refunded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PassType {
    FullPass,
    PartyPass,
    WorkshopPass,
    VipPass,
    ArtistPass,
}

impl PassType {
    pub fn label(&self) -> &'static str {
        match self {
            PassType::FullPass => "Full Pass",
            PassType::PartyPass => "Party Pass",
            PassType::WorkshopPass => "Workshop Pass",
            PassType::VipPass => "VIP Pass",
            PassType::ArtistPass => "Artist Pass",
        }
    }
}

/// What the pass holder wants done with their money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RefundDecision {
    Full,
    Partial,
    Waive,
}

impl RefundDecision {
    pub fn all() -> &'static [RefundDecision] {
        &[
            RefundDecision::Full,
            RefundDecision::Partial,
            RefundDecision::Waive,
        ]
    }

    /// Whether a payout has to be sent, and so payment contact collected
    pub fn requires_payment(self) -> bool {
        matches!(self, RefundDecision::Full | RefundDecision::Partial)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefundDecision::Full => "Full refund",
            RefundDecision::Partial => "Partial refund",
            RefundDecision::Waive => "Waive refund",
        }
    }
}

/// Payout transfer methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Domestic transfers
    #[default]
    Zelle,
    /// International transfers
    Wise,
}

/// Zelle contact; at least one of email/phone is required by validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
pub struct ZelleInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
pub struct WiseInfo {
    pub email: String,
}

/// Payout details. Exactly one of the two contacts exists, matching `method`.
///
/// Serializes as `{"method": "zelle", "zelle": {...}}` or
/// `{"method": "wise", "wise": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentInfo {
    Zelle { zelle: ZelleInfo },
    Wise { wise: WiseInfo },
}

impl PaymentInfo {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentInfo::Zelle { .. } => PaymentMethod::Zelle,
            PaymentInfo::Wise { .. } => PaymentMethod::Wise,
        }
    }
}

/// A person who bought a pass, as returned by the email lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassHolder {
    pub email: String,
    pub name: String,
    pub pass_type: PassType,
    /// Ceiling for any refund
    pub amount_paid: f64,
    pub purchase_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub confirmation_number: Option<String>,
    /// Opaque reference into the backend's ticket holder records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub ticket_holder_page_id: Option<String>,
}

/// Payload sent to the backend when the request is submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequestData {
    pub email: String,
    pub pass_type: PassType,
    pub amount_paid: f64,
    pub decision: RefundDecision,
    pub refund_amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub zelle_info: Option<ZelleInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub wise_info: Option<WiseInfo>,
    pub final_refund_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub ticket_holder_page_id: Option<String>,
}

// ─── Collaborator Contracts ──────────────────────────────────────────────────

/// Reasons the email lookup can refuse a pass holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LookupErrorCode {
    NotFound,
    Chargeback,
    AlreadySubmitted,
    ServerError,
}

impl LookupErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupErrorCode::NotFound => "not_found",
            LookupErrorCode::Chargeback => "chargeback",
            LookupErrorCode::AlreadySubmitted => "already_submitted",
            LookupErrorCode::ServerError => "server_error",
        }
    }

    /// Message shown when the backend sends none
    pub fn default_message(&self) -> &'static str {
        match self {
            LookupErrorCode::NotFound => "We couldn't find a pass purchased with that email",
            LookupErrorCode::Chargeback => {
                "This purchase was disputed with the card issuer and cannot be refunded here"
            }
            LookupErrorCode::AlreadySubmitted => {
                "A refund request has already been submitted for this pass"
            }
            LookupErrorCode::ServerError => "Something went wrong, please try again later",
        }
    }
}

/// Response of the email validation collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailLookupResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub pass_holder: Option<PassHolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<LookupErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error_message: Option<String>,
}

impl EmailLookupResult {
    pub fn found(pass_holder: PassHolder) -> Self {
        Self {
            success: true,
            pass_holder: Some(pass_holder),
            error: None,
            error_message: None,
        }
    }

    pub fn refused(code: LookupErrorCode) -> Self {
        Self {
            success: false,
            pass_holder: None,
            error: Some(code),
            error_message: Some(code.default_message().to_string()),
        }
    }
}

/// Response of the submission collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub confirmation_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email_sent: Option<bool>,
}

/// Processing state of a submitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A submitted request as reported by the status lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundStatusRecord {
    pub confirmation_number: String,
    pub email: String,
    pub decision: RefundDecision,
    pub status: RefundStatus,
    pub refund_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Response of the status lookup collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusLookupResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub request: Option<RefundStatusRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

/// Format a currency amount for display (two decimals)
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}
