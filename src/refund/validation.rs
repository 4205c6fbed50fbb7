//! Step input validation
//!
//! Runs before a transition action is invoked so the workflow never
//! holds invalid input. Error messages are shown to the user as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::types::{PassHolder, PaymentInfo, RefundDecision};

/// Smallest partial refund accepted unless configured otherwise
pub const DEFAULT_MIN_PARTIAL_AMOUNT: f64 = 1.0;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Errors raised by step input validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter your email address")]
    EmptyEmail,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Please enter the amount you'd like refunded")]
    MissingPartialAmount,

    #[error("Please enter a valid amount")]
    InvalidAmount,

    #[error("Partial refund must be at least ${min:.2}")]
    PartialAmountTooLow { min: f64 },

    #[error("Partial refund cannot be more than the ${max:.2} you paid")]
    PartialAmountTooHigh { max: f64 },

    #[error("Please provide an email or phone number for Zelle")]
    MissingZelleContact,

    #[error("'{0}' is not a valid phone number")]
    InvalidPhone(String),

    #[error("Payment method '{0}' needs its matching contact details")]
    PaymentMethodMismatch(String),
}

/// Normalize and check an email address
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let email = input.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::InvalidEmail(input.trim().to_string()));
    }
    Ok(email)
}

/// Check the decision input against the pass that was found.
///
/// Returns the partial amount to record, which is None for anything but
/// a partial refund.
pub fn validate_decision(
    decision: RefundDecision,
    partial_amount: Option<f64>,
    pass_holder: &PassHolder,
    min_partial_amount: f64,
) -> Result<Option<f64>, ValidationError> {
    if decision != RefundDecision::Partial {
        return Ok(None);
    }

    let amount = partial_amount.ok_or(ValidationError::MissingPartialAmount)?;
    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount);
    }
    if amount < min_partial_amount {
        return Err(ValidationError::PartialAmountTooLow {
            min: min_partial_amount,
        });
    }
    if amount > pass_holder.amount_paid {
        return Err(ValidationError::PartialAmountTooHigh {
            max: pass_holder.amount_paid,
        });
    }
    Ok(Some(amount))
}

/// Check payout contact details
pub fn validate_payment_info(info: &PaymentInfo) -> Result<(), ValidationError> {
    match info {
        PaymentInfo::Zelle { zelle } => {
            let email = zelle.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
            let phone = zelle.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

            if email.is_none() && phone.is_none() {
                return Err(ValidationError::MissingZelleContact);
            }
            if let Some(email) = email {
                validate_email(email)?;
            }
            if let Some(phone) = phone {
                validate_phone(phone)?;
            }
            Ok(())
        }
        PaymentInfo::Wise { wise } => validate_email(&wise.email).map(|_| ()),
    }
}

/// Phone numbers need 10 to 15 digits; separators are ignored
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.'));

    if allowed && (10..=15).contains(&digits) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone(phone.to_string()))
    }
}
