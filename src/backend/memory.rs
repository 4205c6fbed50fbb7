//! In-memory refund backend for local runs and tests

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BackendError, RefundBackend};
use crate::refund::{
    EmailLookupResult, LookupErrorCode, PassHolder, PassType, RefundRequestData, RefundStatus,
    RefundStatusRecord, StatusLookupResult, SubmissionResult,
};

const BACKEND_NAME: &str = "memory";

#[derive(Default)]
struct Ledger {
    pass_holders: HashMap<String, PassHolder>,
    chargebacks: HashSet<String>,
    submitted_emails: HashSet<String>,
    submissions: HashMap<String, RefundStatusRecord>,
}

/// Backend that keeps pass holders and submissions in process memory
#[derive(Default)]
pub struct InMemoryBackend {
    ledger: Mutex<Ledger>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the given pass holders, keyed by lowercased email
    pub fn with_pass_holders(pass_holders: impl IntoIterator<Item = PassHolder>) -> Self {
        let pass_holders = pass_holders
            .into_iter()
            .map(|p| (p.email.to_lowercase(), p))
            .collect();
        Self {
            ledger: Mutex::new(Ledger {
                pass_holders,
                ..Ledger::default()
            }),
        }
    }

    /// A handful of pass holders for trying the wizard locally
    pub fn demo() -> Self {
        let date = |d: u32| NaiveDate::from_ymd_opt(2025, 1, d).unwrap_or_default();
        let holder = |email: &str, name: &str, pass_type, amount_paid, day, page: &str| PassHolder {
            email: email.to_string(),
            name: name.to_string(),
            pass_type,
            amount_paid,
            purchase_date: date(day),
            confirmation_number: None,
            ticket_holder_page_id: Some(page.to_string()),
        };

        let holders = [
            holder("full@example.com", "Robin Full", PassType::FullPass, 249.0, 5, "demo-full"),
            holder("party@example.com", "Sam Party", PassType::PartyPass, 120.0, 9, "demo-party"),
            holder("vip@example.com", "Kim Vip", PassType::VipPass, 450.0, 12, "demo-vip"),
            holder(
                "disputed@example.com",
                "Lee Disputed",
                PassType::WorkshopPass,
                180.0,
                20,
                "demo-disputed",
            ),
        ];

        let mut ledger = Ledger {
            pass_holders: holders
                .into_iter()
                .map(|p| (p.email.clone(), p))
                .collect(),
            ..Ledger::default()
        };
        ledger
            .chargebacks
            .insert("disputed@example.com".to_string());

        Self {
            ledger: Mutex::new(ledger),
        }
    }

    /// Mark an email as disputed; lookups for it are refused
    pub async fn mark_chargeback(&self, email: &str) {
        self.ledger
            .lock()
            .await
            .chargebacks
            .insert(email.to_lowercase());
    }

    /// Submissions recorded so far
    pub async fn submission_count(&self) -> usize {
        self.ledger.lock().await.submissions.len()
    }

    /// Move a submitted request to another status
    pub async fn set_status(&self, confirmation_number: &str, status: RefundStatus) -> bool {
        let mut ledger = self.ledger.lock().await;
        match ledger.submissions.get_mut(confirmation_number) {
            Some(record) => {
                record.status = status;
                if matches!(status, RefundStatus::Completed | RefundStatus::Failed) {
                    record.processed_at = Some(Utc::now());
                }
                true
            }
            None => false,
        }
    }

    fn confirmation_number() -> String {
        let id = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("RF-{}", &id[..8])
    }
}

#[async_trait]
impl RefundBackend for InMemoryBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn validate_email(&self, email: &str) -> Result<EmailLookupResult, BackendError> {
        let key = email.to_lowercase();
        let ledger = self.ledger.lock().await;

        if ledger.chargebacks.contains(&key) {
            return Ok(EmailLookupResult::refused(LookupErrorCode::Chargeback));
        }
        if ledger.submitted_emails.contains(&key) {
            return Ok(EmailLookupResult::refused(LookupErrorCode::AlreadySubmitted));
        }
        Ok(match ledger.pass_holders.get(&key) {
            Some(pass_holder) => EmailLookupResult::found(pass_holder.clone()),
            None => EmailLookupResult::refused(LookupErrorCode::NotFound),
        })
    }

    async fn submit_refund(
        &self,
        request: &RefundRequestData,
    ) -> Result<SubmissionResult, BackendError> {
        let key = request.email.to_lowercase();
        let mut ledger = self.ledger.lock().await;

        if ledger.submitted_emails.contains(&key) {
            return Ok(SubmissionResult {
                success: false,
                confirmation_number: None,
                error: Some(LookupErrorCode::AlreadySubmitted.default_message().to_string()),
                email_sent: None,
            });
        }

        let confirmation_number = Self::confirmation_number();
        ledger.submitted_emails.insert(key);
        ledger.submissions.insert(
            confirmation_number.clone(),
            RefundStatusRecord {
                confirmation_number: confirmation_number.clone(),
                email: request.email.clone(),
                decision: request.decision,
                status: RefundStatus::Pending,
                refund_amount: request.final_refund_amount,
                payment_method: request
                    .decision
                    .requires_payment()
                    .then_some(request.payment_method),
                submitted_at: Some(Utc::now()),
                processed_at: None,
            },
        );

        tracing::info!(%confirmation_number, decision = ?request.decision, "refund request recorded");

        Ok(SubmissionResult {
            success: true,
            confirmation_number: Some(confirmation_number),
            error: None,
            email_sent: Some(false),
        })
    }

    async fn lookup_status(
        &self,
        confirmation_number: &str,
    ) -> Result<StatusLookupResult, BackendError> {
        let ledger = self.ledger.lock().await;
        let key = confirmation_number.trim().to_uppercase();

        Ok(match ledger.submissions.get(&key) {
            Some(record) => StatusLookupResult {
                success: true,
                request: Some(record.clone()),
                error: None,
            },
            None => StatusLookupResult {
                success: false,
                request: None,
                error: Some(format!("No refund request found for {}", key)),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refund::{PaymentMethod, RefundDecision};

    fn holder(email: &str) -> PassHolder {
        PassHolder {
            email: email.to_string(),
            name: "Test Holder".to_string(),
            pass_type: PassType::PartyPass,
            amount_paid: 120.0,
            purchase_date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            confirmation_number: None,
            ticket_holder_page_id: Some("page-1".to_string()),
        }
    }

    fn waive_request(email: &str) -> RefundRequestData {
        RefundRequestData {
            email: email.to_string(),
            pass_type: PassType::PartyPass,
            amount_paid: 120.0,
            decision: RefundDecision::Waive,
            refund_amount: 0.0,
            payment_method: PaymentMethod::Zelle,
            zelle_info: None,
            wise_info: None,
            final_refund_amount: 0.0,
            ticket_holder_page_id: Some("page-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_validate_email_found_and_missing() {
        let backend = InMemoryBackend::with_pass_holders([holder("Party@Example.com")]);

        let found = backend.validate_email("party@example.com").await.unwrap();
        assert!(found.success);
        assert_eq!(found.pass_holder.unwrap().amount_paid, 120.0);

        let missing = backend.validate_email("nobody@example.com").await.unwrap();
        assert!(!missing.success);
        assert_eq!(missing.error, Some(LookupErrorCode::NotFound));
    }

    #[tokio::test]
    async fn test_chargeback_refused() {
        let backend = InMemoryBackend::with_pass_holders([holder("x@example.com")]);
        backend.mark_chargeback("X@example.com").await;

        let result = backend.validate_email("x@example.com").await.unwrap();
        assert_eq!(result.error, Some(LookupErrorCode::Chargeback));
    }

    #[tokio::test]
    async fn test_submit_then_lookup_status() {
        let backend = InMemoryBackend::with_pass_holders([holder("x@example.com")]);

        let result = backend
            .submit_refund(&waive_request("x@example.com"))
            .await
            .unwrap();
        assert!(result.success);
        let confirmation = result.confirmation_number.unwrap();
        assert!(confirmation.starts_with("RF-"));
        assert_eq!(confirmation.len(), 11);

        let status = backend
            .lookup_status(&confirmation.to_lowercase())
            .await
            .unwrap();
        let record = status.request.unwrap();
        assert_eq!(record.status, RefundStatus::Pending);
        assert_eq!(record.decision, RefundDecision::Waive);
        assert!(record.payment_method.is_none());

        assert!(backend.set_status(&confirmation, RefundStatus::Completed).await);
        let status = backend.lookup_status(&confirmation).await.unwrap();
        assert!(status.request.unwrap().processed_at.is_some());
    }

    #[tokio::test]
    async fn test_second_submission_refused() {
        let backend = InMemoryBackend::with_pass_holders([holder("x@example.com")]);
        backend
            .submit_refund(&waive_request("x@example.com"))
            .await
            .unwrap();

        let again = backend
            .submit_refund(&waive_request("x@example.com"))
            .await
            .unwrap();
        assert!(!again.success);
        assert_eq!(backend.submission_count().await, 1);

        let lookup = backend.validate_email("x@example.com").await.unwrap();
        assert_eq!(lookup.error, Some(LookupErrorCode::AlreadySubmitted));
    }

    #[tokio::test]
    async fn test_demo_backend_has_disputed_holder() {
        let backend = InMemoryBackend::demo();
        let result = backend.validate_email("disputed@example.com").await.unwrap();
        assert_eq!(result.error, Some(LookupErrorCode::Chargeback));

        let result = backend.validate_email("full@example.com").await.unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_unknown_confirmation_number() {
        let backend = InMemoryBackend::new();
        let status = backend.lookup_status("RF-NOPE").await.unwrap();
        assert!(!status.success);
        assert!(status.error.unwrap().contains("RF-NOPE"));
    }
}
