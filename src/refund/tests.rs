//! Tests for the refund workflow state machine

use super::*;
use chrono::NaiveDate;

fn pass_holder(amount_paid: f64) -> PassHolder {
    PassHolder {
        email: "a@b.com".to_string(),
        name: "Alex Rivera".to_string(),
        pass_type: PassType::FullPass,
        amount_paid,
        purchase_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        confirmation_number: Some("SQ-1001".to_string()),
        ticket_holder_page_id: Some("page-abc".to_string()),
    }
}

fn zelle_email(email: &str) -> PaymentInfo {
    PaymentInfo::Zelle {
        zelle: ZelleInfo {
            email: Some(email.to_string()),
            phone: None,
        },
    }
}

/// Workflow that has validated the email and confirmed pass details
fn at_decision(amount_paid: f64) -> RefundWorkflow {
    let mut workflow = RefundWorkflow::new();
    workflow.set_email_validated("a@b.com".to_string(), pass_holder(amount_paid));
    workflow.confirm_pass_details();
    workflow
}

// ─── Step Sequencer ─────────────────────────────────────────────────────────

#[test]
fn test_required_steps_per_decision() {
    let base = [
        RefundStep::Email,
        RefundStep::PassDetails,
        RefundStep::Decision,
    ];

    for decision in RefundDecision::all() {
        let steps = required_steps(Some(*decision));
        assert_eq!(&steps[..3], &base);
        assert_eq!(steps.last(), Some(&RefundStep::Review));
        assert_eq!(
            steps.contains(&RefundStep::Contact),
            decision.requires_payment(),
            "contact presence for {:?}",
            decision
        );
    }

    assert_eq!(
        required_steps(None),
        vec![
            RefundStep::Email,
            RefundStep::PassDetails,
            RefundStep::Decision,
            RefundStep::Review,
        ]
    );
}

#[test]
fn test_new_workflow_starts_at_email() {
    let workflow = RefundWorkflow::new();
    assert_eq!(workflow.current_step(), RefundStep::Email);
    assert_eq!(workflow.current_step_index(), 0);
    assert!(workflow.completed_steps().is_empty());
    assert!(!workflow.can_submit());
}

#[test]
fn test_navigation_guard_blocks_skipping_ahead() {
    let workflow = RefundWorkflow::new();

    assert!(workflow.can_navigate_to_step(RefundStep::Email));
    assert!(workflow.can_navigate_to_step(RefundStep::PassDetails));
    assert!(!workflow.can_navigate_to_step(RefundStep::Decision));
    assert!(!workflow.can_navigate_to_step(RefundStep::Review));
    // Not part of the sequence until a payout decision is made
    assert!(!workflow.can_navigate_to_step(RefundStep::Contact));
}

#[test]
fn test_go_to_step_is_silent_noop_when_disallowed() {
    let mut workflow = RefundWorkflow::new();
    let before = workflow.state().clone();

    assert!(!workflow.go_to_step(RefundStep::Review));
    assert_eq!(workflow.state(), &before);
}

#[test]
fn test_completed_steps_can_be_revisited() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Full, None);
    workflow.set_payment_info(zelle_email("a@b.com"));
    assert_eq!(workflow.current_step(), RefundStep::Review);

    assert!(workflow.go_to_step(RefundStep::Email));
    assert_eq!(workflow.current_step(), RefundStep::Email);

    // Completed steps further ahead remain reachable
    assert!(workflow.go_to_step(RefundStep::Contact));
    assert_eq!(workflow.current_step(), RefundStep::Contact);
}

#[test]
fn test_go_back_walks_required_steps() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Waive, None);
    assert_eq!(workflow.current_step(), RefundStep::Review);

    assert!(workflow.go_back());
    assert_eq!(workflow.current_step(), RefundStep::Decision);
    assert!(workflow.go_back());
    assert!(workflow.go_back());
    assert_eq!(workflow.current_step(), RefundStep::Email);
    assert!(!workflow.go_back());
    assert_eq!(workflow.current_step(), RefundStep::Email);
}

#[test]
fn test_go_back_from_review_lands_on_contact_for_payouts() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Full, None);
    workflow.set_payment_info(zelle_email("a@b.com"));

    workflow.go_back();
    assert_eq!(workflow.current_step(), RefundStep::Contact);
}

#[test]
fn test_stale_contact_completion_is_tolerated() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Full, None);
    workflow.set_payment_info(zelle_email("a@b.com"));

    workflow.go_to_step(RefundStep::Decision);
    workflow.set_decision(RefundDecision::Waive, None);

    assert!(workflow.completed_steps().contains(&RefundStep::Contact));
    assert!(!workflow.required_steps().contains(&RefundStep::Contact));
    assert!(!workflow.can_navigate_to_step(RefundStep::Contact));
    assert_eq!(workflow.current_step(), RefundStep::Review);
    assert_eq!(workflow.current_step_index(), 3);
}

// ─── Transition Actions ─────────────────────────────────────────────────────

#[test]
fn test_set_email_validated_advances() {
    let mut workflow = RefundWorkflow::new();
    workflow.set_email_validated("a@b.com".to_string(), pass_holder(200.0));

    assert_eq!(workflow.current_step(), RefundStep::PassDetails);
    assert_eq!(workflow.completed_steps(), &[RefundStep::Email]);
    assert_eq!(workflow.state().email.as_deref(), Some("a@b.com"));
    assert_eq!(workflow.pass_holder().map(|p| p.amount_paid), Some(200.0));
}

#[test]
fn test_completion_is_idempotent() {
    let mut workflow = RefundWorkflow::new();
    workflow.set_email_validated("a@b.com".to_string(), pass_holder(200.0));
    workflow.confirm_pass_details();
    workflow.go_to_step(RefundStep::Email);
    workflow.set_email_validated("a@b.com".to_string(), pass_holder(200.0));

    let email_entries = workflow
        .completed_steps()
        .iter()
        .filter(|s| **s == RefundStep::Email)
        .count();
    assert_eq!(email_entries, 1);
    // Most recent completion is last
    assert_eq!(
        workflow.completed_steps(),
        &[RefundStep::PassDetails, RefundStep::Email]
    );
}

#[test]
fn test_decision_branching() {
    let mut waived = at_decision(150.0);
    waived.set_decision(RefundDecision::Waive, None);
    assert_eq!(waived.current_step(), RefundStep::Review);

    let mut full = at_decision(150.0);
    full.set_decision(RefundDecision::Full, None);
    assert_eq!(full.current_step(), RefundStep::Contact);

    let mut partial = at_decision(150.0);
    partial.set_decision(RefundDecision::Partial, Some(40.0));
    assert_eq!(partial.current_step(), RefundStep::Contact);
}

#[test]
fn test_partial_amount_cleared_for_other_decisions() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Partial, Some(60.0));
    assert_eq!(workflow.state().partial_amount, Some(60.0));

    workflow.go_to_step(RefundStep::Decision);
    workflow.set_decision(RefundDecision::Full, Some(60.0));
    assert_eq!(workflow.state().partial_amount, None);
}

#[test]
fn test_payment_info_replaces_other_method() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Full, None);
    workflow.set_payment_info(zelle_email("a@b.com"));
    assert!(workflow.state().zelle_info.is_some());

    workflow.go_to_step(RefundStep::Contact);
    workflow.set_payment_info(PaymentInfo::Wise {
        wise: WiseInfo {
            email: "intl@b.com".to_string(),
        },
    });

    let state = workflow.state();
    assert_eq!(state.payment_method, Some(PaymentMethod::Wise));
    assert!(state.zelle_info.is_none());
    assert_eq!(state.wise_info.as_ref().map(|w| w.email.as_str()), Some("intl@b.com"));
    assert_eq!(workflow.current_step(), RefundStep::Review);
}

#[test]
fn test_reset_returns_to_initial_state() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Waive, None);
    workflow.reset();

    assert_eq!(workflow.state(), &RefundFormState::default());
}

#[test]
fn test_can_complete_step_requires_pass_holder() {
    let workflow = RefundWorkflow::new();
    assert!(workflow.can_complete_step(RefundStep::Email));
    assert!(!workflow.can_complete_step(RefundStep::PassDetails));
    assert!(!workflow.can_complete_step(RefundStep::Decision));
    assert!(!workflow.can_complete_step(RefundStep::Contact));

    let mut workflow = at_decision(100.0);
    assert!(workflow.can_complete_step(RefundStep::Decision));
    assert!(!workflow.can_complete_step(RefundStep::Contact));

    workflow.set_decision(RefundDecision::Waive, None);
    assert!(!workflow.can_complete_step(RefundStep::Contact));
    assert!(!workflow.can_complete_step(RefundStep::Review));
}

// ─── Refund Calculation ─────────────────────────────────────────────────────

#[test]
fn test_calculated_refund() {
    let mut full = at_decision(150.0);
    full.set_decision(RefundDecision::Full, None);
    assert_eq!(full.calculated_refund(), 150.0);

    let mut partial = at_decision(150.0);
    partial.set_decision(RefundDecision::Partial, Some(60.0));
    assert_eq!(partial.calculated_refund(), 60.0);

    let mut waived = at_decision(150.0);
    waived.set_decision(RefundDecision::Waive, None);
    assert_eq!(waived.calculated_refund(), 0.0);

    let undecided = at_decision(150.0);
    assert_eq!(undecided.calculated_refund(), 0.0);

    assert_eq!(RefundWorkflow::new().calculated_refund(), 0.0);
}

#[test]
fn test_partial_without_amount_refunds_zero() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Partial, None);
    assert_eq!(workflow.calculated_refund(), 0.0);
    assert_eq!(workflow.final_refund(), 0.0);
}

// ─── Submission ─────────────────────────────────────────────────────────────

#[test]
fn test_can_submit_gating() {
    let mut workflow = at_decision(150.0);
    assert!(!workflow.can_submit());

    workflow.set_decision(RefundDecision::Partial, Some(20.0));
    assert!(!workflow.can_submit());

    workflow.set_payment_info(zelle_email("a@b.com"));
    assert!(workflow.can_submit());
}

#[test]
fn test_submission_data_none_when_incomplete() {
    assert!(RefundWorkflow::new().submission_data().is_none());
    assert!(at_decision(150.0).submission_data().is_none());
}

#[test]
fn test_end_to_end_partial_zelle() {
    let mut workflow = RefundWorkflow::new();
    workflow.set_email_validated("a@b.com".to_string(), pass_holder(200.0));
    workflow.confirm_pass_details();
    workflow.set_decision(RefundDecision::Partial, Some(75.0));
    workflow.set_payment_info(zelle_email("a@b.com"));

    let data = workflow.submission_data().expect("submittable");
    assert_eq!(data.email, "a@b.com");
    assert_eq!(data.pass_type, PassType::FullPass);
    assert_eq!(data.amount_paid, 200.0);
    assert_eq!(data.decision, RefundDecision::Partial);
    assert_eq!(data.refund_amount, 75.0);
    assert_eq!(data.final_refund_amount, 75.0);
    assert_eq!(data.payment_method, PaymentMethod::Zelle);
    assert_eq!(
        data.zelle_info,
        Some(ZelleInfo {
            email: Some("a@b.com".to_string()),
            phone: None,
        })
    );
    assert!(data.wise_info.is_none());
    assert_eq!(data.ticket_holder_page_id.as_deref(), Some("page-abc"));

    // Pure derivation
    assert_eq!(workflow.submission_data(), Some(data));
}

#[test]
fn test_waive_submits_without_contact() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Waive, None);

    assert!(workflow.can_submit());
    let data = workflow.submission_data().expect("submittable");
    assert_eq!(data.refund_amount, 0.0);
    assert_eq!(data.final_refund_amount, 0.0);
    assert_eq!(data.payment_method, PaymentMethod::Zelle);
    assert!(data.zelle_info.is_none());
}

#[test]
fn test_submission_payload_wire_format() {
    let mut workflow = at_decision(150.0);
    workflow.set_decision(RefundDecision::Full, None);
    workflow.set_payment_info(PaymentInfo::Wise {
        wise: WiseInfo {
            email: "intl@b.com".to_string(),
        },
    });

    let json = serde_json::to_value(workflow.submission_data().unwrap()).unwrap();
    assert_eq!(json["passType"], "full_pass");
    assert_eq!(json["decision"], "full");
    assert_eq!(json["paymentMethod"], "wise");
    assert_eq!(json["wiseInfo"]["email"], "intl@b.com");
    assert_eq!(json["finalRefundAmount"], 150.0);
    assert!(json.get("zelleInfo").is_none());
}

#[test]
fn test_payment_info_tagged_json() {
    let info: PaymentInfo =
        serde_json::from_str(r#"{"method":"zelle","zelle":{"phone":"5551234567"}}"#).unwrap();
    assert_eq!(info.method(), PaymentMethod::Zelle);

    let info: PaymentInfo =
        serde_json::from_str(r#"{"method":"wise","wise":{"email":"x@y.com"}}"#).unwrap();
    assert_eq!(info.method(), PaymentMethod::Wise);

    let mismatched = serde_json::from_str::<PaymentInfo>(r#"{"method":"wise","zelle":{}}"#);
    assert!(mismatched.is_err());
}
