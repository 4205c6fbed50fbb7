//! Refund request wizard state machine
//!
//! Sequences email validation, pass confirmation, the refund decision,
//! payment contact and review. The contact step only exists when money is
//! sent back. No I/O happens here: callers run the email lookup and the
//! submission and feed results in through the transition actions.

use serde::Serialize;

pub mod types;
pub mod validation;

pub use types::*;

#[cfg(test)]
mod tests;

/// Accumulated wizard input
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefundFormState {
    pub current_step: RefundStep,
    /// Most recent completion last, no duplicates
    pub completed_steps: Vec<RefundStep>,
    pub email: Option<String>,
    pub pass_holder: Option<PassHolder>,
    pub decision: Option<RefundDecision>,
    /// Only set while `decision` is partial
    pub partial_amount: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub zelle_info: Option<ZelleInfo>,
    pub wise_info: Option<WiseInfo>,
}

impl Default for RefundFormState {
    fn default() -> Self {
        Self {
            current_step: RefundStep::Email,
            completed_steps: Vec::new(),
            email: None,
            pass_holder: None,
            decision: None,
            partial_amount: None,
            payment_method: None,
            zelle_info: None,
            wise_info: None,
        }
    }
}

/// Steps the user has to go through for a given decision
pub fn required_steps(decision: Option<RefundDecision>) -> Vec<RefundStep> {
    let mut steps = vec![
        RefundStep::Email,
        RefundStep::PassDetails,
        RefundStep::Decision,
    ];
    if decision.is_some_and(RefundDecision::requires_payment) {
        steps.push(RefundStep::Contact);
    }
    steps.push(RefundStep::Review);
    steps
}

/// One refund request session
#[derive(Debug, Clone, Default)]
pub struct RefundWorkflow {
    state: RefundFormState,
}

impl RefundWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RefundFormState {
        &self.state
    }

    pub fn current_step(&self) -> RefundStep {
        self.state.current_step
    }

    pub fn completed_steps(&self) -> &[RefundStep] {
        &self.state.completed_steps
    }

    pub fn pass_holder(&self) -> Option<&PassHolder> {
        self.state.pass_holder.as_ref()
    }

    pub fn decision(&self) -> Option<RefundDecision> {
        self.state.decision
    }

    pub fn required_steps(&self) -> Vec<RefundStep> {
        required_steps(self.state.decision)
    }

    /// Position of the current step within the required steps
    pub fn current_step_index(&self) -> usize {
        self.required_steps()
            .iter()
            .position(|s| *s == self.state.current_step)
            .unwrap_or(0)
    }

    /// Completed steps may always be revisited; otherwise only the step
    /// right after the current one is reachable.
    pub fn can_navigate_to_step(&self, step: RefundStep) -> bool {
        let steps = self.required_steps();
        let Some(target) = steps.iter().position(|s| *s == step) else {
            return false;
        };
        if self.state.completed_steps.contains(&step) {
            return true;
        }
        target <= self.current_step_index() + 1
    }

    /// Whether the inputs a step's transition action depends on are present
    pub fn can_complete_step(&self, step: RefundStep) -> bool {
        match step {
            RefundStep::Email => true,
            RefundStep::PassDetails | RefundStep::Decision => {
                self.state.pass_holder.is_some() && self.can_navigate_to_step(step)
            }
            RefundStep::Contact => {
                self.state.pass_holder.is_some()
                    && self.state.decision.is_some()
                    && self.can_navigate_to_step(step)
            }
            // Review has no transition action; submission is gated by can_submit
            RefundStep::Review => false,
        }
    }

    /// Jump to a step. Returns false (and does nothing) when not allowed.
    pub fn go_to_step(&mut self, step: RefundStep) -> bool {
        if !self.can_navigate_to_step(step) {
            tracing::debug!(?step, current = ?self.state.current_step, "navigation rejected");
            return false;
        }
        self.state.current_step = step;
        true
    }

    /// Step back once. Returns false when already on the first step.
    pub fn go_back(&mut self) -> bool {
        let index = self.current_step_index();
        if index == 0 {
            return false;
        }
        self.state.current_step = self.required_steps()[index - 1];
        true
    }

    pub fn set_email_validated(&mut self, email: String, pass_holder: PassHolder) {
        tracing::debug!(pass_type = ?pass_holder.pass_type, "email validated");
        self.state.email = Some(email);
        self.state.pass_holder = Some(pass_holder);
        self.complete(RefundStep::Email, RefundStep::PassDetails);
    }

    pub fn confirm_pass_details(&mut self) {
        self.complete(RefundStep::PassDetails, RefundStep::Decision);
    }

    /// Record the decision. The partial amount is kept only for partial
    /// refunds and is expected to be validated already.
    pub fn set_decision(&mut self, decision: RefundDecision, partial_amount: Option<f64>) {
        tracing::debug!(?decision, ?partial_amount, "decision recorded");
        self.state.decision = Some(decision);
        self.state.partial_amount = match decision {
            RefundDecision::Partial => partial_amount,
            _ => None,
        };

        let next = if decision.requires_payment() {
            RefundStep::Contact
        } else {
            RefundStep::Review
        };
        self.complete(RefundStep::Decision, next);
    }

    pub fn set_payment_info(&mut self, info: PaymentInfo) {
        self.state.payment_method = Some(info.method());
        match info {
            PaymentInfo::Zelle { zelle } => {
                self.state.zelle_info = Some(zelle);
                self.state.wise_info = None;
            }
            PaymentInfo::Wise { wise } => {
                self.state.wise_info = Some(wise);
                self.state.zelle_info = None;
            }
        }
        self.complete(RefundStep::Contact, RefundStep::Review);
    }

    pub fn reset(&mut self) {
        self.state = RefundFormState::default();
    }

    /// Refund owed for the current input
    pub fn calculated_refund(&self) -> f64 {
        let Some(pass_holder) = &self.state.pass_holder else {
            return 0.0;
        };
        match self.state.decision {
            Some(RefundDecision::Full) => pass_holder.amount_paid,
            Some(RefundDecision::Partial) => self.state.partial_amount.unwrap_or(0.0),
            Some(RefundDecision::Waive) | None => 0.0,
        }
    }

    /// No deductions apply after the calculated refund
    pub fn final_refund(&self) -> f64 {
        self.calculated_refund()
    }

    pub fn can_submit(&self) -> bool {
        let Some(decision) = self.state.decision else {
            return false;
        };
        if self.state.pass_holder.is_none() {
            return false;
        }
        if decision.requires_payment() {
            return self.state.zelle_info.is_some() || self.state.wise_info.is_some();
        }
        true
    }

    /// Payload for the backend, or None while the pass holder or decision
    /// is still missing.
    pub fn submission_data(&self) -> Option<RefundRequestData> {
        let pass_holder = self.state.pass_holder.as_ref()?;
        let decision = self.state.decision?;

        Some(RefundRequestData {
            email: self
                .state
                .email
                .clone()
                .unwrap_or_else(|| pass_holder.email.clone()),
            pass_type: pass_holder.pass_type,
            amount_paid: pass_holder.amount_paid,
            decision,
            refund_amount: self.calculated_refund(),
            payment_method: self.state.payment_method.unwrap_or_default(),
            zelle_info: self.state.zelle_info.clone(),
            wise_info: self.state.wise_info.clone(),
            final_refund_amount: self.final_refund(),
            ticket_holder_page_id: pass_holder.ticket_holder_page_id.clone(),
        })
    }

    fn complete(&mut self, step: RefundStep, next: RefundStep) {
        self.state.completed_steps.retain(|s| *s != step);
        self.state.completed_steps.push(step);
        self.state.current_step = next;
    }
}
