//! Port expense approval workflow.
//!
//! States: `submitted → {approved, rejected}`, `approved → {finalized,
//! rejected}`. `rejected` and `finalized` are terminal. The wallet debit
//! and the tally record are created only at finalize, by the persistence
//! layer, from the action this module returns.

use chrono::{DateTime, Utc};
use portledger_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::{Capability, Role};
use crate::workflow::error::WorkflowError;

/// Road tax charged per day of validity.
pub const ROAD_TAX_PER_DAY: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Default gate charge for each of the fixed components.
pub const DEFAULT_GATE_CHARGE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Expense status in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Submitted by a supervisor, awaiting review.
    Submitted,
    /// Approved by a manager or admin, awaiting finalization.
    Approved,
    /// Rejected by a reviewer (terminal).
    Rejected,
    /// Finalized by an accountant; wallet debit posted (terminal).
    Finalized,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Finalized => "finalized",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "finalized" => Some(Self::Finalized),
            _ => None,
        }
    }

    /// Returns true if no further transition is defined from this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Finalized)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Additive charge components of a port expense.
///
/// The total is always recomputed from these components; it is never
/// accepted from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseCharges {
    /// CISF security charge.
    pub cisf: Decimal,
    /// Port trust charge.
    pub kpt: Decimal,
    /// Customs charge.
    pub customs: Decimal,
    /// Days of road tax to charge.
    pub road_tax_days: u32,
    /// Explicit road tax amount, overriding the per-day derivation.
    pub road_tax_override: Option<Decimal>,
    /// Ad-hoc charges outside the fixed components.
    pub other: Decimal,
}

impl Default for ExpenseCharges {
    fn default() -> Self {
        Self {
            cisf: DEFAULT_GATE_CHARGE,
            kpt: DEFAULT_GATE_CHARGE,
            customs: DEFAULT_GATE_CHARGE,
            road_tax_days: 0,
            road_tax_override: None,
            other: Decimal::ZERO,
        }
    }
}

impl ExpenseCharges {
    /// Returns the road tax amount: the override if set, otherwise
    /// `road_tax_days × ROAD_TAX_PER_DAY`.
    #[must_use]
    pub fn road_tax(&self) -> Decimal {
        self.road_tax_override
            .unwrap_or_else(|| ROAD_TAX_PER_DAY * Decimal::from(self.road_tax_days))
    }

    /// Computes the expense total from its components.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cisf + self.kpt + self.customs + self.road_tax() + self.other
    }

    /// Validates that every component is non-negative.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NegativeAmount` naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let fields: [(&'static str, Decimal); 5] = [
            ("cisf", self.cisf),
            ("kpt", self.kpt),
            ("customs", self.customs),
            ("road_tax", self.road_tax()),
            ("other", self.other),
        ];
        for (field, value) in fields {
            if value < Decimal::ZERO {
                return Err(WorkflowError::NegativeAmount { field });
            }
        }
        Ok(())
    }
}

/// Expense workflow action with audit data.
#[derive(Debug, Clone)]
pub enum ExpenseAction {
    /// Approve a submitted expense.
    Approve {
        /// The new status (`Approved`).
        new_status: ExpenseStatus,
        /// The reviewer.
        reviewed_by: UserId,
        /// When the review happened.
        reviewed_at: DateTime<Utc>,
        /// Optional reviewer comments.
        comments: Option<String>,
    },
    /// Reject a submitted or approved expense.
    Reject {
        /// The new status (`Rejected`).
        new_status: ExpenseStatus,
        /// The reviewer.
        reviewed_by: UserId,
        /// When the review happened.
        reviewed_at: DateTime<Utc>,
        /// Optional reviewer comments.
        comments: Option<String>,
    },
    /// Finalize an approved expense.
    Finalize {
        /// The new status (`Finalized`).
        new_status: ExpenseStatus,
        /// The finalizing accountant.
        finalized_by: UserId,
        /// When finalization happened.
        finalized_at: DateTime<Utc>,
    },
}

impl ExpenseAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Finalize { new_status, .. } => *new_status,
        }
    }
}

/// Stateless service validating expense workflow transitions.
pub struct ExpenseWorkflow;

impl ExpenseWorkflow {
    /// Validates a new submission.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless the submitter is
    ///   supervisor-or-above
    /// * `WorkflowError::NegativeAmount` for invalid charge components
    pub fn submit(
        submitter_role: Role,
        charges: &ExpenseCharges,
    ) -> Result<ExpenseStatus, WorkflowError> {
        Self::require(submitter_role, Capability::SubmitExpense)?;
        charges.validate()?;
        Ok(ExpenseStatus::Submitted)
    }

    /// Approves a submitted expense. No ledger effect.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless manager or admin
    /// * `WorkflowError::InvalidTransition` unless the expense is submitted
    pub fn approve(
        current: ExpenseStatus,
        reviewer_role: Role,
        reviewed_by: UserId,
        comments: Option<String>,
    ) -> Result<ExpenseAction, WorkflowError> {
        Self::require(reviewer_role, Capability::ReviewExpense)?;
        match current {
            ExpenseStatus::Submitted => Ok(ExpenseAction::Approve {
                new_status: ExpenseStatus::Approved,
                reviewed_by,
                reviewed_at: Utc::now(),
                comments,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current.as_str(),
                to: ExpenseStatus::Approved.as_str(),
            }),
        }
    }

    /// Rejects a submitted or approved expense. No ledger effect; terminal.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless manager or admin
    /// * `WorkflowError::InvalidTransition` from rejected or finalized
    pub fn reject(
        current: ExpenseStatus,
        reviewer_role: Role,
        reviewed_by: UserId,
        comments: Option<String>,
    ) -> Result<ExpenseAction, WorkflowError> {
        Self::require(reviewer_role, Capability::ReviewExpense)?;
        match current {
            ExpenseStatus::Submitted | ExpenseStatus::Approved => Ok(ExpenseAction::Reject {
                new_status: ExpenseStatus::Rejected,
                reviewed_by,
                reviewed_at: Utc::now(),
                comments,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current.as_str(),
                to: ExpenseStatus::Rejected.as_str(),
            }),
        }
    }

    /// Finalizes an approved expense.
    ///
    /// The caller must then, in the same transaction, post exactly one
    /// wallet debit of the expense total and create one tally record.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless the actor is an accountant
    /// * `WorkflowError::InvalidTransition` unless the expense is approved
    pub fn finalize(
        current: ExpenseStatus,
        finalizer_role: Role,
        finalized_by: UserId,
    ) -> Result<ExpenseAction, WorkflowError> {
        Self::require(finalizer_role, Capability::FinalizeExpense)?;
        match current {
            ExpenseStatus::Approved => Ok(ExpenseAction::Finalize {
                new_status: ExpenseStatus::Finalized,
                finalized_by,
                finalized_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current.as_str(),
                to: ExpenseStatus::Finalized.as_str(),
            }),
        }
    }

    /// Checks if a status transition is valid, regardless of role.
    ///
    /// Valid transitions:
    /// - Submitted → Approved (approve)
    /// - Submitted → Rejected (reject)
    /// - Approved → Finalized (finalize)
    /// - Approved → Rejected (reject)
    #[must_use]
    pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (
                ExpenseStatus::Submitted,
                ExpenseStatus::Approved | ExpenseStatus::Rejected
            ) | (
                ExpenseStatus::Approved,
                ExpenseStatus::Finalized | ExpenseStatus::Rejected
            )
        )
    }

    fn require(role: Role, capability: Capability) -> Result<(), WorkflowError> {
        if role.can(capability) {
            Ok(())
        } else {
            Err(WorkflowError::InsufficientRole {
                role: role.as_str().to_string(),
                action: capability.as_str(),
            })
        }
    }
}

/// Builds the deterministic tally voucher number for a finalized expense.
///
/// The sequence number comes from the expense's monotonic `expense_no`,
/// so retries always produce the same voucher number.
#[must_use]
pub fn tally_voucher_number(expense_no: i64) -> String {
    format!("EXP-{expense_no:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn charges(days: u32) -> ExpenseCharges {
        ExpenseCharges {
            road_tax_days: days,
            ..ExpenseCharges::default()
        }
    }

    #[test]
    fn test_default_charges_total() {
        // Three fixed components at 50 each, no road tax, no other.
        assert_eq!(charges(0).total(), dec!(150));
    }

    #[test]
    fn test_road_tax_derivation() {
        assert_eq!(charges(1).road_tax(), dec!(50));
        assert_eq!(charges(3).road_tax(), dec!(150));
        assert_eq!(charges(0).road_tax(), dec!(0));
    }

    #[test]
    fn test_road_tax_override_wins() {
        let mut c = charges(4);
        c.road_tax_override = Some(dec!(75));
        assert_eq!(c.road_tax(), dec!(75));
        assert_eq!(c.total(), dec!(225));
    }

    #[test]
    fn test_reference_scenario_total() {
        // cisf=50, kpt=50, customs=50, 1 road tax day, other=0 → 200.
        let c = charges(1);
        assert_eq!(c.total(), dec!(200));
    }

    #[test]
    fn test_negative_component_rejected() {
        let mut c = charges(0);
        c.customs = dec!(-10);
        let result = c.validate();
        assert!(
            matches!(result, Err(WorkflowError::NegativeAmount { field: "customs" })),
            "{result:?}"
        );
    }

    #[test]
    fn test_submit_by_supervisor() {
        let status = ExpenseWorkflow::submit(Role::Supervisor, &charges(0)).unwrap();
        assert_eq!(status, ExpenseStatus::Submitted);
    }

    #[test]
    fn test_submit_by_accountant_fails() {
        let result = ExpenseWorkflow::submit(Role::Accountant, &charges(0));
        assert!(matches!(result, Err(WorkflowError::InsufficientRole { .. })));
    }

    #[test]
    fn test_approve_from_submitted() {
        let action = ExpenseWorkflow::approve(
            ExpenseStatus::Submitted,
            Role::Manager,
            UserId::new(),
            Some("ok".to_string()),
        )
        .unwrap();
        assert_eq!(action.new_status(), ExpenseStatus::Approved);
    }

    #[test]
    fn test_approve_requires_manager_or_admin() {
        let result = ExpenseWorkflow::approve(
            ExpenseStatus::Submitted,
            Role::Supervisor,
            UserId::new(),
            None,
        );
        assert!(matches!(result, Err(WorkflowError::InsufficientRole { .. })));
    }

    #[test]
    fn test_approve_from_approved_fails() {
        let result =
            ExpenseWorkflow::approve(ExpenseStatus::Approved, Role::Manager, UserId::new(), None);
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn test_reject_from_submitted_and_approved() {
        for from in [ExpenseStatus::Submitted, ExpenseStatus::Approved] {
            let action =
                ExpenseWorkflow::reject(from, Role::Admin, UserId::new(), None).unwrap();
            assert_eq!(action.new_status(), ExpenseStatus::Rejected);
        }
    }

    #[test]
    fn test_reject_from_terminal_fails() {
        for from in [ExpenseStatus::Rejected, ExpenseStatus::Finalized] {
            let result = ExpenseWorkflow::reject(from, Role::Admin, UserId::new(), None);
            assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
        }
    }

    #[test]
    fn test_finalize_from_approved_by_accountant() {
        let action =
            ExpenseWorkflow::finalize(ExpenseStatus::Approved, Role::Accountant, UserId::new())
                .unwrap();
        assert_eq!(action.new_status(), ExpenseStatus::Finalized);
    }

    #[test]
    fn test_finalize_requires_accountant() {
        for role in [Role::Admin, Role::Manager, Role::Supervisor, Role::Office] {
            let result = ExpenseWorkflow::finalize(ExpenseStatus::Approved, role, UserId::new());
            assert!(
                matches!(result, Err(WorkflowError::InsufficientRole { .. })),
                "{role}"
            );
        }
    }

    #[test]
    fn test_finalize_from_submitted_fails() {
        let result =
            ExpenseWorkflow::finalize(ExpenseStatus::Submitted, Role::Accountant, UserId::new());
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ExpenseStatus::Submitted.is_terminal());
        assert!(!ExpenseStatus::Approved.is_terminal());
        assert!(ExpenseStatus::Rejected.is_terminal());
        assert!(ExpenseStatus::Finalized.is_terminal());
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Submitted,
            ExpenseStatus::Approved
        ));
        assert!(ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Approved,
            ExpenseStatus::Finalized
        ));
        assert!(!ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Submitted,
            ExpenseStatus::Finalized
        ));
        assert!(!ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Rejected,
            ExpenseStatus::Submitted
        ));
        assert!(!ExpenseWorkflow::is_valid_transition(
            ExpenseStatus::Finalized,
            ExpenseStatus::Approved
        ));
    }

    #[test]
    fn test_tally_voucher_number_is_deterministic() {
        assert_eq!(tally_voucher_number(42), "EXP-000042");
        assert_eq!(tally_voucher_number(42), tally_voucher_number(42));
        assert_eq!(tally_voucher_number(1_234_567), "EXP-1234567");
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            ExpenseStatus::Submitted,
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected,
            ExpenseStatus::Finalized,
        ] {
            assert_eq!(ExpenseStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ExpenseStatus::parse("draft"), None);
    }
}
