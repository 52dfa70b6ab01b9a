//! Digital voucher approval workflow.
//!
//! States: `submitted → {approved, declined}`, `approved → {logged,
//! declined}`. `declined` and `logged` are terminal. The wallet debit and
//! the tally record are created only at log time, with the caller-supplied
//! external voucher number.

use chrono::{DateTime, Utc};
use portledger_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::{Capability, Role};
use crate::workflow::error::WorkflowError;

/// Voucher status in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Submitted with a supporting document, awaiting approval.
    Submitted,
    /// Approved by an admin, awaiting bookkeeping.
    Approved,
    /// Declined by an approver (terminal).
    Declined,
    /// Logged to external bookkeeping; wallet debit posted (terminal).
    Logged,
}

impl VoucherStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Logged => "logged",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "declined" => Some(Self::Declined),
            "logged" => Some(Self::Logged),
            _ => None,
        }
    }

    /// Returns true if no further transition is defined from this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Logged)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Voucher workflow action with audit data.
#[derive(Debug, Clone)]
pub enum VoucherAction {
    /// Approve a submitted voucher.
    Approve {
        /// The new status (`Approved`).
        new_status: VoucherStatus,
        /// The approving admin.
        approved_by: UserId,
        /// When approval happened.
        approved_at: DateTime<Utc>,
        /// Optional approver comments.
        comments: Option<String>,
    },
    /// Decline a submitted or approved voucher.
    Decline {
        /// The new status (`Declined`).
        new_status: VoucherStatus,
        /// The declining approver.
        declined_by: UserId,
        /// When the decline happened.
        declined_at: DateTime<Utc>,
        /// Optional approver comments.
        comments: Option<String>,
    },
    /// Log an approved voucher to external bookkeeping.
    Log {
        /// The new status (`Logged`).
        new_status: VoucherStatus,
        /// The logging accountant.
        logged_by: UserId,
        /// When logging happened.
        logged_at: DateTime<Utc>,
        /// The external voucher number supplied by the caller.
        voucher_number: String,
    },
}

impl VoucherAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> VoucherStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Decline { new_status, .. }
            | Self::Log { new_status, .. } => *new_status,
        }
    }
}

/// Stateless service validating voucher workflow transitions.
pub struct VoucherWorkflow;

impl VoucherWorkflow {
    /// Validates a new submission.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless supervisor-or-above
    /// * `WorkflowError::NegativeAmount` for a negative amount
    /// * `WorkflowError::DocumentRequired` without a supporting document
    pub fn submit(
        submitter_role: Role,
        amount: Decimal,
        document_ref: &str,
    ) -> Result<VoucherStatus, WorkflowError> {
        Self::require(submitter_role, Capability::SubmitVoucher)?;
        if amount < Decimal::ZERO {
            return Err(WorkflowError::NegativeAmount { field: "amount" });
        }
        if document_ref.trim().is_empty() {
            return Err(WorkflowError::DocumentRequired);
        }
        Ok(VoucherStatus::Submitted)
    }

    /// Approves a submitted voucher. No ledger effect.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless the actor is an admin
    /// * `WorkflowError::InvalidTransition` unless the voucher is submitted
    pub fn approve(
        current: VoucherStatus,
        approver_role: Role,
        approved_by: UserId,
        comments: Option<String>,
    ) -> Result<VoucherAction, WorkflowError> {
        Self::require(approver_role, Capability::ApproveVoucher)?;
        match current {
            VoucherStatus::Submitted => Ok(VoucherAction::Approve {
                new_status: VoucherStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
                comments,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current.as_str(),
                to: VoucherStatus::Approved.as_str(),
            }),
        }
    }

    /// Declines a submitted or approved voucher. Terminal, no ledger effect.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless manager or admin
    /// * `WorkflowError::InvalidTransition` from declined or logged
    pub fn decline(
        current: VoucherStatus,
        approver_role: Role,
        declined_by: UserId,
        comments: Option<String>,
    ) -> Result<VoucherAction, WorkflowError> {
        Self::require(approver_role, Capability::DeclineVoucher)?;
        match current {
            VoucherStatus::Submitted | VoucherStatus::Approved => Ok(VoucherAction::Decline {
                new_status: VoucherStatus::Declined,
                declined_by,
                declined_at: Utc::now(),
                comments,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current.as_str(),
                to: VoucherStatus::Declined.as_str(),
            }),
        }
    }

    /// Logs an approved voucher to external bookkeeping.
    ///
    /// The caller must then, in the same transaction, post exactly one
    /// wallet debit of the voucher amount and create one tally record
    /// carrying `voucher_number`.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InsufficientRole` unless the actor is an accountant
    /// * `WorkflowError::InvalidTransition` unless the voucher is approved
    /// * `WorkflowError::VoucherNumberRequired` for an empty number
    pub fn log(
        current: VoucherStatus,
        logger_role: Role,
        logged_by: UserId,
        voucher_number: String,
    ) -> Result<VoucherAction, WorkflowError> {
        Self::require(logger_role, Capability::LogVoucher)?;
        if voucher_number.trim().is_empty() {
            return Err(WorkflowError::VoucherNumberRequired);
        }
        match current {
            VoucherStatus::Approved => Ok(VoucherAction::Log {
                new_status: VoucherStatus::Logged,
                logged_by,
                logged_at: Utc::now(),
                voucher_number,
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current.as_str(),
                to: VoucherStatus::Logged.as_str(),
            }),
        }
    }

    /// Checks if a status transition is valid, regardless of role.
    ///
    /// Valid transitions:
    /// - Submitted → Approved (approve)
    /// - Submitted → Declined (decline)
    /// - Approved → Logged (log)
    /// - Approved → Declined (decline)
    #[must_use]
    pub fn is_valid_transition(from: VoucherStatus, to: VoucherStatus) -> bool {
        matches!(
            (from, to),
            (
                VoucherStatus::Submitted,
                VoucherStatus::Approved | VoucherStatus::Declined
            ) | (
                VoucherStatus::Approved,
                VoucherStatus::Logged | VoucherStatus::Declined
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_submit_by_supervisor() {
        let status =
            VoucherWorkflow::submit(Role::Supervisor, dec!(320), "vouchers/bill-17.jpg").unwrap();
        assert_eq!(status, VoucherStatus::Submitted);
    }

    #[test]
    fn test_submit_without_document_fails() {
        let result = VoucherWorkflow::submit(Role::Supervisor, dec!(320), "  ");
        assert!(matches!(result, Err(WorkflowError::DocumentRequired)));
    }

    #[test]
    fn test_submit_negative_amount_fails() {
        let result = VoucherWorkflow::submit(Role::Supervisor, dec!(-5), "bill.jpg");
        assert!(matches!(
            result,
            Err(WorkflowError::NegativeAmount { field: "amount" })
        ));
    }

    #[test]
    fn test_submit_by_office_fails() {
        let result = VoucherWorkflow::submit(Role::Office, dec!(100), "bill.jpg");
        assert!(matches!(result, Err(WorkflowError::InsufficientRole { .. })));
    }

    #[test]
    fn test_approve_is_admin_only() {
        let action = VoucherWorkflow::approve(
            VoucherStatus::Submitted,
            Role::Admin,
            UserId::new(),
            None,
        )
        .unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Approved);

        for role in [Role::Manager, Role::Supervisor, Role::Accountant, Role::Office] {
            let result =
                VoucherWorkflow::approve(VoucherStatus::Submitted, role, UserId::new(), None);
            assert!(
                matches!(result, Err(WorkflowError::InsufficientRole { .. })),
                "{role}"
            );
        }
    }

    #[test]
    fn test_approve_from_approved_fails() {
        let result =
            VoucherWorkflow::approve(VoucherStatus::Approved, Role::Admin, UserId::new(), None);
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn test_decline_from_submitted_and_approved() {
        for from in [VoucherStatus::Submitted, VoucherStatus::Approved] {
            let action =
                VoucherWorkflow::decline(from, Role::Manager, UserId::new(), None).unwrap();
            assert_eq!(action.new_status(), VoucherStatus::Declined);
        }
    }

    #[test]
    fn test_decline_from_terminal_fails() {
        for from in [VoucherStatus::Declined, VoucherStatus::Logged] {
            let result = VoucherWorkflow::decline(from, Role::Admin, UserId::new(), None);
            assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
        }
    }

    #[test]
    fn test_log_from_approved_by_accountant() {
        let action = VoucherWorkflow::log(
            VoucherStatus::Approved,
            Role::Accountant,
            UserId::new(),
            "TLY-2031".to_string(),
        )
        .unwrap();
        match action {
            VoucherAction::Log {
                new_status,
                voucher_number,
                ..
            } => {
                assert_eq!(new_status, VoucherStatus::Logged);
                assert_eq!(voucher_number, "TLY-2031");
            }
            other => panic!("expected Log action, got {other:?}"),
        }
    }

    #[test]
    fn test_log_requires_accountant() {
        for role in [Role::Admin, Role::Manager, Role::Supervisor, Role::Office] {
            let result = VoucherWorkflow::log(
                VoucherStatus::Approved,
                role,
                UserId::new(),
                "TLY-1".to_string(),
            );
            assert!(
                matches!(result, Err(WorkflowError::InsufficientRole { .. })),
                "{role}"
            );
        }
    }

    #[test]
    fn test_log_requires_voucher_number() {
        let result = VoucherWorkflow::log(
            VoucherStatus::Approved,
            Role::Accountant,
            UserId::new(),
            "   ".to_string(),
        );
        assert!(matches!(result, Err(WorkflowError::VoucherNumberRequired)));
    }

    #[test]
    fn test_log_after_decline_fails() {
        // A declined voucher can never reach the ledger.
        let result = VoucherWorkflow::log(
            VoucherStatus::Declined,
            Role::Accountant,
            UserId::new(),
            "TLY-9".to_string(),
        );
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!VoucherStatus::Submitted.is_terminal());
        assert!(!VoucherStatus::Approved.is_terminal());
        assert!(VoucherStatus::Declined.is_terminal());
        assert!(VoucherStatus::Logged.is_terminal());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            VoucherStatus::Submitted,
            VoucherStatus::Approved,
            VoucherStatus::Declined,
            VoucherStatus::Logged,
        ] {
            assert_eq!(VoucherStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VoucherStatus::parse("pending"), None);
    }
}
