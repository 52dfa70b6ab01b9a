//! Workflow error types for expense and voucher lifecycles.

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: &'static str,
        /// The attempted target status.
        to: &'static str,
    },

    /// The actor's role is not in the capability table for this action.
    #[error("Role {role} is not permitted to {action}")]
    InsufficientRole {
        /// The actor's role.
        role: String,
        /// The gated action.
        action: &'static str,
    },

    /// A charge component or amount is negative.
    #[error("Field {field} must be non-negative")]
    NegativeAmount {
        /// The offending field.
        field: &'static str,
    },

    /// Voucher submitted without a supporting document reference.
    #[error("A supporting document reference is required")]
    DocumentRequired,

    /// Voucher logged without an external voucher number.
    #[error("An external voucher number is required")]
    VoucherNumberRequired,

    /// Expense not found.
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    /// Voucher not found.
    #[error("Voucher {0} not found")]
    VoucherNotFound(Uuid),

    /// Ledger posting failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::NegativeAmount { .. }
            | Self::DocumentRequired
            | Self::VoucherNumberRequired => 400,

            Self::InsufficientRole { .. } => 403,

            Self::ExpenseNotFound(_) | Self::VoucherNotFound(_) => 404,

            Self::Ledger(e) => e.status_code(),

            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::DocumentRequired => "DOCUMENT_REQUIRED",
            Self::VoucherNumberRequired => "VOUCHER_NUMBER_REQUIRED",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SourceKind;

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: "rejected",
            to: "finalized",
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("rejected"));
        assert!(err.to_string().contains("finalized"));
    }

    #[test]
    fn test_insufficient_role_error() {
        let err = WorkflowError::InsufficientRole {
            role: "supervisor".to_string(),
            action: "finalize_expense",
        };
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "INSUFFICIENT_ROLE");
    }

    #[test]
    fn test_document_required_error() {
        assert_eq!(WorkflowError::DocumentRequired.status_code(), 400);
        assert_eq!(
            WorkflowError::DocumentRequired.error_code(),
            "DOCUMENT_REQUIRED"
        );
    }

    #[test]
    fn test_not_found_errors() {
        assert_eq!(WorkflowError::ExpenseNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(WorkflowError::VoucherNotFound(Uuid::nil()).status_code(), 404);
    }

    #[test]
    fn test_ledger_error_passthrough() {
        let err = WorkflowError::Ledger(LedgerError::DuplicatePosting {
            source_kind: SourceKind::Voucher,
            source_ref: Uuid::nil(),
        });
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_POSTING");
    }
}
