//! Ledger error types.

use thiserror::Error;
use uuid::Uuid;

use super::types::SourceKind;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Posting attempted against an accountant-owned wallet.
    #[error("User {owner} holds the accountant role and cannot own a wallet ledger")]
    IneligibleOwner {
        /// The ineligible owner.
        owner: Uuid,
    },

    /// An entry for the same source already exists for this owner.
    ///
    /// Callers retrying a terminal approval treat this as a no-op success;
    /// it is the guard that makes those retries safe.
    #[error("A {source_kind} entry for reference {source_ref} is already posted")]
    DuplicatePosting {
        /// Kind of the originating record.
        source_kind: SourceKind,
        /// Id of the originating record.
        source_ref: Uuid,
    },

    /// Posting amount is negative.
    #[error("Ledger amounts must be non-negative")]
    NegativeAmount,

    /// Wallet owner not found.
    #[error("User {0} not found")]
    OwnerNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::IneligibleOwner { .. } => 422,
            Self::DuplicatePosting { .. } => 409,
            Self::NegativeAmount => 400,
            Self::OwnerNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IneligibleOwner { .. } => "INELIGIBLE_OWNER",
            Self::DuplicatePosting { .. } => "DUPLICATE_POSTING",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::OwnerNotFound(_) => "OWNER_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ineligible_owner_error() {
        let err = LedgerError::IneligibleOwner { owner: Uuid::nil() };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "INELIGIBLE_OWNER");
        assert!(err.to_string().contains("accountant"));
    }

    #[test]
    fn test_duplicate_posting_error() {
        let err = LedgerError::DuplicatePosting {
            source_kind: SourceKind::Expense,
            source_ref: Uuid::nil(),
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_POSTING");
        assert!(err.to_string().contains("expense"));
    }

    #[test]
    fn test_negative_amount_error() {
        let err = LedgerError::NegativeAmount;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "NEGATIVE_AMOUNT");
    }

    #[test]
    fn test_owner_not_found_error() {
        let err = LedgerError::OwnerNotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "OWNER_NOT_FOUND");
    }
}
