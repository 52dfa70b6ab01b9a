//! Equipment usage error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while managing equipment usage records.
#[derive(Debug, Error)]
pub enum EquipmentError {
    /// A tonnes-contract record was closed without an explicit quantity.
    #[error("Quantity is required for tonnes contract type")]
    MissingQuantity,

    /// The usage record is not currently running.
    #[error("Usage record {0} is not currently running")]
    NotRunning(Uuid),

    /// End time is not after the start time.
    #[error("End time must be after the start time")]
    InvalidInterval,

    /// A master-data reference does not exist.
    #[error("Unknown {kind} reference {id}")]
    UnknownReference {
        /// The referenced table.
        kind: &'static str,
        /// The dangling id.
        id: Uuid,
    },

    /// Usage record not found.
    #[error("Usage record {0} not found")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl EquipmentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingQuantity | Self::NotRunning(_) | Self::InvalidInterval => 400,
            Self::UnknownReference { .. } | Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingQuantity => "MISSING_QUANTITY",
            Self::NotRunning(_) => "NOT_RUNNING",
            Self::InvalidInterval => "INVALID_INTERVAL",
            Self::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_quantity_error() {
        let err = EquipmentError::MissingQuantity;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "MISSING_QUANTITY");
    }

    #[test]
    fn test_unknown_reference_error() {
        let err = EquipmentError::UnknownReference {
            kind: "party",
            id: Uuid::nil(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "UNKNOWN_REFERENCE");
        assert!(err.to_string().contains("party"));
    }

    #[test]
    fn test_not_running_error() {
        let err = EquipmentError::NotRunning(Uuid::nil());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "NOT_RUNNING");
    }
}
