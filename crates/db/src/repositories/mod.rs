//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Workflow repositories run each transition and its
//! conditional ledger posting in a single database transaction.

pub mod audit;
pub mod equipment;
pub mod expense;
pub mod ledger;
pub mod rate;
pub mod tally;
pub mod topup;
pub mod user;
pub mod voucher;

#[cfg(test)]
mod workflow_integration_tests;

pub use audit::{AuditError, AuditRepository};
pub use equipment::{EndUsageInput, EquipmentRepository, StartUsageInput, UsageFilter};
pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseRepository};
pub use ledger::{LedgerEntryFilter, LedgerRepository};
pub use rate::{CreateRateRuleInput, RateError, RateFilter, RateRepository};
pub use tally::{CreateTallyEntryInput, TallyError, TallyFilter, TallyRepository};
pub use topup::{CreateTopUpInput, TopUpRepository};
pub use user::{UserError, UserRepository};
pub use voucher::{BulkLogItem, CreateVoucherInput, VoucherFilter, VoucherRepository};

use uuid::Uuid;

/// Result of a bulk workflow operation.
///
/// Items are processed independently; a failure on one item never rolls
/// back the others.
#[derive(Debug, Clone)]
pub struct BulkReviewResult {
    /// Per-item outcomes, in input order.
    pub results: Vec<BulkReviewItem>,
    /// Number of successful transitions.
    pub success_count: usize,
    /// Number of failed transitions.
    pub failure_count: usize,
}

impl BulkReviewResult {
    /// Builds a result from per-item outcomes.
    #[must_use]
    pub fn from_items(results: Vec<BulkReviewItem>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        let failure_count = results.len() - success_count;
        Self {
            results,
            success_count,
            failure_count,
        }
    }
}

/// Outcome for a single item in a bulk workflow operation.
#[derive(Debug, Clone)]
pub struct BulkReviewItem {
    /// The record id.
    pub id: Uuid,
    /// Whether the transition succeeded.
    pub success: bool,
    /// Error message if it failed.
    pub error: Option<String>,
}

impl BulkReviewItem {
    /// Successful outcome.
    #[must_use]
    pub fn ok(id: Uuid) -> Self {
        Self {
            id,
            success: true,
            error: None,
        }
    }

    /// Failed outcome carrying the error message.
    #[must_use]
    pub fn failed(id: Uuid, error: impl std::fmt::Display) -> Self {
        Self {
            id,
            success: false,
            error: Some(error.to_string()),
        }
    }
}
