//! Per-user wallet ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Posting inputs and prepared entries
//! - Running-balance arithmetic
//! - Owner eligibility and idempotency rules
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{EntryDirection, PostingInput, PreparedPosting, SourceKind};
