//! Ledger domain types for wallet postings.

use chrono::{DateTime, Utc};
use portledger_shared::types::{LedgerEntryId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::access::Role;

/// Direction of a wallet ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    /// Increases the owner's balance.
    Credit,
    /// Decreases the owner's balance.
    Debit,
}

impl EntryDirection {
    /// Returns the string representation of the direction.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Parses a direction from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credit" => Some(Self::Credit),
            "debit" => Some(Self::Debit),
            _ => None,
        }
    }
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of record a ledger entry originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Finalized port expense.
    Expense,
    /// Logged digital voucher.
    Voucher,
    /// Wallet top-up by an accountant.
    Topup,
    /// Manual balance adjustment.
    Adjustment,
}

impl SourceKind {
    /// Returns the string representation of the source kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Voucher => "voucher",
            Self::Topup => "topup",
            Self::Adjustment => "adjustment",
        }
    }

    /// Parses a source kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "expense" => Some(Self::Expense),
            "voucher" => Some(Self::Voucher),
            "topup" => Some(Self::Topup),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for posting one wallet ledger entry.
///
/// `balance_after` is never part of the input; it is computed from the
/// owner's latest prior entry at posting time.
#[derive(Debug, Clone)]
pub struct PostingInput {
    /// The wallet owner.
    pub owner: UserId,
    /// The owner's role (accountants are ineligible).
    pub owner_role: Role,
    /// Credit or debit.
    pub direction: EntryDirection,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Kind of the originating record.
    pub source_kind: SourceKind,
    /// Id of the originating record, if any.
    pub source_ref: Option<Uuid>,
    /// The user who authorized the posting.
    pub posted_by: UserId,
    /// Optional human-readable description.
    pub description: Option<String>,
}

/// A validated posting with its computed running balance.
///
/// Produced by [`crate::ledger::LedgerService::prepare_posting`]; the
/// persistence layer appends it verbatim and never recomputes the balance.
#[derive(Debug, Clone)]
pub struct PreparedPosting {
    /// Id for the new entry.
    pub id: LedgerEntryId,
    /// Owner balance after applying this entry.
    pub balance_after: Decimal,
    /// Posting timestamp.
    pub posted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_roundtrip() {
        assert_eq!(EntryDirection::parse("credit"), Some(EntryDirection::Credit));
        assert_eq!(EntryDirection::parse("DEBIT"), Some(EntryDirection::Debit));
        assert_eq!(EntryDirection::parse("transfer"), None);
        assert_eq!(EntryDirection::Credit.as_str(), "credit");
        assert_eq!(EntryDirection::Debit.as_str(), "debit");
    }

    #[test]
    fn test_source_kind_roundtrip() {
        for kind in [
            SourceKind::Expense,
            SourceKind::Voucher,
            SourceKind::Topup,
            SourceKind::Adjustment,
        ] {
            assert_eq!(SourceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SourceKind::parse("refund"), None);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(format!("{}", EntryDirection::Debit), "debit");
        assert_eq!(format!("{}", SourceKind::Topup), "topup");
    }
}
