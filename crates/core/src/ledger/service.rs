//! Ledger service for posting validation and balance arithmetic.
//!
//! This service contains pure business logic with no database dependencies.
//! The persistence layer reads the owner's latest entry (under a row lock)
//! and the duplicate flag, then appends exactly what this service prepares.

use chrono::Utc;
use portledger_shared::types::LedgerEntryId;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryDirection, PostingInput, PreparedPosting};
use crate::access::Role;

/// Ledger service for posting validation and balance resolution.
pub struct LedgerService;

impl LedgerService {
    /// Validates a posting and computes its running balance.
    ///
    /// # Arguments
    ///
    /// * `input` - The posting to validate
    /// * `prior_balance` - `balance_after` of the owner's most recent entry,
    ///   or `None` if the owner has no entries yet
    /// * `duplicate_exists` - Whether an entry with the same
    ///   (`source_kind`, `source_ref`) already exists for this owner
    ///
    /// # Errors
    ///
    /// * `LedgerError::IneligibleOwner` if the owner is an accountant
    /// * `LedgerError::NegativeAmount` if the amount is below zero
    /// * `LedgerError::DuplicatePosting` if the source is already posted
    pub fn prepare_posting(
        input: &PostingInput,
        prior_balance: Option<Decimal>,
        duplicate_exists: bool,
    ) -> Result<PreparedPosting, LedgerError> {
        if input.owner_role == Role::Accountant {
            return Err(LedgerError::IneligibleOwner {
                owner: input.owner.into_inner(),
            });
        }

        if input.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }

        if duplicate_exists {
            if let Some(source_ref) = input.source_ref {
                return Err(LedgerError::DuplicatePosting {
                    source_kind: input.source_kind,
                    source_ref,
                });
            }
        }

        let balance_after = Self::apply(
            prior_balance.unwrap_or(Decimal::ZERO),
            input.direction,
            input.amount,
        );

        Ok(PreparedPosting {
            id: LedgerEntryId::new(),
            balance_after,
            posted_at: Utc::now(),
        })
    }

    /// Applies one entry to a balance.
    #[must_use]
    pub fn apply(balance: Decimal, direction: EntryDirection, amount: Decimal) -> Decimal {
        match direction {
            EntryDirection::Credit => balance + amount,
            EntryDirection::Debit => balance - amount,
        }
    }

    /// Resolves the balance to report for an owner.
    ///
    /// Accountants have no wallet and always read zero, without any
    /// ledger lookup. Everyone else reads the latest entry's balance,
    /// or zero for an empty ledger.
    #[must_use]
    pub fn balance_for(owner_role: Role, latest_balance: Option<Decimal>) -> Decimal {
        if owner_role == Role::Accountant {
            return Decimal::ZERO;
        }
        latest_balance.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::SourceKind;
    use portledger_shared::types::UserId;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn make_input(
        owner_role: Role,
        direction: EntryDirection,
        amount: Decimal,
        source_ref: Option<Uuid>,
    ) -> PostingInput {
        PostingInput {
            owner: UserId::new(),
            owner_role,
            direction,
            amount,
            source_kind: SourceKind::Expense,
            source_ref,
            posted_by: UserId::new(),
            description: None,
        }
    }

    #[test]
    fn test_first_posting_starts_from_zero() {
        let input = make_input(
            Role::Supervisor,
            EntryDirection::Credit,
            dec!(500),
            Some(Uuid::new_v4()),
        );
        let prepared = LedgerService::prepare_posting(&input, None, false).unwrap();
        assert_eq!(prepared.balance_after, dec!(500));
    }

    #[test]
    fn test_debit_reduces_prior_balance() {
        let input = make_input(
            Role::Supervisor,
            EntryDirection::Debit,
            dec!(200),
            Some(Uuid::new_v4()),
        );
        let prepared = LedgerService::prepare_posting(&input, Some(dec!(500)), false).unwrap();
        assert_eq!(prepared.balance_after, dec!(300));
    }

    #[test]
    fn test_balance_may_go_negative() {
        let input = make_input(
            Role::Supervisor,
            EntryDirection::Debit,
            dec!(200),
            Some(Uuid::new_v4()),
        );
        let prepared = LedgerService::prepare_posting(&input, Some(dec!(50)), false).unwrap();
        assert_eq!(prepared.balance_after, dec!(-150));
    }

    #[test]
    fn test_accountant_owner_rejected() {
        let input = make_input(
            Role::Accountant,
            EntryDirection::Credit,
            dec!(100),
            None,
        );
        let result = LedgerService::prepare_posting(&input, None, false);
        assert!(matches!(result, Err(LedgerError::IneligibleOwner { .. })));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let input = make_input(
            Role::Supervisor,
            EntryDirection::Credit,
            dec!(-1),
            None,
        );
        let result = LedgerService::prepare_posting(&input, None, false);
        assert!(matches!(result, Err(LedgerError::NegativeAmount)));
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let source_ref = Uuid::new_v4();
        let input = make_input(
            Role::Supervisor,
            EntryDirection::Debit,
            dec!(200),
            Some(source_ref),
        );
        let result = LedgerService::prepare_posting(&input, Some(dec!(500)), true);
        match result {
            Err(LedgerError::DuplicatePosting {
                source_kind,
                source_ref: reported,
            }) => {
                assert_eq!(source_kind, SourceKind::Expense);
                assert_eq!(reported, source_ref);
            }
            other => panic!("expected DuplicatePosting, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_flag_ignored_without_source_ref() {
        // Adjustments without a reference cannot collide.
        let input = make_input(Role::Supervisor, EntryDirection::Credit, dec!(10), None);
        let result = LedgerService::prepare_posting(&input, Some(dec!(0)), true);
        assert!(result.is_ok());
    }

    #[test]
    fn test_balance_for_accountant_is_always_zero() {
        assert_eq!(
            LedgerService::balance_for(Role::Accountant, Some(dec!(999))),
            Decimal::ZERO
        );
        assert_eq!(
            LedgerService::balance_for(Role::Accountant, None),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_balance_for_empty_ledger_is_zero() {
        assert_eq!(
            LedgerService::balance_for(Role::Supervisor, None),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_balance_for_reads_latest_entry() {
        assert_eq!(
            LedgerService::balance_for(Role::Supervisor, Some(dec!(123.45))),
            dec!(123.45)
        );
    }
}
