//! Property tests for ledger posting arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::LedgerService;
use super::types::{EntryDirection, PostingInput, SourceKind};
use crate::access::Role;
use portledger_shared::types::UserId;

/// Strategy for generating non-negative amounts with 2 decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating a posting direction.
fn direction_strategy() -> impl Strategy<Value = EntryDirection> {
    prop_oneof![
        Just(EntryDirection::Credit),
        Just(EntryDirection::Debit),
    ]
}

/// Strategy for generating a sequence of postings.
fn postings_strategy(max_len: usize) -> impl Strategy<Value = Vec<(EntryDirection, Decimal)>> {
    prop::collection::vec((direction_strategy(), amount_strategy()), 1..=max_len)
}

fn make_input(direction: EntryDirection, amount: Decimal) -> PostingInput {
    PostingInput {
        owner: UserId::new(),
        owner_role: Role::Supervisor,
        direction,
        amount,
        source_kind: SourceKind::Adjustment,
        source_ref: Some(Uuid::new_v4()),
        posted_by: UserId::new(),
        description: None,
    }
}

proptest! {
    // ========================================================================
    // Balance correctness: after any sequence of postings the balance
    // equals the sum of credits minus the sum of debits.
    // ========================================================================
    #[test]
    fn prop_final_balance_equals_credits_minus_debits(
        postings in postings_strategy(50)
    ) {
        let mut balance: Option<Decimal> = None;
        for (direction, amount) in &postings {
            let input = make_input(*direction, *amount);
            let prepared = LedgerService::prepare_posting(&input, balance, false).unwrap();
            balance = Some(prepared.balance_after);
        }

        let expected: Decimal = postings
            .iter()
            .map(|(direction, amount)| match direction {
                EntryDirection::Credit => *amount,
                EntryDirection::Debit => -*amount,
            })
            .sum();

        prop_assert_eq!(balance.unwrap(), expected);
    }

    // ========================================================================
    // Chain consistency: every balance_after differs from its predecessor
    // by exactly the posted amount, in the posted direction.
    // ========================================================================
    #[test]
    fn prop_balance_chain_is_consistent(
        postings in postings_strategy(50)
    ) {
        let mut prior = Decimal::ZERO;
        let mut has_prior = false;
        for (direction, amount) in &postings {
            let input = make_input(*direction, *amount);
            let prior_balance = has_prior.then_some(prior);
            let prepared = LedgerService::prepare_posting(&input, prior_balance, false).unwrap();

            let expected = LedgerService::apply(prior, *direction, *amount);
            prop_assert_eq!(prepared.balance_after, expected);

            prior = prepared.balance_after;
            has_prior = true;
        }
    }

    // ========================================================================
    // Accountant exclusion holds for every direction and amount.
    // ========================================================================
    #[test]
    fn prop_accountant_never_posts(
        direction in direction_strategy(),
        amount in amount_strategy()
    ) {
        let mut input = make_input(direction, amount);
        input.owner_role = Role::Accountant;
        let result = LedgerService::prepare_posting(&input, None, false);
        let is_ineligible_owner =
            matches!(result, Err(super::error::LedgerError::IneligibleOwner { .. }));
        prop_assert!(is_ineligible_owner);
    }
}
