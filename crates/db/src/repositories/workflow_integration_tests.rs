//! Integration tests for the approval workflows.
//!
//! Drives the core workflow and ledger services end-to-end the way the
//! repositories do: status transition, then the conditional posting with
//! its duplicate guard, against an in-memory ledger tail.

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use portledger_core::access::Role;
    use portledger_core::ledger::{
        EntryDirection, LedgerError, LedgerService, PostingInput, SourceKind,
    };
    use portledger_core::workflow::expense::tally_voucher_number;
    use portledger_core::workflow::{
        ExpenseCharges, ExpenseStatus, ExpenseWorkflow, VoucherStatus, VoucherWorkflow,
        WorkflowError,
    };
    use portledger_shared::types::UserId;

    /// In-memory stand-in for one owner's ledger tail.
    struct Wallet {
        owner: UserId,
        owner_role: Role,
        entries: Vec<(SourceKind, Option<Uuid>, EntryDirection, Decimal)>,
        balance: Option<Decimal>,
    }

    impl Wallet {
        fn new(owner_role: Role) -> Self {
            Self {
                owner: UserId::new(),
                owner_role,
                entries: Vec::new(),
                balance: None,
            }
        }

        fn post(
            &mut self,
            direction: EntryDirection,
            amount: Decimal,
            source_kind: SourceKind,
            source_ref: Option<Uuid>,
            posted_by: UserId,
        ) -> Result<Decimal, LedgerError> {
            let duplicate = source_ref.is_some_and(|r| {
                self.entries
                    .iter()
                    .any(|(kind, existing, _, _)| *kind == source_kind && *existing == Some(r))
            });
            let input = PostingInput {
                owner: self.owner,
                owner_role: self.owner_role,
                direction,
                amount,
                source_kind,
                source_ref,
                posted_by,
                description: None,
            };
            let prepared = LedgerService::prepare_posting(&input, self.balance, duplicate)?;
            self.entries.push((source_kind, source_ref, direction, amount));
            self.balance = Some(prepared.balance_after);
            Ok(prepared.balance_after)
        }

        fn balance(&self) -> Decimal {
            LedgerService::balance_for(self.owner_role, self.balance)
        }
    }

    // ========================================================================
    // End-to-end expense scenario:
    // supervisor submits 50+50+50+1 day road tax+0 → manager approves →
    // accountant finalizes → exactly one debit of 200, balance −200.
    // ========================================================================
    #[test]
    fn test_expense_lifecycle_posts_exactly_once() {
        let mut wallet = Wallet::new(Role::Supervisor);
        let manager = UserId::new();
        let accountant = UserId::new();
        let expense_id = Uuid::new_v4();

        let charges = ExpenseCharges {
            road_tax_days: 1,
            ..ExpenseCharges::default()
        };
        assert_eq!(charges.total(), dec!(200));

        let mut status = ExpenseWorkflow::submit(Role::Supervisor, &charges).unwrap();
        assert_eq!(status, ExpenseStatus::Submitted);

        let action =
            ExpenseWorkflow::approve(status, Role::Manager, manager, None).unwrap();
        status = action.new_status();
        // Approval has no ledger effect.
        assert_eq!(wallet.balance(), Decimal::ZERO);

        let action = ExpenseWorkflow::finalize(status, Role::Accountant, accountant).unwrap();
        status = action.new_status();
        let balance = wallet
            .post(
                EntryDirection::Debit,
                charges.total(),
                SourceKind::Expense,
                Some(expense_id),
                accountant,
            )
            .unwrap();

        assert_eq!(status, ExpenseStatus::Finalized);
        assert_eq!(balance, dec!(-200));
        assert_eq!(wallet.balance(), dec!(-200));
        assert_eq!(wallet.entries.len(), 1);
    }

    // ========================================================================
    // Idempotency: a retried finalize is rejected at the workflow layer,
    // and a racing retry that reaches the ledger hits the duplicate guard.
    // ========================================================================
    #[test]
    fn test_retried_finalize_has_no_side_effects() {
        let mut wallet = Wallet::new(Role::Supervisor);
        let accountant = UserId::new();
        let expense_id = Uuid::new_v4();

        let first = ExpenseWorkflow::finalize(
            ExpenseStatus::Approved,
            Role::Accountant,
            accountant,
        )
        .unwrap();
        wallet
            .post(
                EntryDirection::Debit,
                dec!(200),
                SourceKind::Expense,
                Some(expense_id),
                accountant,
            )
            .unwrap();

        // Ordinary retry: the status is already terminal.
        let retry = ExpenseWorkflow::finalize(first.new_status(), Role::Accountant, accountant);
        assert!(matches!(retry, Err(WorkflowError::InvalidTransition { .. })));

        // Racing retry that read the pre-finalize status still cannot post twice.
        let raced = wallet.post(
            EntryDirection::Debit,
            dec!(200),
            SourceKind::Expense,
            Some(expense_id),
            accountant,
        );
        assert!(matches!(raced, Err(LedgerError::DuplicatePosting { .. })));

        assert_eq!(wallet.entries.len(), 1);
        assert_eq!(wallet.balance(), dec!(-200));
    }

    // ========================================================================
    // Declined vouchers never touch the ledger, and a later log attempt
    // fails with an invalid transition.
    // ========================================================================
    #[test]
    fn test_declined_voucher_never_posts() {
        let wallet = Wallet::new(Role::Supervisor);
        let admin = UserId::new();
        let accountant = UserId::new();

        let status = VoucherWorkflow::submit(Role::Supervisor, dec!(320), "bill.jpg").unwrap();
        let action = VoucherWorkflow::decline(status, Role::Admin, admin, None).unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Declined);

        let log_attempt = VoucherWorkflow::log(
            action.new_status(),
            Role::Accountant,
            accountant,
            "TLY-55".to_string(),
        );
        assert!(matches!(
            log_attempt,
            Err(WorkflowError::InvalidTransition { .. })
        ));

        assert!(wallet.entries.is_empty());
        assert_eq!(wallet.balance(), Decimal::ZERO);
    }

    // ========================================================================
    // Voucher lifecycle through log debits the wallet once with the
    // caller-supplied voucher number.
    // ========================================================================
    #[test]
    fn test_voucher_lifecycle_posts_exactly_once() {
        let mut wallet = Wallet::new(Role::Supervisor);
        let admin = UserId::new();
        let accountant = UserId::new();
        let voucher_id = Uuid::new_v4();

        // Seed the wallet so the debit lands on a funded balance.
        wallet
            .post(
                EntryDirection::Credit,
                dec!(1000),
                SourceKind::Topup,
                Some(Uuid::new_v4()),
                accountant,
            )
            .unwrap();

        let status = VoucherWorkflow::submit(Role::Supervisor, dec!(320), "bill.jpg").unwrap();
        let action = VoucherWorkflow::approve(status, Role::Admin, admin, None).unwrap();
        let action = VoucherWorkflow::log(
            action.new_status(),
            Role::Accountant,
            accountant,
            "TLY-2031".to_string(),
        )
        .unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Logged);

        wallet
            .post(
                EntryDirection::Debit,
                dec!(320),
                SourceKind::Voucher,
                Some(voucher_id),
                accountant,
            )
            .unwrap();

        assert_eq!(wallet.balance(), dec!(680));

        // Duplicate log attempt cannot post again.
        let raced = wallet.post(
            EntryDirection::Debit,
            dec!(320),
            SourceKind::Voucher,
            Some(voucher_id),
            accountant,
        );
        assert!(matches!(raced, Err(LedgerError::DuplicatePosting { .. })));
        assert_eq!(wallet.entries.len(), 2);
    }

    // ========================================================================
    // The same source id under different source kinds never collides:
    // the guard is scoped per (source kind, source ref).
    // ========================================================================
    #[test]
    fn test_duplicate_guard_is_scoped_by_source_kind() {
        let mut wallet = Wallet::new(Role::Supervisor);
        let accountant = UserId::new();
        let shared_ref = Uuid::new_v4();

        wallet
            .post(
                EntryDirection::Debit,
                dec!(100),
                SourceKind::Expense,
                Some(shared_ref),
                accountant,
            )
            .unwrap();
        wallet
            .post(
                EntryDirection::Debit,
                dec!(50),
                SourceKind::Voucher,
                Some(shared_ref),
                accountant,
            )
            .unwrap();

        assert_eq!(wallet.entries.len(), 2);
        assert_eq!(wallet.balance(), dec!(-150));
    }

    // ========================================================================
    // Accountants never accumulate a wallet, no matter the workflow.
    // ========================================================================
    #[test]
    fn test_accountant_wallet_stays_empty() {
        let mut wallet = Wallet::new(Role::Accountant);
        let result = wallet.post(
            EntryDirection::Credit,
            dec!(500),
            SourceKind::Topup,
            Some(Uuid::new_v4()),
            UserId::new(),
        );
        assert!(matches!(result, Err(LedgerError::IneligibleOwner { .. })));
        assert!(wallet.entries.is_empty());
        assert_eq!(wallet.balance(), Decimal::ZERO);
    }

    // ========================================================================
    // Bulk semantics: items transition independently; a bad item fails
    // without disturbing its neighbours.
    // ========================================================================
    #[test]
    fn test_bulk_items_fail_independently() {
        let manager = UserId::new();
        let states = [
            ExpenseStatus::Submitted,
            ExpenseStatus::Rejected, // already terminal, must fail
            ExpenseStatus::Submitted,
        ];

        let outcomes: Vec<bool> = states
            .iter()
            .map(|&s| ExpenseWorkflow::approve(s, Role::Manager, manager, None).is_ok())
            .collect();

        assert_eq!(outcomes, vec![true, false, true]);
    }

    #[test]
    fn test_finalized_expense_voucher_number_matches_sequence() {
        assert_eq!(tally_voucher_number(7), "EXP-000007");
        assert_eq!(tally_voucher_number(123_456), "EXP-123456");
    }
}
