//! Exhaustive transition-legality checks over every (state, action, role)
//! triple for both workflows. Anything not explicitly permitted must fail,
//! and the failure kind must match the cause (role vs. state).

use portledger_shared::types::UserId;
use rust_decimal_macros::dec;

use super::error::WorkflowError;
use super::expense::{ExpenseStatus, ExpenseWorkflow};
use super::voucher::{VoucherStatus, VoucherWorkflow};
use crate::access::Role;

const ROLES: [Role; 5] = [
    Role::Admin,
    Role::Manager,
    Role::Supervisor,
    Role::Accountant,
    Role::Office,
];

const EXPENSE_STATES: [ExpenseStatus; 4] = [
    ExpenseStatus::Submitted,
    ExpenseStatus::Approved,
    ExpenseStatus::Rejected,
    ExpenseStatus::Finalized,
];

const VOUCHER_STATES: [VoucherStatus; 4] = [
    VoucherStatus::Submitted,
    VoucherStatus::Approved,
    VoucherStatus::Declined,
    VoucherStatus::Logged,
];

fn assert_denied(result: &Result<impl std::fmt::Debug, WorkflowError>, role_ok: bool) {
    match result {
        Err(WorkflowError::InsufficientRole { .. }) => {
            assert!(!role_ok, "role failure reported for a permitted role");
        }
        Err(WorkflowError::InvalidTransition { .. }) => {
            assert!(role_ok, "state failure reported before the role gate");
        }
        other => panic!("expected a denial, got {other:?}"),
    }
}

#[test]
fn expense_approve_legality_is_exhaustive() {
    for role in ROLES {
        for state in EXPENSE_STATES {
            let role_ok = matches!(role, Role::Manager | Role::Admin);
            let state_ok = state == ExpenseStatus::Submitted;
            let result = ExpenseWorkflow::approve(state, role, UserId::new(), None);
            if role_ok && state_ok {
                assert_eq!(result.unwrap().new_status(), ExpenseStatus::Approved);
            } else {
                assert_denied(&result, role_ok);
            }
        }
    }
}

#[test]
fn expense_reject_legality_is_exhaustive() {
    for role in ROLES {
        for state in EXPENSE_STATES {
            let role_ok = matches!(role, Role::Manager | Role::Admin);
            let state_ok = matches!(state, ExpenseStatus::Submitted | ExpenseStatus::Approved);
            let result = ExpenseWorkflow::reject(state, role, UserId::new(), None);
            if role_ok && state_ok {
                assert_eq!(result.unwrap().new_status(), ExpenseStatus::Rejected);
            } else {
                assert_denied(&result, role_ok);
            }
        }
    }
}

#[test]
fn expense_finalize_legality_is_exhaustive() {
    for role in ROLES {
        for state in EXPENSE_STATES {
            let role_ok = role == Role::Accountant;
            let state_ok = state == ExpenseStatus::Approved;
            let result = ExpenseWorkflow::finalize(state, role, UserId::new());
            if role_ok && state_ok {
                assert_eq!(result.unwrap().new_status(), ExpenseStatus::Finalized);
            } else {
                assert_denied(&result, role_ok);
            }
        }
    }
}

#[test]
fn voucher_approve_legality_is_exhaustive() {
    for role in ROLES {
        for state in VOUCHER_STATES {
            let role_ok = role == Role::Admin;
            let state_ok = state == VoucherStatus::Submitted;
            let result = VoucherWorkflow::approve(state, role, UserId::new(), None);
            if role_ok && state_ok {
                assert_eq!(result.unwrap().new_status(), VoucherStatus::Approved);
            } else {
                assert_denied(&result, role_ok);
            }
        }
    }
}

#[test]
fn voucher_decline_legality_is_exhaustive() {
    for role in ROLES {
        for state in VOUCHER_STATES {
            let role_ok = matches!(role, Role::Manager | Role::Admin);
            let state_ok = matches!(state, VoucherStatus::Submitted | VoucherStatus::Approved);
            let result = VoucherWorkflow::decline(state, role, UserId::new(), None);
            if role_ok && state_ok {
                assert_eq!(result.unwrap().new_status(), VoucherStatus::Declined);
            } else {
                assert_denied(&result, role_ok);
            }
        }
    }
}

#[test]
fn voucher_log_legality_is_exhaustive() {
    for role in ROLES {
        for state in VOUCHER_STATES {
            let role_ok = role == Role::Accountant;
            let state_ok = state == VoucherStatus::Approved;
            let result =
                VoucherWorkflow::log(state, role, UserId::new(), "TLY-100".to_string());
            if role_ok && state_ok {
                assert_eq!(result.unwrap().new_status(), VoucherStatus::Logged);
            } else {
                assert_denied(&result, role_ok);
            }
        }
    }
}

#[test]
fn submit_legality_is_exhaustive() {
    for role in ROLES {
        let allowed = matches!(role, Role::Supervisor | Role::Manager | Role::Admin);
        let expense = ExpenseWorkflow::submit(role, &super::expense::ExpenseCharges::default());
        let voucher = VoucherWorkflow::submit(role, dec!(100), "bill.jpg");
        assert_eq!(expense.is_ok(), allowed, "expense submit as {role}");
        assert_eq!(voucher.is_ok(), allowed, "voucher submit as {role}");
    }
}
