//! Postgres enum types and their core-domain conversions.

use portledger_core::access::Role;
use portledger_core::equipment::ContractType as CoreContractType;
use portledger_core::ledger::{EntryDirection as CoreEntryDirection, SourceKind};
use portledger_core::workflow::{ExpenseStatus as CoreExpenseStatus, VoucherStatus as CoreVoucherStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Operations management.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Field staff.
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
    /// Financial control; owns no wallet.
    #[sea_orm(string_value = "accountant")]
    Accountant,
    /// Back office.
    #[sea_orm(string_value = "office")]
    Office,
}

impl UserRole {
    /// Converts to the core role.
    #[must_use]
    pub fn to_core(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Manager => Role::Manager,
            Self::Supervisor => Role::Supervisor,
            Self::Accountant => Role::Accountant,
            Self::Office => Role::Office,
        }
    }

    /// Converts from the core role.
    #[must_use]
    pub fn from_core(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Manager => Self::Manager,
            Role::Supervisor => Self::Supervisor,
            Role::Accountant => Self::Accountant,
            Role::Office => Self::Office,
        }
    }
}

/// Ledger entry direction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_direction")]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    /// Increases the balance.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Decreases the balance.
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl EntryDirection {
    /// Converts to the core direction.
    #[must_use]
    pub fn to_core(&self) -> CoreEntryDirection {
        match self {
            Self::Credit => CoreEntryDirection::Credit,
            Self::Debit => CoreEntryDirection::Debit,
        }
    }

    /// Converts from the core direction.
    #[must_use]
    pub fn from_core(direction: CoreEntryDirection) -> Self {
        match direction {
            CoreEntryDirection::Credit => Self::Credit,
            CoreEntryDirection::Debit => Self::Debit,
        }
    }
}

/// Kind of record a ledger entry originates from.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_source_kind")]
#[serde(rename_all = "lowercase")]
pub enum LedgerSourceKind {
    /// Finalized port expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Logged digital voucher.
    #[sea_orm(string_value = "voucher")]
    Voucher,
    /// Wallet top-up.
    #[sea_orm(string_value = "topup")]
    Topup,
    /// Manual adjustment.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl LedgerSourceKind {
    /// Converts to the core source kind.
    #[must_use]
    pub fn to_core(&self) -> SourceKind {
        match self {
            Self::Expense => SourceKind::Expense,
            Self::Voucher => SourceKind::Voucher,
            Self::Topup => SourceKind::Topup,
            Self::Adjustment => SourceKind::Adjustment,
        }
    }

    /// Converts from the core source kind.
    #[must_use]
    pub fn from_core(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Expense => Self::Expense,
            SourceKind::Voucher => Self::Voucher,
            SourceKind::Topup => Self::Topup,
            SourceKind::Adjustment => Self::Adjustment,
        }
    }
}

/// Port expense status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Awaiting review.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Awaiting finalization.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected (terminal).
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Finalized; wallet debited (terminal).
    #[sea_orm(string_value = "finalized")]
    Finalized,
}

impl ExpenseStatus {
    /// Converts to the core status.
    #[must_use]
    pub fn to_core(&self) -> CoreExpenseStatus {
        match self {
            Self::Submitted => CoreExpenseStatus::Submitted,
            Self::Approved => CoreExpenseStatus::Approved,
            Self::Rejected => CoreExpenseStatus::Rejected,
            Self::Finalized => CoreExpenseStatus::Finalized,
        }
    }

    /// Converts from the core status.
    #[must_use]
    pub fn from_core(status: CoreExpenseStatus) -> Self {
        match status {
            CoreExpenseStatus::Submitted => Self::Submitted,
            CoreExpenseStatus::Approved => Self::Approved,
            CoreExpenseStatus::Rejected => Self::Rejected,
            CoreExpenseStatus::Finalized => Self::Finalized,
        }
    }
}

/// Digital voucher status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_status")]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Awaiting approval.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Awaiting bookkeeping.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined (terminal).
    #[sea_orm(string_value = "declined")]
    Declined,
    /// Logged to external bookkeeping (terminal).
    #[sea_orm(string_value = "logged")]
    Logged,
}

impl VoucherStatus {
    /// Converts to the core status.
    #[must_use]
    pub fn to_core(&self) -> CoreVoucherStatus {
        match self {
            Self::Submitted => CoreVoucherStatus::Submitted,
            Self::Approved => CoreVoucherStatus::Approved,
            Self::Declined => CoreVoucherStatus::Declined,
            Self::Logged => CoreVoucherStatus::Logged,
        }
    }

    /// Converts from the core status.
    #[must_use]
    pub fn from_core(status: CoreVoucherStatus) -> Self {
        match status {
            CoreVoucherStatus::Submitted => Self::Submitted,
            CoreVoucherStatus::Approved => Self::Approved,
            CoreVoucherStatus::Declined => Self::Declined,
            CoreVoucherStatus::Logged => Self::Logged,
        }
    }
}

/// Equipment billing contract type.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "contract_type")]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    /// Lump sum.
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// Per shift.
    #[sea_orm(string_value = "shift")]
    Shift,
    /// Per tonne.
    #[sea_orm(string_value = "tonnes")]
    Tonnes,
    /// Per hour.
    #[sea_orm(string_value = "hours")]
    Hours,
}

impl ContractType {
    /// Converts to the core contract type.
    #[must_use]
    pub fn to_core(&self) -> CoreContractType {
        match self {
            Self::Fixed => CoreContractType::Fixed,
            Self::Shift => CoreContractType::Shift,
            Self::Tonnes => CoreContractType::Tonnes,
            Self::Hours => CoreContractType::Hours,
        }
    }

    /// Converts from the core contract type.
    #[must_use]
    pub fn from_core(contract_type: CoreContractType) -> Self {
        match contract_type {
            CoreContractType::Fixed => Self::Fixed,
            CoreContractType::Shift => Self::Shift,
            CoreContractType::Tonnes => Self::Tonnes,
            CoreContractType::Hours => Self::Hours,
        }
    }
}

/// Equipment usage record status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "usage_status")]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    /// Equipment still in use.
    #[sea_orm(string_value = "running")]
    Running,
    /// Usage ended, cost derived.
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Kind of tally log entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tally_entry_kind")]
#[serde(rename_all = "lowercase")]
pub enum TallyEntryKind {
    /// Finalized port expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Logged digital voucher.
    #[sea_orm(string_value = "voucher")]
    Voucher,
    /// Revenue entry.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Manual entry.
    #[sea_orm(string_value = "manual")]
    Manual,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion_roundtrip() {
        for role in [
            Role::Admin,
            Role::Manager,
            Role::Supervisor,
            Role::Accountant,
            Role::Office,
        ] {
            assert_eq!(UserRole::from_core(role).to_core(), role);
        }
    }

    #[test]
    fn test_expense_status_conversion_roundtrip() {
        for status in [
            CoreExpenseStatus::Submitted,
            CoreExpenseStatus::Approved,
            CoreExpenseStatus::Rejected,
            CoreExpenseStatus::Finalized,
        ] {
            assert_eq!(ExpenseStatus::from_core(status).to_core(), status);
        }
    }

    #[test]
    fn test_voucher_status_conversion_roundtrip() {
        for status in [
            CoreVoucherStatus::Submitted,
            CoreVoucherStatus::Approved,
            CoreVoucherStatus::Declined,
            CoreVoucherStatus::Logged,
        ] {
            assert_eq!(VoucherStatus::from_core(status).to_core(), status);
        }
    }

    #[test]
    fn test_source_kind_conversion_roundtrip() {
        for kind in [
            SourceKind::Expense,
            SourceKind::Voucher,
            SourceKind::Topup,
            SourceKind::Adjustment,
        ] {
            assert_eq!(LedgerSourceKind::from_core(kind).to_core(), kind);
        }
    }

    #[test]
    fn test_contract_type_conversion_roundtrip() {
        for contract in [
            CoreContractType::Fixed,
            CoreContractType::Shift,
            CoreContractType::Tonnes,
            CoreContractType::Hours,
        ] {
            assert_eq!(ContractType::from_core(contract).to_core(), contract);
        }
    }
}
