//! The role-capability table.

use super::role::Role;

/// A capability gating a workflow or ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create a port expense.
    SubmitExpense,
    /// Approve or reject a submitted expense.
    ReviewExpense,
    /// Finalize an approved expense (posts the wallet debit).
    FinalizeExpense,
    /// Create a digital voucher.
    SubmitVoucher,
    /// Approve a submitted voucher.
    ApproveVoucher,
    /// Decline a submitted or approved voucher.
    DeclineVoucher,
    /// Log an approved voucher to external bookkeeping (posts the debit).
    LogVoucher,
    /// Credit another user's wallet.
    TopUpWallet,
    /// Read wallet balances and entries.
    ViewWallet,
    /// Start and end equipment usage records.
    ManageEquipment,
    /// Create and maintain equipment rate rules.
    ConfigureRates,
    /// Create manual or revenue tally entries.
    LogTally,
}

impl Capability {
    /// Returns the roles granted this capability.
    ///
    /// This is the single source of truth for authorization; workflow code
    /// must not hard-code role lists anywhere else.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::SubmitExpense | Self::SubmitVoucher | Self::ManageEquipment => {
                &[Role::Supervisor, Role::Manager, Role::Admin]
            }
            Self::ReviewExpense | Self::DeclineVoucher | Self::ConfigureRates => {
                &[Role::Manager, Role::Admin]
            }
            Self::FinalizeExpense | Self::LogVoucher => &[Role::Accountant],
            Self::ApproveVoucher => &[Role::Admin],
            Self::TopUpWallet | Self::LogTally => &[Role::Accountant, Role::Admin],
            Self::ViewWallet => &[
                Role::Admin,
                Role::Manager,
                Role::Supervisor,
                Role::Accountant,
                Role::Office,
            ],
        }
    }

    /// Returns a short name for error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubmitExpense => "submit_expense",
            Self::ReviewExpense => "review_expense",
            Self::FinalizeExpense => "finalize_expense",
            Self::SubmitVoucher => "submit_voucher",
            Self::ApproveVoucher => "approve_voucher",
            Self::DeclineVoucher => "decline_voucher",
            Self::LogVoucher => "log_voucher",
            Self::TopUpWallet => "topup_wallet",
            Self::ViewWallet => "view_wallet",
            Self::ManageEquipment => "manage_equipment",
            Self::ConfigureRates => "configure_rates",
            Self::LogTally => "log_tally",
        }
    }
}

impl Role {
    /// Checks this role against the capability table.
    #[must_use]
    pub fn can(self, capability: Capability) -> bool {
        capability.allowed_roles().contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_submission_roles() {
        assert!(Role::Supervisor.can(Capability::SubmitExpense));
        assert!(Role::Manager.can(Capability::SubmitExpense));
        assert!(Role::Admin.can(Capability::SubmitExpense));
        assert!(!Role::Accountant.can(Capability::SubmitExpense));
        assert!(!Role::Office.can(Capability::SubmitExpense));
    }

    #[test]
    fn test_expense_review_roles() {
        assert!(Role::Manager.can(Capability::ReviewExpense));
        assert!(Role::Admin.can(Capability::ReviewExpense));
        assert!(!Role::Supervisor.can(Capability::ReviewExpense));
        assert!(!Role::Accountant.can(Capability::ReviewExpense));
    }

    #[test]
    fn test_terminal_transitions_are_accountant_only() {
        assert!(Role::Accountant.can(Capability::FinalizeExpense));
        assert!(Role::Accountant.can(Capability::LogVoucher));
        for role in [Role::Admin, Role::Manager, Role::Supervisor, Role::Office] {
            assert!(!role.can(Capability::FinalizeExpense), "{role}");
            assert!(!role.can(Capability::LogVoucher), "{role}");
        }
    }

    #[test]
    fn test_voucher_approval_is_admin_only() {
        assert!(Role::Admin.can(Capability::ApproveVoucher));
        for role in [Role::Manager, Role::Supervisor, Role::Accountant, Role::Office] {
            assert!(!role.can(Capability::ApproveVoucher), "{role}");
        }
    }

    #[test]
    fn test_wallet_management_roles() {
        assert!(Role::Accountant.can(Capability::TopUpWallet));
        assert!(Role::Admin.can(Capability::TopUpWallet));
        assert!(!Role::Manager.can(Capability::TopUpWallet));
        assert!(!Role::Supervisor.can(Capability::TopUpWallet));
    }

    #[test]
    fn test_everyone_views_wallet() {
        for role in [
            Role::Admin,
            Role::Manager,
            Role::Supervisor,
            Role::Accountant,
            Role::Office,
        ] {
            assert!(role.can(Capability::ViewWallet), "{role}");
        }
    }

    #[test]
    fn test_equipment_roles() {
        assert!(Role::Supervisor.can(Capability::ManageEquipment));
        assert!(!Role::Accountant.can(Capability::ManageEquipment));
        assert!(!Role::Office.can(Capability::ManageEquipment));
    }

    #[test]
    fn test_rate_configuration_roles() {
        assert!(Role::Manager.can(Capability::ConfigureRates));
        assert!(Role::Admin.can(Capability::ConfigureRates));
        assert!(!Role::Supervisor.can(Capability::ConfigureRates));
    }
}
