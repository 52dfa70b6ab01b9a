//! User roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role determining wallet eligibility and workflow authority.
///
/// Roles are not a strict hierarchy: an accountant holds financial
/// capabilities a manager does not, and never owns a wallet ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every operation.
    Admin,
    /// Runs operations and reviews supervisor submissions.
    Manager,
    /// Field staff; submits expenses/vouchers and operates equipment.
    Supervisor,
    /// Finalizes financial records and manages wallets; owns no wallet.
    Accountant,
    /// Back-office staff; read-mostly access.
    Office,
}

impl Role {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "supervisor" => Some(Self::Supervisor),
            "accountant" => Some(Self::Accountant),
            "office" => Some(Self::Office),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Supervisor => "supervisor",
            Self::Accountant => "accountant",
            Self::Office => "office",
        }
    }

    /// Returns true if users with this role own a wallet ledger.
    ///
    /// Accountants operate wallets for others but never own one.
    #[must_use]
    pub fn owns_wallet(&self) -> bool {
        !matches!(self, Self::Accountant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("MANAGER"), Some(Role::Manager));
        assert_eq!(Role::parse("Supervisor"), Some(Role::Supervisor));
        assert_eq!(Role::parse("accountant"), Some(Role::Accountant));
        assert_eq!(Role::parse("office"), Some(Role::Office));
        assert_eq!(Role::parse("viewer"), None);
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Manager.as_str(), "manager");
        assert_eq!(Role::Supervisor.as_str(), "supervisor");
        assert_eq!(Role::Accountant.as_str(), "accountant");
        assert_eq!(Role::Office.as_str(), "office");
    }

    #[test]
    fn test_wallet_ownership() {
        assert!(Role::Admin.owns_wallet());
        assert!(Role::Manager.owns_wallet());
        assert!(Role::Supervisor.owns_wallet());
        assert!(Role::Office.owns_wallet());
        assert!(!Role::Accountant.owns_wallet());
    }
}
