//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where a
//! `PartyId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(LedgerEntryId, "Unique identifier for a wallet ledger entry.");
typed_id!(ExpenseId, "Unique identifier for a port expense.");
typed_id!(VoucherId, "Unique identifier for a digital voucher.");
typed_id!(TopUpId, "Unique identifier for a wallet top-up.");
typed_id!(TallyLogId, "Unique identifier for a tally log entry.");
typed_id!(UsageRecordId, "Unique identifier for an equipment usage record.");
typed_id!(RateRuleId, "Unique identifier for an equipment rate rule.");
typed_id!(PartyId, "Unique identifier for a counterparty.");
typed_id!(VehicleTypeId, "Unique identifier for a vehicle type.");
typed_id!(WorkTypeId, "Unique identifier for a work type.");
typed_id!(AuditLogId, "Unique identifier for an audit log entry.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_roundtrip() {
        let id = UserId::new();
        let parsed = UserId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::now_v7();
        let id = ExpenseId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
    }

    #[test]
    fn test_typed_id_is_unique() {
        let a = LedgerEntryId::new();
        let b = LedgerEntryId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_typed_id_invalid_string() {
        assert!(PartyId::from_str("not-a-uuid").is_err());
    }
}
