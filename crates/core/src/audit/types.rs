//! Audit trail domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The kind of record an audit entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// Counterparty master record.
    Party,
    /// Vehicle type master record.
    VehicleType,
    /// Work type master record.
    WorkType,
    /// Equipment rate rule.
    RateRule,
    /// Port expense.
    Expense,
    /// Digital voucher.
    Voucher,
    /// Equipment usage record.
    UsageRecord,
}

impl SubjectKind {
    /// Returns the string representation of the subject kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Party => "party",
            Self::VehicleType => "vehicle_type",
            Self::WorkType => "work_type",
            Self::RateRule => "rate_rule",
            Self::Expense => "expense",
            Self::Voucher => "voucher",
            Self::UsageRecord => "usage_record",
        }
    }

    /// Parses a subject kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "party" => Some(Self::Party),
            "vehicle_type" => Some(Self::VehicleType),
            "work_type" => Some(Self::WorkType),
            "rate_rule" => Some(Self::RateRule),
            "expense" => Some(Self::Expense),
            "voucher" => Some(Self::Voucher),
            "usage_record" => Some(Self::UsageRecord),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Record was created.
    Created,
    /// Field values changed.
    Updated,
    /// Record was re-activated.
    Activated,
    /// Record was deactivated.
    Deactivated,
    /// Workflow status changed.
    StatusChanged,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
            Self::StatusChanged => "status_changed",
        }
    }
}

/// One field's old and new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// The previous value, absent on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
    /// The new value.
    pub new: Value,
}

/// Ordered map of field name to change.
pub type ChangeSet = BTreeMap<String, FieldChange>;

/// Records a change when old and new differ; returns `None` otherwise.
pub fn changed(old: &Value, new: &Value) -> Option<FieldChange> {
    if old == new {
        None
    } else {
        Some(FieldChange {
            old: Some(old.clone()),
            new: new.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_kind_roundtrip() {
        for kind in [
            SubjectKind::Party,
            SubjectKind::VehicleType,
            SubjectKind::WorkType,
            SubjectKind::RateRule,
            SubjectKind::Expense,
            SubjectKind::Voucher,
            SubjectKind::UsageRecord,
        ] {
            assert_eq!(SubjectKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SubjectKind::parse("vendor"), None);
    }

    #[test]
    fn test_changed_detects_difference() {
        let change = changed(&json!("old name"), &json!("new name")).unwrap();
        assert_eq!(change.old, Some(json!("old name")));
        assert_eq!(change.new, json!("new name"));
    }

    #[test]
    fn test_changed_skips_equal_values() {
        assert!(changed(&json!(true), &json!(true)).is_none());
    }

    #[test]
    fn test_change_set_serializes_field_map() {
        let mut changes = ChangeSet::new();
        changes.insert(
            "status".to_string(),
            FieldChange {
                old: Some(json!("submitted")),
                new: json!("approved"),
            },
        );
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(value["status"]["old"], json!("submitted"));
        assert_eq!(value["status"]["new"], json!("approved"));
    }
}
