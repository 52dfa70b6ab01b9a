//! Audit trail types and retention policy.

pub mod retention;
pub mod types;

pub use retention::{DEFAULT_KEEP_COUNT, split_retained};
pub use types::{AuditAction, ChangeSet, FieldChange, SubjectKind};
