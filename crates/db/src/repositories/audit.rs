//! Audit trail repository.
//!
//! Entries are written inside the transaction of the mutation they
//! describe. Retention cleanup keeps the newest N entries per subject.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use thiserror::Error;
use uuid::Uuid;

use portledger_core::audit::{split_retained, AuditAction, ChangeSet, SubjectKind};
use portledger_shared::types::AuditLogId;

use crate::entities::audit_logs;

/// Error types for audit trail operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbErr> for AuditError {
    fn from(e: DbErr) -> Self {
        Self::Database(e.to_string())
    }
}

/// Audit trail repository.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an audit entry inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record_in<C: ConnectionTrait>(
        conn: &C,
        subject_kind: SubjectKind,
        subject_id: Uuid,
        action: AuditAction,
        changes: &ChangeSet,
        performed_by: Option<Uuid>,
    ) -> Result<audit_logs::Model, DbErr> {
        let active = audit_logs::ActiveModel {
            id: Set(AuditLogId::new().into_inner()),
            subject_kind: Set(subject_kind.as_str().to_string()),
            subject_id: Set(subject_id),
            action: Set(action.as_str().to_string()),
            changes: Set(serde_json::to_value(changes).unwrap_or_default()),
            performed_by: Set(performed_by),
            created_at: Set(chrono::Utc::now().into()),
        };
        active.insert(conn).await
    }

    /// Records an audit entry in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record(
        &self,
        subject_kind: SubjectKind,
        subject_id: Uuid,
        action: AuditAction,
        changes: &ChangeSet,
        performed_by: Option<Uuid>,
    ) -> Result<audit_logs::Model, AuditError> {
        Ok(Self::record_in(&self.db, subject_kind, subject_id, action, changes, performed_by)
            .await?)
    }

    /// Lists a subject's audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_subject(
        &self,
        subject_kind: SubjectKind,
        subject_id: Uuid,
    ) -> Result<Vec<audit_logs::Model>, AuditError> {
        let entries = audit_logs::Entity::find()
            .filter(audit_logs::Column::SubjectKind.eq(subject_kind.as_str()))
            .filter(audit_logs::Column::SubjectId.eq(subject_id))
            .order_by_desc(audit_logs::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Deletes audit entries beyond the newest `keep_count` per subject.
    ///
    /// Returns the number of deleted entries.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or delete fails.
    pub async fn cleanup(&self, keep_count: usize) -> Result<u64, AuditError> {
        let subjects: Vec<(String, Uuid)> = audit_logs::Entity::find()
            .select_only()
            .column(audit_logs::Column::SubjectKind)
            .column(audit_logs::Column::SubjectId)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut deleted_total = 0u64;
        for (subject_kind, subject_id) in subjects {
            let ids: Vec<Uuid> = audit_logs::Entity::find()
                .select_only()
                .column(audit_logs::Column::Id)
                .filter(audit_logs::Column::SubjectKind.eq(subject_kind.clone()))
                .filter(audit_logs::Column::SubjectId.eq(subject_id))
                .order_by_desc(audit_logs::Column::CreatedAt)
                .into_tuple()
                .all(&self.db)
                .await?;

            let (_, expired) = split_retained(ids, keep_count);
            if expired.is_empty() {
                continue;
            }

            let result = audit_logs::Entity::delete_many()
                .filter(audit_logs::Column::Id.is_in(expired))
                .exec(&self.db)
                .await?;
            deleted_total += result.rows_affected;
        }

        Ok(deleted_total)
    }
}
