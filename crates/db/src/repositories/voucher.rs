//! Digital voucher repository.
//!
//! Drives the voucher approval workflow. Logging runs the status
//! mutation, the single wallet debit, and the tally record in one
//! transaction, with the same duplicate-posting no-op semantics as
//! expense finalization.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use portledger_core::access::Role;
use portledger_core::audit::{AuditAction, ChangeSet, FieldChange, SubjectKind};
use portledger_core::ledger::{EntryDirection, LedgerError, PostingInput, SourceKind};
use portledger_core::workflow::{VoucherAction, VoucherWorkflow, WorkflowError};
use portledger_shared::types::{PageRequest, TallyLogId, UserId, VoucherId};

use crate::entities::{
    sea_orm_active_enums::{TallyEntryKind, VoucherStatus},
    tally_logs, users, vouchers,
};
use crate::repositories::audit::AuditRepository;
use crate::repositories::ledger::LedgerRepository;
use crate::repositories::{BulkReviewItem, BulkReviewResult};

/// Input for creating a digital voucher.
#[derive(Debug, Clone)]
pub struct CreateVoucherInput {
    /// The submitter, who owns the wallet the voucher will debit.
    pub owner_id: Uuid,
    /// The submitter's role.
    pub owner_role: Role,
    /// When the spend happened.
    pub date_time: DateTime<FixedOffset>,
    /// Expense category (fuel, maintenance, travel, ...).
    pub category: String,
    /// Voucher amount.
    pub amount: Decimal,
    /// Opaque reference to the supporting bill document.
    pub document_ref: String,
    /// Optional remarks.
    pub remarks: Option<String>,
}

/// Item for bulk voucher logging.
#[derive(Debug, Clone)]
pub struct BulkLogItem {
    /// The voucher to log.
    pub id: Uuid,
    /// The external voucher number for this voucher.
    pub voucher_number: String,
}

/// Filter options for listing vouchers.
#[derive(Debug, Clone, Default)]
pub struct VoucherFilter {
    /// Restrict to one owner (supervisors see only their own).
    pub owner_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<VoucherStatus>,
}

/// Digital voucher repository.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a voucher in `submitted` status.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` unless the submitter is
    /// supervisor-or-above, `WorkflowError::NegativeAmount` for a negative
    /// amount, or `WorkflowError::DocumentRequired` without a supporting
    /// document.
    pub async fn create(
        &self,
        input: CreateVoucherInput,
    ) -> Result<vouchers::Model, WorkflowError> {
        let status =
            VoucherWorkflow::submit(input.owner_role, input.amount, &input.document_ref)?;

        let now = chrono::Utc::now().into();
        let active = vouchers::ActiveModel {
            id: Set(VoucherId::new().into_inner()),
            owner_id: Set(input.owner_id),
            date_time: Set(input.date_time),
            category: Set(input.category.clone()),
            amount: Set(input.amount),
            document_ref: Set(input.document_ref.clone()),
            remarks: Set(input.remarks.clone()),
            status: Set(VoucherStatus::from_core(status)),
            approved_by: Set(None),
            logged_by: Set(None),
            approval_comments: Set(None),
            tally_reference: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let txn = self.db.begin().await.map_err(db_err)?;
        let model = active.insert(&txn).await.map_err(db_err)?;

        let mut changes = ChangeSet::new();
        changes.insert(
            "status".to_string(),
            FieldChange {
                old: None,
                new: json!(status.as_str()),
            },
        );
        AuditRepository::record_in(
            &txn,
            SubjectKind::Voucher,
            model.id,
            AuditAction::Created,
            &changes,
            Some(input.owner_id),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(model)
    }

    /// Fetches one voucher.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::VoucherNotFound` if it does not exist.
    pub async fn find(&self, id: Uuid) -> Result<vouchers::Model, WorkflowError> {
        vouchers::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::VoucherNotFound(id))
    }

    /// Lists vouchers newest-first with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<(Vec<vouchers::Model>, u64), WorkflowError> {
        let mut query = vouchers::Entity::find();

        if let Some(owner_id) = filter.owner_id {
            query = query.filter(vouchers::Column::OwnerId.eq(owner_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(vouchers::Column::Status.eq(status.clone()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let items = query
            .order_by_desc(vouchers::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((items, total))
    }

    /// Approves a submitted voucher. Admin only, no ledger effect.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` or
    /// `WorkflowError::InvalidTransition` per the workflow rules.
    pub async fn approve(
        &self,
        voucher_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
        comments: Option<String>,
    ) -> Result<vouchers::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let voucher = Self::find_in(&txn, voucher_id).await?;
        let old_status = voucher.status.clone();

        let action = VoucherWorkflow::approve(
            voucher.status.to_core(),
            actor_role,
            UserId::from_uuid(actor_id),
            comments,
        )?;

        let VoucherAction::Approve {
            new_status,
            approved_by,
            approved_at,
            comments,
        } = action
        else {
            unreachable!("approve returns an Approve action");
        };

        let mut active: vouchers::ActiveModel = voucher.into();
        active.status = Set(VoucherStatus::from_core(new_status));
        active.approved_by = Set(Some(approved_by.into_inner()));
        active.approval_comments = Set(comments);
        active.updated_at = Set(approved_at.into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        Self::audit_status_change(&txn, &updated, &old_status, actor_id).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Declines a submitted or approved voucher. Terminal, no ledger effect.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` or
    /// `WorkflowError::InvalidTransition` per the workflow rules.
    pub async fn decline(
        &self,
        voucher_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
        comments: Option<String>,
    ) -> Result<vouchers::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let voucher = Self::find_in(&txn, voucher_id).await?;
        let old_status = voucher.status.clone();

        let action = VoucherWorkflow::decline(
            voucher.status.to_core(),
            actor_role,
            UserId::from_uuid(actor_id),
            comments,
        )?;

        let VoucherAction::Decline {
            new_status,
            declined_by,
            declined_at,
            comments,
        } = action
        else {
            unreachable!("decline returns a Decline action");
        };

        let mut active: vouchers::ActiveModel = voucher.into();
        active.status = Set(VoucherStatus::from_core(new_status));
        active.approved_by = Set(Some(declined_by.into_inner()));
        active.approval_comments = Set(comments);
        active.updated_at = Set(declined_at.into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        Self::audit_status_change(&txn, &updated, &old_status, actor_id).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Logs an approved voucher: status mutation, exactly one wallet debit,
    /// and one tally record carrying the caller-supplied voucher number,
    /// all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` unless the actor is an
    /// accountant, `WorkflowError::InvalidTransition` unless the voucher is
    /// approved, or `WorkflowError::VoucherNumberRequired` for an empty
    /// number.
    pub async fn log(
        &self,
        voucher_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
        voucher_number: String,
    ) -> Result<vouchers::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let voucher = Self::find_in(&txn, voucher_id).await?;
        let old_status = voucher.status.clone();

        let action = VoucherWorkflow::log(
            voucher.status.to_core(),
            actor_role,
            UserId::from_uuid(actor_id),
            voucher_number,
        )?;

        let VoucherAction::Log {
            new_status,
            logged_by,
            logged_at,
            voucher_number,
        } = action
        else {
            unreachable!("log returns a Log action");
        };

        let owner = users::Entity::find_by_id(voucher.owner_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::Ledger(LedgerError::OwnerNotFound(
                voucher.owner_id,
            )))?;

        let posting = PostingInput {
            owner: UserId::from_uuid(voucher.owner_id),
            owner_role: owner.role.to_core(),
            direction: EntryDirection::Debit,
            amount: voucher.amount,
            source_kind: SourceKind::Voucher,
            source_ref: Some(voucher.id),
            posted_by: UserId::from_uuid(actor_id),
            description: Some(format!("Digital voucher - {}", voucher.category)),
        };

        match LedgerRepository::post_in(&txn, &posting).await {
            Ok(_) => {}
            Err(LedgerError::DuplicatePosting { .. }) => {
                // Safe retry: the debit already exists, so the voucher is
                // already logged. Undo this attempt and report success.
                txn.rollback().await.map_err(db_err)?;
                return self.find(voucher_id).await;
            }
            Err(e) => return Err(e.into()),
        }

        let tally = tally_logs::ActiveModel {
            id: Set(TallyLogId::new().into_inner()),
            entry_kind: Set(TallyEntryKind::Voucher),
            reference_id: Set(Some(voucher.id)),
            tally_voucher_number: Set(voucher_number.clone()),
            amount: Set(voucher.amount),
            description: Set(format!("Digital voucher - {}", voucher.category)),
            logged_by: Set(actor_id),
            logged_at: Set(logged_at.into()),
        };
        tally.insert(&txn).await.map_err(db_err)?;

        let mut active: vouchers::ActiveModel = voucher.into();
        active.status = Set(VoucherStatus::from_core(new_status));
        active.logged_by = Set(Some(logged_by.into_inner()));
        active.tally_reference = Set(Some(voucher_number));
        active.updated_at = Set(logged_at.into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        Self::audit_status_change(&txn, &updated, &old_status, actor_id).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Approves many vouchers independently; one failure never rolls back
    /// the others.
    pub async fn bulk_approve(
        &self,
        voucher_ids: &[Uuid],
        actor_id: Uuid,
        actor_role: Role,
        comments: Option<String>,
    ) -> BulkReviewResult {
        let mut results = Vec::with_capacity(voucher_ids.len());
        for &id in voucher_ids {
            match self.approve(id, actor_id, actor_role, comments.clone()).await {
                Ok(_) => results.push(BulkReviewItem::ok(id)),
                Err(e) => results.push(BulkReviewItem::failed(id, e)),
            }
        }
        BulkReviewResult::from_items(results)
    }

    /// Logs many vouchers independently, each with its own external
    /// voucher number; one failure never rolls back the others.
    pub async fn bulk_log(
        &self,
        items: &[BulkLogItem],
        actor_id: Uuid,
        actor_role: Role,
    ) -> BulkReviewResult {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            match self
                .log(item.id, actor_id, actor_role, item.voucher_number.clone())
                .await
            {
                Ok(_) => results.push(BulkReviewItem::ok(item.id)),
                Err(e) => results.push(BulkReviewItem::failed(item.id, e)),
            }
        }
        BulkReviewResult::from_items(results)
    }

    async fn find_in<C: sea_orm::ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<vouchers::Model, WorkflowError> {
        vouchers::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::VoucherNotFound(id))
    }

    async fn audit_status_change<C: sea_orm::ConnectionTrait>(
        conn: &C,
        updated: &vouchers::Model,
        old_status: &VoucherStatus,
        actor_id: Uuid,
    ) -> Result<(), WorkflowError> {
        let mut changes = ChangeSet::new();
        changes.insert(
            "status".to_string(),
            FieldChange {
                old: Some(json!(old_status.to_core().as_str())),
                new: json!(updated.status.to_core().as_str()),
            },
        );
        AuditRepository::record_in(
            conn,
            SubjectKind::Voucher,
            updated.id,
            AuditAction::StatusChanged,
            &changes,
            Some(actor_id),
        )
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

fn db_err(e: sea_orm::DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}
