//! Port expense repository.
//!
//! Drives the expense approval workflow. Finalization runs the status
//! mutation, the single wallet debit, and the tally record in one
//! transaction; a duplicate posting detected inside that transaction
//! rolls everything back and reports the already-finalized expense as a
//! no-op success.

use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use portledger_core::access::Role;
use portledger_core::audit::{AuditAction, ChangeSet, FieldChange, SubjectKind};
use portledger_core::ledger::{EntryDirection, LedgerError, PostingInput, SourceKind};
use portledger_core::workflow::expense::tally_voucher_number;
use portledger_core::workflow::{ExpenseAction, ExpenseCharges, ExpenseWorkflow, WorkflowError};
use portledger_shared::types::{ExpenseId, PageRequest, TallyLogId, UserId};

use crate::entities::{
    expenses,
    sea_orm_active_enums::{ExpenseStatus, TallyEntryKind},
    tally_logs, users,
};
use crate::repositories::audit::AuditRepository;
use crate::repositories::ledger::LedgerRepository;
use crate::repositories::{BulkReviewItem, BulkReviewResult};

/// Input for creating a port expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// The submitter, who owns the wallet the expense will debit.
    pub owner_id: Uuid,
    /// The submitter's role.
    pub owner_role: Role,
    /// When the gate movement happened.
    pub date_time: DateTime<FixedOffset>,
    /// Vehicle description.
    pub vehicle: String,
    /// Vehicle registration number.
    pub vehicle_number: String,
    /// Gate identifier.
    pub gate: String,
    /// Movement direction (in/out).
    pub in_out: String,
    /// Free-text description.
    pub description: String,
    /// Charge components; the total is recomputed from these.
    pub charges: ExpenseCharges,
    /// Opaque reference to the receipt photo, if any.
    pub photo_ref: Option<String>,
}

/// Filter options for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Restrict to one owner (supervisors see only their own).
    pub owner_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<ExpenseStatus>,
}

/// Port expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense in `submitted` status.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` unless the submitter is
    /// supervisor-or-above, or `WorkflowError::NegativeAmount` for invalid
    /// charge components.
    pub async fn create(
        &self,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, WorkflowError> {
        let status = ExpenseWorkflow::submit(input.owner_role, &input.charges)?;

        let now = chrono::Utc::now().into();
        let id = ExpenseId::new().into_inner();

        let active = expenses::ActiveModel {
            id: Set(id),
            owner_id: Set(input.owner_id),
            date_time: Set(input.date_time),
            vehicle: Set(input.vehicle.clone()),
            vehicle_number: Set(input.vehicle_number.to_uppercase()),
            gate: Set(input.gate.clone()),
            in_out: Set(input.in_out.clone()),
            description: Set(input.description.clone()),
            cisf_amount: Set(input.charges.cisf),
            kpt_amount: Set(input.charges.kpt),
            customs_amount: Set(input.charges.customs),
            road_tax_days: Set(i32::try_from(input.charges.road_tax_days).unwrap_or(i32::MAX)),
            road_tax_amount: Set(input.charges.road_tax()),
            other_charges: Set(input.charges.other),
            total_amount: Set(input.charges.total()),
            photo_ref: Set(input.photo_ref.clone()),
            status: Set(ExpenseStatus::from_core(status)),
            reviewed_by: Set(None),
            finalized_by: Set(None),
            review_comments: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
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
            SubjectKind::Expense,
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

    /// Fetches one expense.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::ExpenseNotFound` if it does not exist.
    pub async fn find(&self, id: Uuid) -> Result<expenses::Model, WorkflowError> {
        expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::ExpenseNotFound(id))
    }

    /// Lists expenses newest-first with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: &ExpenseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<expenses::Model>, u64), WorkflowError> {
        let mut query = expenses::Entity::find();

        if let Some(owner_id) = filter.owner_id {
            query = query.filter(expenses::Column::OwnerId.eq(owner_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(expenses::Column::Status.eq(status.clone()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let items = query
            .order_by_desc(expenses::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((items, total))
    }

    /// Approves a submitted expense. No ledger effect.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` or
    /// `WorkflowError::InvalidTransition` per the workflow rules.
    pub async fn approve(
        &self,
        expense_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
        comments: Option<String>,
    ) -> Result<expenses::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let expense = Self::find_in(&txn, expense_id).await?;
        let old_status = expense.status.clone();

        let action = ExpenseWorkflow::approve(
            expense.status.to_core(),
            actor_role,
            UserId::from_uuid(actor_id),
            comments,
        )?;

        let ExpenseAction::Approve {
            new_status,
            reviewed_by,
            reviewed_at,
            comments,
        } = action
        else {
            unreachable!("approve returns an Approve action");
        };

        let mut active: expenses::ActiveModel = expense.into();
        active.status = Set(ExpenseStatus::from_core(new_status));
        active.reviewed_by = Set(Some(reviewed_by.into_inner()));
        active.review_comments = Set(comments);
        active.updated_at = Set(reviewed_at.into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        Self::audit_status_change(&txn, &updated, &old_status, actor_id).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Rejects a submitted or approved expense. Terminal, no ledger effect.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` or
    /// `WorkflowError::InvalidTransition` per the workflow rules.
    pub async fn reject(
        &self,
        expense_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
        comments: Option<String>,
    ) -> Result<expenses::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let expense = Self::find_in(&txn, expense_id).await?;
        let old_status = expense.status.clone();

        let action = ExpenseWorkflow::reject(
            expense.status.to_core(),
            actor_role,
            UserId::from_uuid(actor_id),
            comments,
        )?;

        let ExpenseAction::Reject {
            new_status,
            reviewed_by,
            reviewed_at,
            comments,
        } = action
        else {
            unreachable!("reject returns a Reject action");
        };

        let mut active: expenses::ActiveModel = expense.into();
        active.status = Set(ExpenseStatus::from_core(new_status));
        active.reviewed_by = Set(Some(reviewed_by.into_inner()));
        active.review_comments = Set(comments);
        active.updated_at = Set(reviewed_at.into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        Self::audit_status_change(&txn, &updated, &old_status, actor_id).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Finalizes an approved expense: status mutation, exactly one wallet
    /// debit, and one tally record, all in one transaction.
    ///
    /// A concurrent retry that loses the race observes the duplicate
    /// posting, rolls back, and returns the already-finalized expense.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InsufficientRole` unless the actor is an
    /// accountant, `WorkflowError::InvalidTransition` unless the expense is
    /// approved, or a ledger error for an ineligible owner.
    pub async fn finalize(
        &self,
        expense_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<expenses::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let expense = Self::find_in(&txn, expense_id).await?;
        let old_status = expense.status.clone();

        let action = ExpenseWorkflow::finalize(
            expense.status.to_core(),
            actor_role,
            UserId::from_uuid(actor_id),
        )?;

        let ExpenseAction::Finalize {
            new_status,
            finalized_by,
            finalized_at,
        } = action
        else {
            unreachable!("finalize returns a Finalize action");
        };

        let owner = users::Entity::find_by_id(expense.owner_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::Ledger(LedgerError::OwnerNotFound(
                expense.owner_id,
            )))?;

        let posting = PostingInput {
            owner: UserId::from_uuid(expense.owner_id),
            owner_role: owner.role.to_core(),
            direction: EntryDirection::Debit,
            amount: expense.total_amount,
            source_kind: SourceKind::Expense,
            source_ref: Some(expense.id),
            posted_by: UserId::from_uuid(actor_id),
            description: Some(format!(
                "Port expense - {} {}",
                expense.vehicle, expense.vehicle_number
            )),
        };

        match LedgerRepository::post_in(&txn, &posting).await {
            Ok(_) => {}
            Err(LedgerError::DuplicatePosting { .. }) => {
                // Safe retry: the debit already exists, so the expense is
                // already finalized. Undo this attempt and report success.
                txn.rollback().await.map_err(db_err)?;
                return self.find(expense_id).await;
            }
            Err(e) => return Err(e.into()),
        }

        let voucher_number = tally_voucher_number(expense.expense_no);
        let tally = tally_logs::ActiveModel {
            id: Set(TallyLogId::new().into_inner()),
            entry_kind: Set(TallyEntryKind::Expense),
            reference_id: Set(Some(expense.id)),
            tally_voucher_number: Set(voucher_number),
            amount: Set(expense.total_amount),
            description: Set(format!(
                "Port expense - {} {}",
                expense.vehicle, expense.vehicle_number
            )),
            logged_by: Set(actor_id),
            logged_at: Set(finalized_at.into()),
        };
        tally.insert(&txn).await.map_err(db_err)?;

        let mut active: expenses::ActiveModel = expense.into();
        active.status = Set(ExpenseStatus::from_core(new_status));
        active.finalized_by = Set(Some(finalized_by.into_inner()));
        active.updated_at = Set(finalized_at.into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        Self::audit_status_change(&txn, &updated, &old_status, actor_id).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Approves many expenses independently; one failure never rolls back
    /// the others.
    pub async fn bulk_approve(
        &self,
        expense_ids: &[Uuid],
        actor_id: Uuid,
        actor_role: Role,
        comments: Option<String>,
    ) -> BulkReviewResult {
        let mut results = Vec::with_capacity(expense_ids.len());
        for &id in expense_ids {
            match self.approve(id, actor_id, actor_role, comments.clone()).await {
                Ok(_) => results.push(BulkReviewItem::ok(id)),
                Err(e) => results.push(BulkReviewItem::failed(id, e)),
            }
        }
        BulkReviewResult::from_items(results)
    }

    /// Finalizes many expenses independently; one failure never rolls back
    /// the others.
    pub async fn bulk_finalize(
        &self,
        expense_ids: &[Uuid],
        actor_id: Uuid,
        actor_role: Role,
    ) -> BulkReviewResult {
        let mut results = Vec::with_capacity(expense_ids.len());
        for &id in expense_ids {
            match self.finalize(id, actor_id, actor_role).await {
                Ok(_) => results.push(BulkReviewItem::ok(id)),
                Err(e) => results.push(BulkReviewItem::failed(id, e)),
            }
        }
        BulkReviewResult::from_items(results)
    }

    async fn find_in<C: sea_orm::ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<expenses::Model, WorkflowError> {
        expenses::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::ExpenseNotFound(id))
    }

    async fn audit_status_change<C: sea_orm::ConnectionTrait>(
        conn: &C,
        updated: &expenses::Model,
        old_status: &ExpenseStatus,
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
            SubjectKind::Expense,
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
