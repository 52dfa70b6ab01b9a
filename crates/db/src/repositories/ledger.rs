//! Wallet ledger repository.
//!
//! Postings are append-only. Each posting runs in a transaction that locks
//! the owner's ledger tail, re-checks the idempotency guard, and inserts
//! the entry the core service prepares; the partial unique index on
//! (owner_id, source_kind, source_ref) backs the guard at the database
//! level.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use portledger_core::ledger::{LedgerError, LedgerService, PostingInput};
use portledger_shared::types::PageRequest;

use crate::entities::{
    ledger_entries,
    sea_orm_active_enums::{EntryDirection, LedgerSourceKind},
    users,
};

/// Filter options for listing ledger entries.
#[derive(Debug, Clone, Default)]
pub struct LedgerEntryFilter {
    /// Restrict to one owner.
    pub owner_id: Option<Uuid>,
    /// Entries posted at or after this time.
    pub from: Option<DateTime<FixedOffset>>,
    /// Entries posted at or before this time.
    pub to: Option<DateTime<FixedOffset>>,
}

/// Wallet ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts one wallet ledger entry in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IneligibleOwner`, `LedgerError::NegativeAmount`,
    /// or `LedgerError::DuplicatePosting` per the core posting rules.
    pub async fn post(&self, input: &PostingInput) -> Result<ledger_entries::Model, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let entry = Self::post_in(&txn, input).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(entry)
    }

    /// Posts one wallet ledger entry inside the caller's transaction.
    ///
    /// Workflow repositories use this so the status mutation and the
    /// posting commit or roll back together.
    ///
    /// # Errors
    ///
    /// Same as [`Self::post`].
    pub async fn post_in<C: ConnectionTrait>(
        conn: &C,
        input: &PostingInput,
    ) -> Result<ledger_entries::Model, LedgerError> {
        // Lock the owner's ledger tail so concurrent postings serialize
        // per owner and balance_after never reads a stale entry.
        let latest = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::OwnerId.eq(input.owner.into_inner()))
            .order_by_desc(ledger_entries::Column::PostedAt)
            .order_by_desc(ledger_entries::Column::Seq)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_err)?;

        let duplicate_exists = match input.source_ref {
            Some(source_ref) => {
                ledger_entries::Entity::find()
                    .filter(ledger_entries::Column::OwnerId.eq(input.owner.into_inner()))
                    .filter(
                        ledger_entries::Column::SourceKind
                            .eq(LedgerSourceKind::from_core(input.source_kind)),
                    )
                    .filter(ledger_entries::Column::SourceRef.eq(source_ref))
                    .count(conn)
                    .await
                    .map_err(db_err)?
                    > 0
            }
            None => false,
        };

        let prepared = LedgerService::prepare_posting(
            input,
            latest.map(|entry| entry.balance_after),
            duplicate_exists,
        )?;

        let active = ledger_entries::ActiveModel {
            id: Set(prepared.id.into_inner()),
            owner_id: Set(input.owner.into_inner()),
            direction: Set(EntryDirection::from_core(input.direction)),
            amount: Set(input.amount),
            source_kind: Set(LedgerSourceKind::from_core(input.source_kind)),
            source_ref: Set(input.source_ref),
            posted_by: Set(input.posted_by.into_inner()),
            description: Set(input.description.clone()),
            balance_after: Set(prepared.balance_after),
            posted_at: Set(prepared.posted_at.into()),
            ..Default::default()
        };

        active.insert(conn).await.map_err(db_err)
    }

    /// Returns the current wallet balance for a user.
    ///
    /// Accountants always read zero; other users read the latest entry's
    /// `balance_after`, or zero for an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::OwnerNotFound` for an unknown user.
    pub async fn get_balance(&self, owner_id: Uuid) -> Result<Decimal, LedgerError> {
        let owner = users::Entity::find_by_id(owner_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::OwnerNotFound(owner_id))?;

        let owner_role = owner.role.to_core();
        if owner_role == portledger_core::access::Role::Accountant {
            return Ok(LedgerService::balance_for(owner_role, None));
        }

        let latest = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::OwnerId.eq(owner_id))
            .order_by_desc(ledger_entries::Column::PostedAt)
            .order_by_desc(ledger_entries::Column::Seq)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(LedgerService::balance_for(
            owner_role,
            latest.map(|entry| entry.balance_after),
        ))
    }

    /// Lists ledger entries newest-first with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_entries(
        &self,
        filter: &LedgerEntryFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ledger_entries::Model>, u64), LedgerError> {
        let mut query = ledger_entries::Entity::find();

        if let Some(owner_id) = filter.owner_id {
            query = query.filter(ledger_entries::Column::OwnerId.eq(owner_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(ledger_entries::Column::PostedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(ledger_entries::Column::PostedAt.lte(to));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let entries = query
            .order_by_desc(ledger_entries::Column::PostedAt)
            .order_by_desc(ledger_entries::Column::Seq)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((entries, total))
    }
}

fn db_err(e: sea_orm::DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}
