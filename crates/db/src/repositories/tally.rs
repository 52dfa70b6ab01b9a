//! Tally log repository.
//!
//! Expense and voucher tally entries are created by their workflow
//! repositories; this repository serves reads and the manual/revenue
//! entries accountants create directly.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use thiserror::Error;
use uuid::Uuid;

use portledger_shared::types::{PageRequest, TallyLogId};

use crate::entities::{sea_orm_active_enums::TallyEntryKind, tally_logs};

/// Error types for tally log operations.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Expense and voucher entries are created by their workflows only.
    #[error("Entry kind {0:?} is reserved for workflow postings")]
    ReservedKind(TallyEntryKind),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl TallyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ReservedKind(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ReservedKind(_) => "RESERVED_ENTRY_KIND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for a manually created tally entry.
#[derive(Debug, Clone)]
pub struct CreateTallyEntryInput {
    /// Entry kind; only `manual` and `revenue` are accepted here.
    pub entry_kind: TallyEntryKind,
    /// The external voucher number.
    pub tally_voucher_number: String,
    /// Entry amount.
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// The accountant or admin creating the entry.
    pub logged_by: Uuid,
}

/// Filter options for listing tally entries.
#[derive(Debug, Clone, Default)]
pub struct TallyFilter {
    /// Filter by entry kind.
    pub entry_kind: Option<TallyEntryKind>,
    /// Entries logged at or after this time.
    pub from: Option<DateTime<FixedOffset>>,
    /// Entries logged at or before this time.
    pub to: Option<DateTime<FixedOffset>>,
}

/// Tally log repository.
#[derive(Debug, Clone)]
pub struct TallyRepository {
    db: DatabaseConnection,
}

impl TallyRepository {
    /// Creates a new tally repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a manual or revenue tally entry.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::ReservedKind` for expense or voucher kinds;
    /// those are created by the workflow repositories.
    pub async fn create_manual(
        &self,
        input: CreateTallyEntryInput,
    ) -> Result<tally_logs::Model, TallyError> {
        if matches!(
            input.entry_kind,
            TallyEntryKind::Expense | TallyEntryKind::Voucher
        ) {
            return Err(TallyError::ReservedKind(input.entry_kind));
        }

        let active = tally_logs::ActiveModel {
            id: Set(TallyLogId::new().into_inner()),
            entry_kind: Set(input.entry_kind.clone()),
            reference_id: Set(None),
            tally_voucher_number: Set(input.tally_voucher_number.clone()),
            amount: Set(input.amount),
            description: Set(input.description.clone()),
            logged_by: Set(input.logged_by),
            logged_at: Set(chrono::Utc::now().into()),
        };

        active.insert(&self.db).await.map_err(db_err)
    }

    /// Lists tally entries newest-first with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: &TallyFilter,
        page: &PageRequest,
    ) -> Result<(Vec<tally_logs::Model>, u64), TallyError> {
        let mut query = tally_logs::Entity::find();

        if let Some(kind) = &filter.entry_kind {
            query = query.filter(tally_logs::Column::EntryKind.eq(kind.clone()));
        }
        if let Some(from) = filter.from {
            query = query.filter(tally_logs::Column::LoggedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(tally_logs::Column::LoggedAt.lte(to));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let items = query
            .order_by_desc(tally_logs::Column::LoggedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((items, total))
    }

}

fn db_err(e: sea_orm::DbErr) -> TallyError {
    TallyError::Database(e.to_string())
}
