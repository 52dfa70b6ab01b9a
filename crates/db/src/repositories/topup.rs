//! Wallet top-up repository.
//!
//! A top-up inserts its own record and exactly one ledger credit in a
//! single transaction. Accountant recipients are rejected by the ledger's
//! owner eligibility rule before anything is written.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use portledger_core::ledger::{EntryDirection, LedgerError, PostingInput, SourceKind};
use portledger_shared::types::{TopUpId, UserId};

use crate::entities::{users, wallet_topups};
use crate::repositories::ledger::LedgerRepository;

/// Input for crediting a user's wallet.
#[derive(Debug, Clone)]
pub struct CreateTopUpInput {
    /// The wallet owner to credit.
    pub user_id: Uuid,
    /// Amount to credit.
    pub amount: Decimal,
    /// Payment method (imps, neft, cash, cheque, others).
    pub payment_method: String,
    /// Optional bank reference number.
    pub reference_number: Option<String>,
    /// Optional remarks.
    pub remarks: Option<String>,
    /// The accountant or admin performing the top-up.
    pub topped_up_by: Uuid,
}

/// Wallet top-up repository.
#[derive(Debug, Clone)]
pub struct TopUpRepository {
    db: DatabaseConnection,
}

impl TopUpRepository {
    /// Creates a new top-up repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a top-up and posts its wallet credit.
    ///
    /// # Errors
    ///
    /// * `LedgerError::OwnerNotFound` for an unknown recipient
    /// * `LedgerError::IneligibleOwner` if the recipient is an accountant
    /// * `LedgerError::NegativeAmount` for a negative amount
    pub async fn create(
        &self,
        input: CreateTopUpInput,
    ) -> Result<wallet_topups::Model, LedgerError> {
        let owner = users::Entity::find_by_id(input.user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::OwnerNotFound(input.user_id))?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let topup_id = TopUpId::new().into_inner();
        let now = chrono::Utc::now().into();

        let topup = wallet_topups::ActiveModel {
            id: Set(topup_id),
            user_id: Set(input.user_id),
            amount: Set(input.amount),
            payment_method: Set(input.payment_method.clone()),
            reference_number: Set(input.reference_number.clone()),
            remarks: Set(input.remarks.clone()),
            topped_up_by: Set(input.topped_up_by),
            created_at: Set(now),
        };

        let posting = PostingInput {
            owner: UserId::from_uuid(input.user_id),
            owner_role: owner.role.to_core(),
            direction: EntryDirection::Credit,
            amount: input.amount,
            source_kind: SourceKind::Topup,
            source_ref: Some(topup_id),
            posted_by: UserId::from_uuid(input.topped_up_by),
            description: Some(format!("Wallet top-up via {}", input.payment_method)),
        };

        // Eligibility and amount are validated by the posting; run it
        // before the insert so nothing is written on failure.
        LedgerRepository::post_in(&txn, &posting).await?;
        let model = topup.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(model)
    }
}

fn db_err(e: sea_orm::DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}
