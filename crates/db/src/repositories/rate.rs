//! Equipment rate rule repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use thiserror::Error;
use uuid::Uuid;

use portledger_core::equipment::ContractType;
use portledger_shared::types::{PageRequest, RateRuleId};

use crate::entities::{parties, rate_rules, sea_orm_active_enums, vehicle_types, work_types};

/// Error types for rate rule operations.
#[derive(Debug, Error)]
pub enum RateError {
    /// A master-data reference does not exist.
    #[error("Unknown {kind} reference {id}")]
    UnknownReference {
        /// The referenced table.
        kind: &'static str,
        /// The dangling id.
        id: Uuid,
    },

    /// A rule with the same key and effective date already exists.
    #[error("A rate rule for this key and effective date already exists")]
    DuplicateRule,

    /// Rate must be non-negative.
    #[error("Rate must be non-negative")]
    NegativeRate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RateError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownReference { .. } => 404,
            Self::DuplicateRule => 409,
            Self::NegativeRate => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            Self::DuplicateRule => "DUPLICATE_RULE",
            Self::NegativeRate => "NEGATIVE_RATE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for creating a rate rule.
#[derive(Debug, Clone)]
pub struct CreateRateRuleInput {
    /// The counterparty.
    pub party_id: Uuid,
    /// The vehicle type.
    pub vehicle_type_id: Uuid,
    /// The work type.
    pub work_type_id: Uuid,
    /// The contract type.
    pub contract_type: ContractType,
    /// The unit rate.
    pub rate: Decimal,
    /// First date the rate applies.
    pub effective_date: NaiveDate,
    /// The user creating the rule.
    pub created_by: Uuid,
}

/// Filter options for listing rate rules.
#[derive(Debug, Clone, Default)]
pub struct RateFilter {
    /// Restrict to one counterparty.
    pub party_id: Option<Uuid>,
    /// Restrict to one contract type.
    pub contract_type: Option<ContractType>,
    /// Include inactive rules.
    pub include_inactive: bool,
}

/// Equipment rate rule repository.
#[derive(Debug, Clone)]
pub struct RateRepository {
    db: DatabaseConnection,
}

impl RateRepository {
    /// Creates a new rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a rate rule.
    ///
    /// # Errors
    ///
    /// * `RateError::UnknownReference` for a dangling master-data id
    /// * `RateError::DuplicateRule` when the unique key already exists
    /// * `RateError::NegativeRate` for a negative rate
    pub async fn create(
        &self,
        input: CreateRateRuleInput,
    ) -> Result<rate_rules::Model, RateError> {
        if input.rate < Decimal::ZERO {
            return Err(RateError::NegativeRate);
        }
        self.validate_references(&input).await?;

        let existing = rate_rules::Entity::find()
            .filter(rate_rules::Column::PartyId.eq(input.party_id))
            .filter(rate_rules::Column::VehicleTypeId.eq(input.vehicle_type_id))
            .filter(rate_rules::Column::WorkTypeId.eq(input.work_type_id))
            .filter(
                rate_rules::Column::ContractType
                    .eq(sea_orm_active_enums::ContractType::from_core(input.contract_type)),
            )
            .filter(rate_rules::Column::EffectiveDate.eq(input.effective_date))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if existing > 0 {
            return Err(RateError::DuplicateRule);
        }

        let active = rate_rules::ActiveModel {
            id: Set(RateRuleId::new().into_inner()),
            party_id: Set(input.party_id),
            vehicle_type_id: Set(input.vehicle_type_id),
            work_type_id: Set(input.work_type_id),
            contract_type: Set(sea_orm_active_enums::ContractType::from_core(
                input.contract_type,
            )),
            rate: Set(input.rate),
            effective_date: Set(input.effective_date),
            is_active: Set(true),
            created_by: Set(input.created_by),
            created_at: Set(chrono::Utc::now().into()),
        };

        active.insert(&self.db).await.map_err(db_err)
    }

    /// Lists rate rules with pagination, newest effective date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: &RateFilter,
        page: &PageRequest,
    ) -> Result<(Vec<rate_rules::Model>, u64), RateError> {
        let mut query = rate_rules::Entity::find();

        if let Some(party_id) = filter.party_id {
            query = query.filter(rate_rules::Column::PartyId.eq(party_id));
        }
        if let Some(contract_type) = filter.contract_type {
            query = query.filter(
                rate_rules::Column::ContractType
                    .eq(sea_orm_active_enums::ContractType::from_core(contract_type)),
            );
        }
        if !filter.include_inactive {
            query = query.filter(rate_rules::Column::IsActive.eq(true));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let items = query
            .order_by_desc(rate_rules::Column::EffectiveDate)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((items, total))
    }

    async fn validate_references(&self, input: &CreateRateRuleInput) -> Result<(), RateError> {
        if parties::Entity::find_by_id(input.party_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_none()
        {
            return Err(RateError::UnknownReference {
                kind: "party",
                id: input.party_id,
            });
        }
        if vehicle_types::Entity::find_by_id(input.vehicle_type_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_none()
        {
            return Err(RateError::UnknownReference {
                kind: "vehicle_type",
                id: input.vehicle_type_id,
            });
        }
        if work_types::Entity::find_by_id(input.work_type_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_none()
        {
            return Err(RateError::UnknownReference {
                kind: "work_type",
                id: input.work_type_id,
            });
        }
        Ok(())
    }
}

fn db_err(e: sea_orm::DbErr) -> RateError {
    RateError::Database(e.to_string())
}
