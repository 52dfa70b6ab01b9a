//! Equipment usage repository.
//!
//! Starting a record validates its master-data references; ending it runs
//! the cost engine, resolving a rate from the rate table only when none
//! was set at start. A rate, once set, is never overwritten.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use portledger_core::audit::{AuditAction, ChangeSet, FieldChange, SubjectKind};
use portledger_core::equipment::{ContractType, CostEngine, EquipmentError};
use portledger_core::rates::{RateKey, RateResolver, RateRule};
use portledger_shared::types::{
    PageRequest, PartyId, RateRuleId, UsageRecordId, VehicleTypeId, WorkTypeId,
};

use crate::entities::{
    parties, rate_rules,
    sea_orm_active_enums::{self, UsageStatus},
    usage_records, vehicle_types, work_types,
};
use crate::repositories::audit::AuditRepository;

/// Input for starting an equipment usage record.
#[derive(Debug, Clone)]
pub struct StartUsageInput {
    /// The counterparty hiring out the equipment.
    pub party_id: Uuid,
    /// The vehicle type.
    pub vehicle_type_id: Uuid,
    /// The work type.
    pub work_type_id: Uuid,
    /// Vehicle registration number (normalized to upper case).
    pub vehicle_number: String,
    /// Billing contract type.
    pub contract_type: ContractType,
    /// When usage started.
    pub start_time: DateTime<FixedOffset>,
    /// A pre-agreed rate; left unset to resolve from the rate table at
    /// completion.
    pub rate: Option<Decimal>,
    /// Optional comments.
    pub comments: Option<String>,
    /// The user starting the record.
    pub created_by: Uuid,
}

/// Input for ending an equipment usage record.
#[derive(Debug, Clone)]
pub struct EndUsageInput {
    /// When usage ended; defaults to now.
    pub end_time: Option<DateTime<FixedOffset>>,
    /// Explicit quantity (required for tonnes contracts).
    pub quantity: Option<Decimal>,
    /// Closing comments.
    pub comments: Option<String>,
    /// The user ending the record.
    pub ended_by: Uuid,
}

/// Filter options for listing usage records.
#[derive(Debug, Clone, Default)]
pub struct UsageFilter {
    /// Filter by status.
    pub status: Option<UsageStatus>,
    /// Restrict to one counterparty.
    pub party_id: Option<Uuid>,
}

/// Equipment usage repository.
#[derive(Debug, Clone)]
pub struct EquipmentRepository {
    db: DatabaseConnection,
}

impl EquipmentRepository {
    /// Creates a new equipment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Starts a usage record in `running` status.
    ///
    /// # Errors
    ///
    /// Returns `EquipmentError::UnknownReference` for a dangling
    /// party/vehicle-type/work-type id.
    pub async fn start(
        &self,
        input: StartUsageInput,
    ) -> Result<usage_records::Model, EquipmentError> {
        self.validate_references(&input).await?;

        let now = Utc::now().into();
        let active = usage_records::ActiveModel {
            id: Set(UsageRecordId::new().into_inner()),
            party_id: Set(input.party_id),
            vehicle_type_id: Set(input.vehicle_type_id),
            work_type_id: Set(input.work_type_id),
            vehicle_number: Set(CostEngine::normalize_vehicle_number(&input.vehicle_number)),
            contract_type: Set(sea_orm_active_enums::ContractType::from_core(
                input.contract_type,
            )),
            start_time: Set(input.start_time),
            end_time: Set(None),
            duration_hours: Set(None),
            quantity: Set(None),
            rate: Set(input.rate),
            total: Set(None),
            comments: Set(input.comments.clone()),
            status: Set(UsageStatus::Running),
            created_by: Set(input.created_by),
            ended_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active.insert(&self.db).await.map_err(db_err)
    }

    /// Fetches one usage record.
    ///
    /// # Errors
    ///
    /// Returns `EquipmentError::NotFound` if it does not exist.
    pub async fn find(&self, id: Uuid) -> Result<usage_records::Model, EquipmentError> {
        usage_records::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(EquipmentError::NotFound(id))
    }

    /// Lists usage records newest-first with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: &UsageFilter,
        page: &PageRequest,
    ) -> Result<(Vec<usage_records::Model>, u64), EquipmentError> {
        let mut query = usage_records::Entity::find();

        if let Some(status) = &filter.status {
            query = query.filter(usage_records::Column::Status.eq(status.clone()));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(usage_records::Column::PartyId.eq(party_id));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let items = query
            .order_by_desc(usage_records::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((items, total))
    }

    /// Ends a running usage record and derives its billable cost.
    ///
    /// The quantity comes from the contract type (tonnes contracts need an
    /// explicit quantity). If no rate was set at start, the rate table is
    /// consulted; with no match the rate and total stay unset for manual
    /// pricing later.
    ///
    /// # Errors
    ///
    /// * `EquipmentError::NotFound` for an unknown record
    /// * `EquipmentError::NotRunning` if the record is already completed
    /// * `EquipmentError::InvalidInterval` if the end precedes the start
    /// * `EquipmentError::MissingQuantity` for a tonnes contract without a
    ///   positive quantity
    pub async fn end(
        &self,
        id: Uuid,
        input: EndUsageInput,
    ) -> Result<usage_records::Model, EquipmentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let record = usage_records::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(EquipmentError::NotFound(id))?;

        if record.status != UsageStatus::Running {
            return Err(EquipmentError::NotRunning(id));
        }

        let contract_type = record.contract_type.to_core();
        let end_time = input.end_time.unwrap_or_else(|| Utc::now().into());

        let rate = match record.rate {
            Some(rate) => Some(rate),
            None => Self::resolve_rate(&txn, &record, contract_type).await?,
        };

        let cost = CostEngine::derive(
            contract_type,
            record.start_time.with_timezone(&Utc),
            end_time.with_timezone(&Utc),
            input.quantity,
            rate,
        )?;

        let mut active: usage_records::ActiveModel = record.into();
        active.end_time = Set(Some(end_time));
        active.duration_hours = Set(Some(cost.duration_hours));
        active.quantity = Set(Some(cost.quantity));
        active.rate = Set(cost.rate);
        active.total = Set(cost.total);
        active.status = Set(UsageStatus::Completed);
        active.ended_by = Set(Some(input.ended_by));
        if input.comments.is_some() {
            active.comments = Set(input.comments.clone());
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        let mut changes = ChangeSet::new();
        changes.insert(
            "status".to_string(),
            FieldChange {
                old: Some(json!("running")),
                new: json!("completed"),
            },
        );
        AuditRepository::record_in(
            &txn,
            SubjectKind::UsageRecord,
            updated.id,
            AuditAction::StatusChanged,
            &changes,
            Some(input.ended_by),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    async fn resolve_rate<C: sea_orm::ConnectionTrait>(
        conn: &C,
        record: &usage_records::Model,
        contract_type: ContractType,
    ) -> Result<Option<Decimal>, EquipmentError> {
        let candidates = rate_rules::Entity::find()
            .filter(rate_rules::Column::PartyId.eq(record.party_id))
            .filter(rate_rules::Column::VehicleTypeId.eq(record.vehicle_type_id))
            .filter(rate_rules::Column::WorkTypeId.eq(record.work_type_id))
            .filter(
                rate_rules::Column::ContractType
                    .eq(sea_orm_active_enums::ContractType::from_core(contract_type)),
            )
            .filter(rate_rules::Column::IsActive.eq(true))
            .all(conn)
            .await
            .map_err(db_err)?;

        let rules: Vec<RateRule> = candidates
            .into_iter()
            .map(|rule| RateRule {
                id: RateRuleId::from_uuid(rule.id),
                party: PartyId::from_uuid(rule.party_id),
                vehicle_type: VehicleTypeId::from_uuid(rule.vehicle_type_id),
                work_type: WorkTypeId::from_uuid(rule.work_type_id),
                contract_type: rule.contract_type.to_core(),
                rate: rule.rate,
                effective_date: rule.effective_date,
                is_active: rule.is_active,
            })
            .collect();

        let key = RateKey {
            party: PartyId::from_uuid(record.party_id),
            vehicle_type: VehicleTypeId::from_uuid(record.vehicle_type_id),
            work_type: WorkTypeId::from_uuid(record.work_type_id),
            contract_type,
        };

        Ok(RateResolver::resolve(
            &rules,
            &key,
            record.start_time.date_naive(),
        ))
    }

    async fn validate_references(&self, input: &StartUsageInput) -> Result<(), EquipmentError> {
        if parties::Entity::find_by_id(input.party_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_none()
        {
            return Err(EquipmentError::UnknownReference {
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
            return Err(EquipmentError::UnknownReference {
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
            return Err(EquipmentError::UnknownReference {
                kind: "work_type",
                id: input.work_type_id,
            });
        }
        Ok(())
    }
}

fn db_err(e: sea_orm::DbErr) -> EquipmentError {
    EquipmentError::Database(e.to_string())
}
