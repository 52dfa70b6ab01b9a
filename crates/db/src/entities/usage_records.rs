//! `SeaORM` Entity for the equipment usage records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ContractType, UsageStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub party_id: Uuid,
    pub vehicle_type_id: Uuid,
    pub work_type_id: Uuid,
    pub vehicle_number: String,
    pub contract_type: ContractType,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: Option<DateTimeWithTimeZone>,
    pub duration_hours: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub total: Option<Decimal>,
    pub comments: Option<String>,
    pub status: UsageStatus,
    pub created_by: Uuid,
    pub ended_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parties::Entity",
        from = "Column::PartyId",
        to = "super::parties::Column::Id"
    )]
    Parties,
    #[sea_orm(
        belongs_to = "super::vehicle_types::Entity",
        from = "Column::VehicleTypeId",
        to = "super::vehicle_types::Column::Id"
    )]
    VehicleTypes,
    #[sea_orm(
        belongs_to = "super::work_types::Entity",
        from = "Column::WorkTypeId",
        to = "super::work_types::Column::Id"
    )]
    WorkTypes,
}

impl Related<super::parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
