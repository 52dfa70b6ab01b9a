//! `SeaORM` Entity for the wallet ledger entries table.
//!
//! Entries are append-only; `seq` is a database sequence breaking ties
//! between entries posted at the same timestamp. The partial unique index
//! on (owner_id, source_kind, source_ref) backs the idempotency guard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntryDirection, LedgerSourceKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub seq: i64,
    pub owner_id: Uuid,
    pub direction: EntryDirection,
    pub amount: Decimal,
    pub source_kind: LedgerSourceKind,
    pub source_ref: Option<Uuid>,
    pub posted_by: Uuid,
    pub description: Option<String>,
    pub balance_after: Decimal,
    pub posted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
