//! `SeaORM` Entity for the tally logs table.
//!
//! One row per entry pushed to the external bookkeeping system. The
//! partial unique index on (entry_kind, reference_id) keeps expense and
//! voucher entries exactly-once.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TallyEntryKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tally_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entry_kind: TallyEntryKind,
    pub reference_id: Option<Uuid>,
    pub tally_voucher_number: String,
    pub amount: Decimal,
    pub description: String,
    pub logged_by: Uuid,
    pub logged_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
