//! `SeaORM` Entity for the port expenses table.
//!
//! `expense_no` is a database sequence used to build the deterministic
//! tally voucher number at finalization.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ExpenseStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_no: i64,
    pub owner_id: Uuid,
    pub date_time: DateTimeWithTimeZone,
    pub vehicle: String,
    pub vehicle_number: String,
    pub gate: String,
    pub in_out: String,
    pub description: String,
    pub cisf_amount: Decimal,
    pub kpt_amount: Decimal,
    pub customs_amount: Decimal,
    pub road_tax_days: i32,
    pub road_tax_amount: Decimal,
    pub other_charges: Decimal,
    pub total_amount: Decimal,
    pub photo_ref: Option<String>,
    pub status: ExpenseStatus,
    pub reviewed_by: Option<Uuid>,
    pub finalized_by: Option<Uuid>,
    pub review_comments: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
