//! `SeaORM` entity definitions.

pub mod audit_logs;
pub mod expenses;
pub mod ledger_entries;
pub mod parties;
pub mod rate_rules;
pub mod sea_orm_active_enums;
pub mod tally_logs;
pub mod usage_records;
pub mod users;
pub mod vehicle_types;
pub mod vouchers;
pub mod wallet_topups;
pub mod work_types;
