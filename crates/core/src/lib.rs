//! Core business logic for Portledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `access` - Role-capability table consulted by every workflow operation
//! - `ledger` - Per-user wallet ledger posting and balance rules
//! - `workflow` - Expense and voucher approval state machines
//! - `equipment` - Billable quantity and cost derivation for equipment usage
//! - `rates` - Rate rule resolution for usage pricing
//! - `audit` - Change tracking types and retention policy

pub mod access;
pub mod audit;
pub mod equipment;
pub mod ledger;
pub mod rates;
pub mod workflow;
