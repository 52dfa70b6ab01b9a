//! Equipment usage cost derivation.
//!
//! When a usage record is closed, the engine derives the billable quantity
//! from the elapsed interval and the contract type, resolves a rate when
//! none is set, and computes the total without floating-point arithmetic.

pub mod engine;
pub mod error;

pub use engine::{ContractType, CostEngine, DerivedCost};
pub use error::EquipmentError;
