//! Role-based access control.
//!
//! A single authoritative role-capability table replaces the per-module
//! permission lists of earlier revisions. Every workflow operation consults
//! this table and nothing else.

pub mod capability;
pub mod role;

pub use capability::Capability;
pub use role::Role;
