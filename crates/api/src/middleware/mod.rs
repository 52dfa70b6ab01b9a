//! Request middleware.

pub mod identity;

pub use identity::{Actor, identity_middleware};
