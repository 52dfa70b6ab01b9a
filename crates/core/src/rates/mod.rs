//! Rate rule resolution for usage pricing.

pub mod resolver;

pub use resolver::{RateKey, RateResolver, RateRule};
