//! Core types, filters and utilities for appstat
//!
//! This crate provides the typed record tables, the error type, the
//! filter engine, period-key derivation, town normalization, timezone
//! handling and the report data structures shared by the other appstat
//! crates.

pub mod aggregation_types;
pub mod error;
pub mod filters;
pub mod period;
pub mod timezone;
pub mod town;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{AppstatError, Result};
pub use filters::{DateRange, FilterConfig};
pub use period::Period;
pub use types::{Dataset, Device, ProviderId, Table, UserId};
