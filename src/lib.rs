//! appstat - Analytics over exported mobile app CSV snapshots
//!
//! This library provides functionality to:
//! - Load the CSV tables of an export snapshot into typed records
//! - Filter them by country, device and date range
//! - Compute retention, conversion, DAU/WAU/MAU and distribution metrics
//! - Render the results as terminal tables, JSON or a markdown narrative
//! - Flatten document collections into the CSV files it reads
//!
//! # Examples
//!
//! ```no_run
//! use appstat::{
//!     dashboard::{Dashboard, View},
//!     filters::FilterConfig,
//!     timezone::TimezoneConfig,
//! };
//! use appstat_loader::DataLoader;
//!
//! #[tokio::main]
//! async fn main() -> appstat::Result<()> {
//!     let loader = DataLoader::new("exports/latest")?;
//!     let data = loader.load(&View::Audience.tables()).await?;
//!
//!     let filter = FilterConfig::new().with_country("France");
//!     let report = Dashboard::new(TimezoneConfig::default()).audience(&data, &filter);
//!     println!("retention: {:.2}%", report.retention_rate);
//!
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod commands;
pub mod dashboard;

// Re-export the core modules under the crate root
pub use appstat_core::{aggregation_types, error, filters, period, timezone, town, types};

// Re-export commonly used types
pub use appstat_core::{AppstatError, DateRange, Dataset, Device, FilterConfig, Period, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
