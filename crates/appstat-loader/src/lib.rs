//! CSV record loader for appstat
//!
//! Reads the six exported CSV files of a snapshot directory into typed
//! tables. Timestamp parsing can be lenient or strict per table, and the
//! visited-pages list literal is decoded into a `Vec<String>` here so that
//! nothing downstream ever sees the string form.

pub mod data_loader;
pub mod page_list;
pub mod timestamp;

pub use data_loader::{DataLoader, LoadOptions, TableKind};
pub use timestamp::TimestampMode;
