//! Error types for appstat
//!
//! This module defines the error types used throughout the appstat crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Missing columns are deliberately absent from this enum: they are reported
//! as warnings on the affected report section, never as errors.
//!
//! # Example
//!
//! ```
//! use appstat_core::error::{AppstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to AppstatError
//!     let _file = std::fs::read_to_string("nonexistent.csv")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for appstat operations
#[derive(Error, Debug)]
pub enum AppstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An input file could not be opened
    #[error("Cannot read {file}: {source}")]
    Source {
        /// The file that could not be read
        file: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Malformed timestamp rejected in strict mode
    #[error("Invalid timestamp in {file} line {line}, column '{column}': '{value}'")]
    Timestamp {
        /// The file that contains the value
        file: PathBuf,
        /// 1-based line number, header included
        line: usize,
        /// Column name
        column: String,
        /// The raw cell content
        value: String,
    },

    /// Malformed visited-pages list literal
    #[error("Invalid visited_pages literal in {file} line {line}: {error}")]
    PageList {
        /// The file that contains the value
        file: PathBuf,
        /// 1-based line number, header included
        line: usize,
        /// Decoder message
        error: String,
    },

    /// Invalid date format or range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bulk export failure
    #[error("Export error: {0}")]
    Export(String),
}

/// Convenience type alias for Results in appstat
///
/// # Example
///
/// ```
/// use appstat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, AppstatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppstatError::Timestamp {
            file: PathBuf::from("users.csv"),
            line: 4,
            column: "creationTime".to_string(),
            value: "yesterday".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid timestamp in users.csv line 4, column 'creationTime': 'yesterday'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let appstat_error: AppstatError = io_error.into();
        assert!(matches!(appstat_error, AppstatError::Io(_)));
    }
}
