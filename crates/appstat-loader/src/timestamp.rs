//! Timestamp parsing for exported CSV cells
//!
//! Exports mix RFC 3339 strings, space-separated date-times with or without
//! an offset, and bare dates. Values carrying an offset are converted to UTC
//! and made naive; everything else is taken as-is.

use appstat_core::error::{AppstatError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;

/// How unparsable timestamps are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampMode {
    /// Unparsable values become null
    #[default]
    Lenient,
    /// Unparsable values abort loading
    Strict,
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a trimmed, non-empty cell
///
/// # Examples
/// ```
/// use appstat_loader::timestamp::parse_timestamp;
///
/// let ts = parse_timestamp("2024-05-01T10:00:00+02:00").unwrap();
/// assert_eq!(ts.to_string(), "2024-05-01 08:00:00");
/// assert!(parse_timestamp("2024-05-01").is_some());
/// assert!(parse_timestamp("last tuesday").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.naive_utc());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

/// Parse an optional cell according to `mode`
///
/// An empty or absent cell is null in both modes.
pub fn parse_cell(
    cell: Option<&str>,
    mode: TimestampMode,
    file: &Path,
    line: usize,
    column: &str,
) -> Result<Option<NaiveDateTime>> {
    let Some(value) = cell else {
        return Ok(None);
    };

    match (parse_timestamp(value), mode) {
        (Some(ts), _) => Ok(Some(ts)),
        (None, TimestampMode::Lenient) => {
            tracing::debug!(file = %file.display(), line, column, value, "Unparsable timestamp");
            Ok(None)
        }
        (None, TimestampMode::Strict) => Err(AppstatError::Timestamp {
            file: file.to_path_buf(),
            line,
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-15 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 09:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 09:30:00.250000").map(|t| t.date()), Some(expected.date()));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_modes() {
        let file = Path::new("sessions_with_pages_true.csv");
        assert_eq!(
            parse_cell(None, TimestampMode::Strict, file, 2, "session_start").unwrap(),
            None
        );
        assert_eq!(
            parse_cell(Some("soon"), TimestampMode::Lenient, file, 2, "session_start").unwrap(),
            None
        );
        let err = parse_cell(Some("soon"), TimestampMode::Strict, file, 7, "session_start")
            .unwrap_err();
        assert!(matches!(err, AppstatError::Timestamp { line: 7, .. }));
    }
}
