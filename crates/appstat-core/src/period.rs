//! Period keys for time-bucketed metrics
//!
//! Active-user metrics group timestamps by a derived key rather than the
//! raw timestamp: the calendar day, the Monday that starts the ISO week,
//! or the first day of the month.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping granularity for active-user metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// All periods, finest first
    pub const ALL: [Period; 3] = [Period::Day, Period::Week, Period::Month];

    /// Derive the grouping key of `timestamp`
    ///
    /// # Examples
    /// ```
    /// use appstat_core::period::Period;
    /// use chrono::NaiveDate;
    ///
    /// // Thursday 2024-05-16
    /// let ts = NaiveDate::from_ymd_opt(2024, 5, 16).unwrap().and_hms_opt(18, 30, 0).unwrap();
    /// assert_eq!(Period::Day.key(&ts), NaiveDate::from_ymd_opt(2024, 5, 16).unwrap());
    /// assert_eq!(Period::Week.key(&ts), NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
    /// assert_eq!(Period::Month.key(&ts), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    /// ```
    pub fn key(&self, timestamp: &NaiveDateTime) -> NaiveDate {
        self.key_for_date(timestamp.date())
    }

    /// Derive the grouping key of a calendar date
    pub fn key_for_date(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => {
                let offset = date.weekday().num_days_from_monday();
                date - chrono::Duration::days(i64::from(offset))
            }
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Short metric name (DAU / WAU / MAU)
    pub fn metric_name(&self) -> &'static str {
        match self {
            Period::Day => "DAU",
            Period::Week => "WAU",
            Period::Month => "MAU",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day => write!(f, "daily"),
            Period::Week => write!(f, "weekly"),
            Period::Month => write!(f, "monthly"),
        }
    }
}

/// Days of the week in chart order
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// English day name
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// `YYYY-MM` label of a date
pub fn year_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
