//! Aggregation data types for appstat
//!
//! Pure data structures produced by the metric aggregator and consumed by
//! the formatters. Optional sections are `None` when a missing-column guard
//! skipped them; the reason is listed in the report's `warnings`.

use crate::error::AppstatError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of a value-count table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
}

impl CountRow {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// A ranked user or provider joined with its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub id: String,
    pub name: String,
    pub count: usize,
}

/// Session count of one observed period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCount {
    /// Period key: the day, the Monday of the week or the first of the month
    pub period_start: NaiveDate,
    pub count: usize,
}

/// Mean session count per observed day, week and month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveUsers {
    pub dau: f64,
    pub wau: f64,
    pub mau: f64,
}

/// Users bucketed by their number of sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencySegments {
    /// Exactly one session
    pub daily: usize,
    /// Two to seven sessions
    pub weekly: usize,
    /// More than seven sessions
    pub monthly: usize,
}

impl FrequencySegments {
    /// Users with at least one session
    pub fn total(&self) -> usize {
        self.daily + self.weekly + self.monthly
    }
}

/// User count for a (country, device) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCountryRow {
    pub country: String,
    pub device: String,
    pub count: usize,
}

/// Signups for a (year-month, country) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRow {
    pub year_month: String,
    pub country: String,
    pub count: usize,
}

/// Sessions whose duration falls in `[lower_minutes, upper_minutes)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower_minutes: f64,
    pub upper_minutes: f64,
    pub count: usize,
}

/// What counts as a successful action in the conversion rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionBasis {
    #[default]
    Sessions,
    Transactions,
}

impl fmt::Display for ConversionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sessions => write!(f, "sessions"),
            Self::Transactions => write!(f, "transactions"),
        }
    }
}

impl FromStr for ConversionBasis {
    type Err = AppstatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sessions" => Ok(Self::Sessions),
            "transactions" => Ok(Self::Transactions),
            other => Err(AppstatError::InvalidArgument(format!(
                "unknown conversion basis '{other}' (expected sessions or transactions)"
            ))),
        }
    }
}

/// Headline user and activity figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverviewReport {
    pub total_users: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_users: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_users: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_days: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_countries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_opens_by_weekday: Option<Vec<CountRow>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Who uses the application and how
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudienceReport {
    pub total_users: usize,
    pub total_sessions: usize,
    pub retention_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_session_duration_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_per_session: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_visited_pages: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_active_users: Option<Vec<RankedEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_active_providers: Option<Vec<RankedEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_distribution: Option<Vec<CountRow>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Conversion, activity and loyalty figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementReport {
    pub conversion_basis: ConversionBasis,
    pub conversion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_users: Option<ActiveUsers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_series: Option<Vec<PeriodCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_series: Option<Vec<PeriodCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_series: Option<Vec<PeriodCount>>,
    pub frequency: FrequencySegments,
    pub avg_sessions_per_user: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_session_duration_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_visited_pages: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_pressed_buttons: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_histogram: Option<Vec<HistogramBin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_distribution: Option<Vec<CountRow>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Geographic and temporal distributions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_distribution: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_by_country: Option<Vec<DeviceCountryRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signup_trend: Option<Vec<TrendRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_by_weekday: Option<Vec<CountRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town_distribution: Option<Vec<CountRow>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
