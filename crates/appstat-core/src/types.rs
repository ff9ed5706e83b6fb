//! Core domain types for appstat
//!
//! Typed records for every exported CSV source, the `Table` wrapper that
//! remembers which header columns were present, and the `Dataset` bundle
//! consumed by the filter engine and the metric aggregator.
//!
//! Records are never mutated after load; filtering produces new tables.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header names of the exported CSV files
pub mod columns {
    pub const UID: &str = "uid";
    pub const COUNTRY: &str = "country";
    pub const IS_ANDROID: &str = "isAndroid";
    pub const CREATION_TIME: &str = "creationTime";
    pub const STATUS: &str = "status";
    pub const GENDER: &str = "gender";
    pub const AGE: &str = "age";
    pub const TOWN: &str = "town";
    pub const SOURCE: &str = "source";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";

    pub const SESSION_START: &str = "session_start";
    pub const SESSION_END: &str = "session_end";
    pub const SESSION_DURATION: &str = "session_duration_in_seconds";
    pub const VISITED_PAGES: &str = "visited_pages";
    pub const CONVERSION: &str = "conversion";
    pub const FAVORITES: &str = "favorites";

    pub const TIME: &str = "time";
    pub const BUTTON: &str = "button";

    pub const PROVIDER_UID: &str = "prestataireUid";
    pub const COMPANY_NAME: &str = "companyName";
}

/// Strongly-typed user identifier
///
/// # Examples
/// ```
/// use appstat_core::types::UserId;
///
/// let uid = UserId::new("u-42");
/// assert_eq!(uid.as_str(), "u-42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strongly-typed service provider ("prestataire") identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create a new ProviderId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Device family derived from the `isAndroid` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Device {
    #[serde(rename = "Android")]
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl Device {
    /// Map the raw `isAndroid` flag to a device
    pub fn from_is_android(is_android: bool) -> Self {
        if is_android { Self::Android } else { Self::Ios }
    }

    /// Display label used in filters and distributions
    pub fn label(&self) -> &'static str {
        match self {
            Self::Android => "Android",
            Self::Ios => "iOS",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            _ => Err(format!("Invalid device type: {s} (expected Android or iOS)")),
        }
    }
}

/// A row of `users.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserId,
    pub country: Option<String>,
    pub is_android: Option<bool>,
    pub creation_time: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub town: Option<String>,
    pub source: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Device family, if the flag was recorded
    pub fn device(&self) -> Option<Device> {
        self.is_android.map(Device::from_is_android)
    }

    /// "first last", skipping missing parts; `None` when both are missing
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// A row of `sessions_with_pages_true.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: UserId,
    pub session_start: Option<NaiveDateTime>,
    pub session_end: Option<NaiveDateTime>,
    /// Authoritative duration; not cross-checked against start/end
    pub duration_seconds: Option<f64>,
    pub visited_pages: Vec<String>,
    pub conversion: Option<bool>,
    pub favorites: Option<f64>,
}

/// A row of `appOpenedTime.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppOpenEvent {
    pub uid: Option<UserId>,
    pub time: Option<NaiveDateTime>,
}

/// A row of `buttonPressedTime.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonPressEvent {
    pub uid: UserId,
    pub button: String,
    pub time: Option<NaiveDateTime>,
}

/// A row of `transaction.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub provider_id: ProviderId,
    pub creation_time: Option<NaiveDateTime>,
}

/// A row of `prestataires.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub uid: ProviderId,
    pub company_name: Option<String>,
}

/// Records that know the full header set of their source file
pub trait Record {
    /// Every column the exporter can produce for this record
    const COLUMNS: &'static [&'static str];
}

impl Record for User {
    const COLUMNS: &'static [&'static str] = &[
        columns::UID,
        columns::COUNTRY,
        columns::IS_ANDROID,
        columns::CREATION_TIME,
        columns::STATUS,
        columns::GENDER,
        columns::AGE,
        columns::TOWN,
        columns::SOURCE,
        columns::FIRST_NAME,
        columns::LAST_NAME,
    ];
}

impl Record for Session {
    const COLUMNS: &'static [&'static str] = &[
        columns::UID,
        columns::SESSION_START,
        columns::SESSION_END,
        columns::SESSION_DURATION,
        columns::VISITED_PAGES,
        columns::CONVERSION,
        columns::FAVORITES,
    ];
}

impl Record for AppOpenEvent {
    const COLUMNS: &'static [&'static str] = &[columns::TIME, columns::UID];
}

impl Record for ButtonPressEvent {
    const COLUMNS: &'static [&'static str] = &[columns::UID, columns::BUTTON, columns::TIME];
}

impl Record for Transaction {
    const COLUMNS: &'static [&'static str] = &[columns::PROVIDER_UID, columns::CREATION_TIME];
}

impl Record for Provider {
    const COLUMNS: &'static [&'static str] = &[columns::UID, columns::COMPANY_NAME];
}

/// An immutable collection of rows plus the header columns they were read from
///
/// # Examples
/// ```
/// use appstat_core::types::{Table, User, UserId};
///
/// let users = Table::with_all_columns(vec![User { uid: UserId::new("u1"), ..Default::default() }]);
/// assert_eq!(users.len(), 1);
/// assert!(users.has_column("country"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table<T> {
    rows: Vec<T>,
    columns: Vec<String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    /// Create a table from rows and the header it was read from
    pub fn new(rows: Vec<T>, columns: Vec<String>) -> Self {
        Self { rows, columns }
    }

    /// Rows of the table
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Iterate over rows
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header columns present in the source
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the source header contained `column`
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// The subset of `required` absent from the source header
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    /// A new table with the rows matching `predicate`; the header is kept
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self
    where
        T: Clone,
    {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
            columns: self.columns.clone(),
        }
    }
}

impl<T: Record> Table<T> {
    /// Create a table whose header contains every known column of `T`
    pub fn with_all_columns(rows: Vec<T>) -> Self {
        Self {
            rows,
            columns: T::COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// All tables of one export snapshot
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Table<User>,
    pub sessions: Table<Session>,
    pub app_opens: Table<AppOpenEvent>,
    pub button_presses: Table<ButtonPressEvent>,
    pub transactions: Table<Transaction>,
    pub providers: Table<Provider>,
}

impl Session {
    /// Calendar date the session started on
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.session_start.map(|ts| ts.date())
    }
}
