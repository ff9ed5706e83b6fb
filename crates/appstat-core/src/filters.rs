//! Filter engine for dataset snapshots
//!
//! A [`FilterConfig`] is an explicit immutable value: every active predicate
//! is combined with logical AND, an inactive predicate passes everything.
//! Applying it to a [`Dataset`] filters users first and then cascades the
//! surviving user ids into the dependent tables.
//!
//! # Examples
//!
//! ```
//! use appstat_core::filters::{DateRange, FilterConfig};
//! use appstat_core::types::Device;
//! use chrono::NaiveDate;
//!
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//! )
//! .unwrap();
//!
//! let filter = FilterConfig::new()
//!     .with_country("Cameroon")
//!     .with_device(Device::Android)
//!     .with_date_range(range);
//! assert!(!filter.is_empty());
//! ```

use crate::error::{AppstatError, Result};
use crate::types::{Dataset, Device, ProviderId, User, UserId};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Inclusive calendar-date range
///
/// Bounds are compared at midnight of each date, so an event on the end
/// date later than 00:00 falls outside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppstatError::InvalidDate(format!(
                "range start {start} is after range end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start date at 00:00
    pub fn lower_bound(&self) -> NaiveDateTime {
        self.start.and_time(chrono::NaiveTime::MIN)
    }

    /// End date at 00:00
    pub fn upper_bound(&self) -> NaiveDateTime {
        self.end.and_time(chrono::NaiveTime::MIN)
    }

    /// Whether a timestamp lies within the bounds; a null timestamp never does
    pub fn contains(&self, timestamp: Option<&NaiveDateTime>) -> bool {
        match timestamp {
            Some(ts) => *ts >= self.lower_bound() && *ts <= self.upper_bound(),
            None => false,
        }
    }

    /// Full containment: starts at or after the lower bound and ends at or
    /// before the upper bound
    pub fn contains_interval(
        &self,
        start: Option<&NaiveDateTime>,
        end: Option<&NaiveDateTime>,
    ) -> bool {
        match (start, end) {
            (Some(s), Some(e)) => *s >= self.lower_bound() && *e <= self.upper_bound(),
            _ => false,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Selected predicates for one dashboard render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Selected countries; empty means every country
    pub countries: Vec<String>,
    /// Selected devices; empty means every device
    pub devices: Vec<Device>,
    /// Optional date range
    pub date_range: Option<DateRange>,
    /// Whether the date range also restricts users by creation time
    pub users_by_creation: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            countries: Vec::new(),
            devices: Vec::new(),
            date_range: None,
            users_by_creation: true,
        }
    }
}

impl FilterConfig {
    /// A filter that passes everything
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.countries.push(country.into());
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries.extend(countries.into_iter().map(Into::into));
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        if !self.devices.contains(&device) {
            self.devices.push(device);
        }
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Toggle creation-time filtering of users
    pub fn users_by_creation(mut self, enabled: bool) -> Self {
        self.users_by_creation = enabled;
        self
    }

    /// Whether no predicate is active
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.devices.is_empty() && self.date_range.is_none()
    }

    /// Check a single user against the country, device and creation predicates
    pub fn matches_user(&self, user: &User) -> bool {
        if !self.countries.is_empty() {
            match user.country.as_deref() {
                Some(country) if self.countries.iter().any(|c| c == country) => {}
                _ => return false,
            }
        }

        if !self.devices.is_empty() {
            match user.device() {
                Some(device) if self.devices.contains(&device) => {}
                _ => return false,
            }
        }

        match &self.date_range {
            Some(range) if self.users_by_creation => range.contains(user.creation_time.as_ref()),
            _ => true,
        }
    }

    /// Apply every active predicate and the user-id cascade
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        let range = self.date_range.as_ref();

        let users = dataset.users.filter(|u| self.matches_user(u));
        let user_ids: HashSet<&UserId> = users.iter().map(|u| &u.uid).collect();

        let sessions = dataset
            .sessions
            .filter(|s| {
                range.is_none_or(|r| {
                    r.contains_interval(s.session_start.as_ref(), s.session_end.as_ref())
                })
            })
            .filter(|s| user_ids.contains(&s.uid));

        let button_presses = dataset
            .button_presses
            .filter(|b| user_ids.contains(&b.uid))
            .filter(|b| range.is_none_or(|r| r.contains(b.time.as_ref())));

        let provider_ids: HashSet<&ProviderId> =
            dataset.providers.iter().map(|p| &p.uid).collect();
        let transactions = dataset
            .transactions
            .filter(|t| range.is_none_or(|r| r.contains(t.creation_time.as_ref())))
            .filter(|t| provider_ids.contains(&t.provider_id));

        let app_opens = dataset
            .app_opens
            .filter(|a| range.is_none_or(|r| r.contains(a.time.as_ref())));

        debug!(
            users = users.len(),
            sessions = sessions.len(),
            button_presses = button_presses.len(),
            transactions = transactions.len(),
            app_opens = app_opens.len(),
            "Applied filter"
        );

        Dataset {
            users,
            sessions,
            app_opens,
            button_presses,
            transactions,
            providers: dataset.providers.clone(),
        }
    }
}
