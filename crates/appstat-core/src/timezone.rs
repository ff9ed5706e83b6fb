//! Timezone handling for "today"
//!
//! Exported timestamps are timezone-naive, so the only place a timezone
//! matters is deciding which calendar date is "today" (new-user counts and
//! open-ended date ranges). The clock can be pinned for reproducible runs.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Timezone used to resolve the current date
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone to use for date operations
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
    /// Overrides the system clock when set
    pub fixed_today: Option<NaiveDate>,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        let tz = get_local_timezone();
        Self {
            is_utc: tz == Tz::UTC,
            tz,
            fixed_today: None,
        }
    }
}

impl TimezoneConfig {
    /// Build from the `--timezone` / `--utc` flags
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> crate::error::Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        match timezone_str {
            Some(tz_str) => {
                let tz = Tz::from_str(tz_str).map_err(|_| {
                    crate::error::AppstatError::InvalidTimezone(format!(
                        "'{tz_str}'. Use format like 'Africa/Douala', 'Europe/Paris', or 'UTC'"
                    ))
                })?;
                Ok(Self {
                    tz,
                    is_utc: tz == Tz::UTC,
                    fixed_today: None,
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// UTC without consulting the system
    pub fn utc() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
            fixed_today: None,
        }
    }

    /// Pin "today" to a fixed date
    pub fn with_fixed_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// The current calendar date in the configured timezone
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Utc::now().with_timezone(&self.tz).date_naive())
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }
}

/// Detect the system's local timezone, falling back to UTC
pub fn get_local_timezone() -> Tz {
    #[allow(clippy::collapsible_if)]
    if let Ok(tz_str) = std::env::var("TZ") {
        if let Ok(tz) = Tz::from_str(&tz_str) {
            debug!("Using timezone from TZ environment variable: {}", tz_str);
            return tz;
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => Tz::from_str(&tz_str).unwrap_or_else(|_| {
            debug!("Unrecognized system timezone '{}', using UTC", tz_str);
            Tz::UTC
        }),
        Err(e) => {
            debug!("Could not detect local timezone: {:?}, using UTC", e);
            Tz::UTC
        }
    }
}
