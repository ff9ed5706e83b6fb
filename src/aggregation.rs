//! Metric aggregation over filtered datasets
//!
//! Every metric is a pure function of the tables of one (already filtered)
//! [`Dataset`]. Empty inputs produce 0, never NaN and never an error.
//!
//! Rankings and distributions use [`value_counts`]: counts sorted in
//! descending order, ties kept in first-occurrence order.
//!
//! # Active-user metrics
//!
//! DAU, WAU and MAU are the mean number of sessions per *observed* day,
//! ISO week (Monday start) or calendar month. A period without sessions
//! forms no group at all, so it does not pull the mean towards zero.
//!
//! # Examples
//!
//! ```
//! use appstat::aggregation::Aggregator;
//! use appstat_core::types::{Dataset, Session, Table, User, UserId};
//!
//! let mut data = Dataset::default();
//! data.users = Table::with_all_columns(vec![
//!     User { uid: UserId::new("u1"), ..Default::default() },
//!     User { uid: UserId::new("u2"), ..Default::default() },
//! ]);
//! data.sessions = Table::with_all_columns(vec![Session {
//!     uid: UserId::new("u1"),
//!     duration_seconds: Some(90.0),
//!     ..Default::default()
//! }]);
//!
//! let agg = Aggregator::new(&data);
//! assert_eq!(agg.retention_rate(), 50.0);
//! assert_eq!(agg.avg_session_duration_minutes(), 1.5);
//! ```

use appstat_core::aggregation_types::{
    ActiveUsers, ConversionBasis, CountRow, DeviceCountryRow, FrequencySegments, HistogramBin,
    PeriodCount, RankedEntry, TrendRow,
};
use appstat_core::error::{AppstatError, Result};
use appstat_core::period::{Period, WEEKDAYS, weekday_name, year_month};
use appstat_core::town::TownNormalizer;
use appstat_core::types::{Dataset, Device, UserId};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Label of users whose device flag was not recorded
pub const UNKNOWN_DEVICE: &str = "Unknown";

/// Count values, sorted descending with ties in first-occurrence order
///
/// # Examples
/// ```
/// use appstat::aggregation::value_counts;
///
/// let counts = value_counts(["search", "home", "search", "profile", "home"]);
/// let labels: Vec<_> = counts.iter().map(|c| c.label.as_str()).collect();
/// assert_eq!(labels, ["search", "home", "profile"]);
/// ```
pub fn value_counts<I, S>(values: I) -> Vec<CountRow>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<CountRow> = Vec::new();
    for value in values {
        let value = value.as_ref();
        match index.get(value) {
            Some(&i) => rows[i].count += 1,
            None => {
                index.insert(value.to_string(), rows.len());
                rows.push(CountRow::new(value, 1));
            }
        }
    }
    // sort_by is stable
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// `numerator / denominator * 100`, or 0 for an empty denominator
pub fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Metric aggregator over one filtered dataset
pub struct Aggregator<'a> {
    data: &'a Dataset,
}

impl<'a> Aggregator<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        Self { data }
    }

    pub fn total_users(&self) -> usize {
        self.data.users.len()
    }

    /// Users whose status is exactly `active`
    pub fn active_users(&self) -> usize {
        self.data
            .users
            .iter()
            .filter(|u| u.status.as_deref() == Some("active"))
            .count()
    }

    /// Users created on `today`
    pub fn new_users(&self, today: NaiveDate) -> usize {
        self.data
            .users
            .iter()
            .filter(|u| u.creation_time.map(|t| t.date()) == Some(today))
            .count()
    }

    /// Distinct calendar dates with at least one app-open event
    pub fn active_days(&self) -> usize {
        self.data
            .app_opens
            .iter()
            .filter_map(|a| a.time.map(|t| t.date()))
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn distinct_countries(&self) -> usize {
        self.data
            .users
            .iter()
            .filter_map(|u| u.country.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Sessions per user, as a percentage
    pub fn retention_rate(&self) -> f64 {
        rate(self.data.sessions.len(), self.data.users.len())
    }

    /// Successful actions per signup, as a percentage
    pub fn conversion_rate(&self, basis: ConversionBasis, signups: usize) -> f64 {
        let successes = match basis {
            ConversionBasis::Sessions => self.data.sessions.len(),
            ConversionBasis::Transactions => self.data.transactions.len(),
        };
        rate(successes, signups)
    }

    /// Mean length of the visited-page lists
    pub fn pages_per_session(&self) -> f64 {
        mean(
            self.data
                .sessions
                .iter()
                .map(|s| s.visited_pages.len() as f64),
        )
    }

    /// Mean recorded duration in minutes; missing and non-finite durations are ignored
    pub fn avg_session_duration_minutes(&self) -> f64 {
        mean(
            self.data
                .sessions
                .iter()
                .filter_map(|s| s.duration_seconds)
                .filter(|secs| secs.is_finite())
                .map(|secs| secs / 60.0),
        )
    }

    /// Session count per user id, in first-occurrence order
    pub fn sessions_per_user(&self) -> Vec<(&'a UserId, usize)> {
        let mut index: HashMap<&UserId, usize> = HashMap::new();
        let mut counts: Vec<(&'a UserId, usize)> = Vec::new();
        for session in self.data.sessions.iter() {
            match index.get(&session.uid) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(&session.uid, counts.len());
                    counts.push((&session.uid, 1));
                }
            }
        }
        counts
    }

    /// Mean sessions over users with at least one session
    pub fn avg_sessions_per_user(&self) -> f64 {
        mean(self.sessions_per_user().into_iter().map(|(_, n)| n as f64))
    }

    /// Session counts per observed period, sorted by period key
    pub fn active_series(&self, period: Period) -> Vec<PeriodCount> {
        let mut groups: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for start in self.data.sessions.iter().filter_map(|s| s.session_start) {
            *groups.entry(period.key(&start)).or_default() += 1;
        }
        groups
            .into_iter()
            .map(|(period_start, count)| PeriodCount {
                period_start,
                count,
            })
            .collect()
    }

    /// Mean group size of [`Self::active_series`]
    pub fn mean_active(&self, period: Period) -> f64 {
        mean(self.active_series(period).into_iter().map(|p| p.count as f64))
    }

    pub fn active_users_metrics(&self) -> ActiveUsers {
        ActiveUsers {
            dau: self.mean_active(Period::Day),
            wau: self.mean_active(Period::Week),
            mau: self.mean_active(Period::Month),
        }
    }

    /// Users by session count: one, two to seven, more than seven
    pub fn frequency_segments(&self) -> FrequencySegments {
        let mut segments = FrequencySegments::default();
        for (_, count) in self.sessions_per_user() {
            match count {
                1 => segments.daily += 1,
                2..=7 => segments.weekly += 1,
                _ => segments.monthly += 1,
            }
        }
        segments
    }

    pub fn most_visited_pages(&self) -> Vec<CountRow> {
        value_counts(
            self.data
                .sessions
                .iter()
                .flat_map(|s| s.visited_pages.iter()),
        )
    }

    pub fn most_pressed_buttons(&self) -> Vec<CountRow> {
        value_counts(self.data.button_presses.iter().map(|b| b.button.as_str()))
    }

    /// Users ranked by session count; ids without a user record are dropped
    pub fn most_active_users(&self) -> Vec<RankedEntry> {
        let mut names: HashMap<&str, String> = HashMap::new();
        for user in self.data.users.iter() {
            names
                .entry(user.uid.as_str())
                .or_insert_with(|| user.full_name().unwrap_or_else(|| user.uid.to_string()));
        }

        value_counts(self.data.sessions.iter().map(|s| s.uid.as_str()))
            .into_iter()
            .filter_map(|row| {
                names.get(row.label.as_str()).map(|name| RankedEntry {
                    name: name.clone(),
                    id: row.label,
                    count: row.count,
                })
            })
            .collect()
    }

    /// Providers ranked by transaction count; ids without a provider record are dropped
    pub fn most_active_providers(&self) -> Vec<RankedEntry> {
        let mut names: HashMap<&str, String> = HashMap::new();
        for provider in self.data.providers.iter() {
            names.entry(provider.uid.as_str()).or_insert_with(|| {
                provider
                    .company_name
                    .clone()
                    .unwrap_or_else(|| provider.uid.to_string())
            });
        }

        value_counts(
            self.data
                .transactions
                .iter()
                .map(|t| t.provider_id.as_str()),
        )
        .into_iter()
        .filter_map(|row| {
            names.get(row.label.as_str()).map(|name| RankedEntry {
                name: name.clone(),
                id: row.label,
                count: row.count,
            })
        })
        .collect()
    }

    pub fn country_distribution(&self) -> Vec<CountRow> {
        value_counts(self.data.users.iter().filter_map(|u| u.country.as_deref()))
    }

    /// Users per device label; a missing flag counts as [`UNKNOWN_DEVICE`]
    pub fn device_distribution(&self) -> Vec<CountRow> {
        value_counts(self.data.users.iter().map(|u| match u.device() {
            Some(device) => device.label(),
            None => UNKNOWN_DEVICE,
        }))
    }

    pub fn gender_distribution(&self) -> Vec<CountRow> {
        value_counts(self.data.users.iter().filter_map(|u| u.gender.as_deref()))
    }

    pub fn age_distribution(&self) -> Vec<CountRow> {
        value_counts(self.data.users.iter().filter_map(|u| u.age.as_deref()))
    }

    pub fn source_distribution(&self) -> Vec<CountRow> {
        value_counts(self.data.users.iter().filter_map(|u| u.source.as_deref()))
    }

    /// Users per normalized town; blank towns are left out
    pub fn town_distribution(&self, towns: &TownNormalizer) -> Vec<CountRow> {
        value_counts(
            self.data
                .users
                .iter()
                .filter_map(|u| u.town.as_deref())
                .map(|t| towns.normalize(t))
                .filter(|t| !t.is_empty()),
        )
    }

    /// Users per (country, device), sorted by country then iOS before Android
    pub fn device_by_country(&self) -> Vec<DeviceCountryRow> {
        let mut groups: BTreeMap<(&str, bool), usize> = BTreeMap::new();
        for user in self.data.users.iter() {
            if let (Some(country), Some(is_android)) = (user.country.as_deref(), user.is_android) {
                *groups.entry((country, is_android)).or_default() += 1;
            }
        }
        groups
            .into_iter()
            .map(|((country, is_android), count)| DeviceCountryRow {
                country: country.to_string(),
                device: Device::from_is_android(is_android).label().to_string(),
                count,
            })
            .collect()
    }

    /// Signups per (creation month, country), sorted by key
    pub fn signup_trend(&self) -> Vec<TrendRow> {
        let mut groups: BTreeMap<(String, &str), usize> = BTreeMap::new();
        for user in self.data.users.iter() {
            if let (Some(created), Some(country)) = (user.creation_time, user.country.as_deref()) {
                *groups
                    .entry((year_month(created.date()), country))
                    .or_default() += 1;
            }
        }
        groups
            .into_iter()
            .map(|((year_month, country), count)| TrendRow {
                year_month,
                country: country.to_string(),
                count,
            })
            .collect()
    }

    /// Sessions per weekday of `session_start`, Monday first, zero-filled
    pub fn sessions_by_weekday(&self) -> Vec<CountRow> {
        weekday_counts(self.data.sessions.iter().filter_map(|s| s.start_date()))
    }

    /// App-open events per weekday, Monday first, zero-filled
    pub fn app_opens_by_weekday(&self) -> Vec<CountRow> {
        weekday_counts(
            self.data
                .app_opens
                .iter()
                .filter_map(|a| a.time.map(|t| t.date())),
        )
    }

    /// Sessions per fixed-width duration bin; only observed bins are listed
    ///
    /// # Errors
    ///
    /// Returns an error if `bin_minutes` is not a positive finite number
    pub fn session_duration_histogram(&self, bin_minutes: f64) -> Result<Vec<HistogramBin>> {
        if !(bin_minutes.is_finite() && bin_minutes > 0.0) {
            return Err(AppstatError::InvalidArgument(format!(
                "histogram bin width must be positive, got {bin_minutes}"
            )));
        }

        let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
        for secs in self.data.sessions.iter().filter_map(|s| s.duration_seconds) {
            let minutes = secs / 60.0;
            if minutes.is_finite() {
                *bins.entry((minutes / bin_minutes).floor() as i64).or_default() += 1;
            }
        }

        Ok(bins
            .into_iter()
            .map(|(idx, count)| HistogramBin {
                lower_minutes: idx as f64 * bin_minutes,
                upper_minutes: (idx + 1) as f64 * bin_minutes,
                count,
            })
            .collect())
    }
}

fn weekday_counts(dates: impl Iterator<Item = NaiveDate>) -> Vec<CountRow> {
    let mut counts = [0usize; 7];
    for date in dates {
        counts[date.weekday().num_days_from_monday() as usize] += 1;
    }
    WEEKDAYS
        .iter()
        .zip(counts)
        .map(|(day, count)| CountRow::new(weekday_name(*day), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstat_core::types::{
        AppOpenEvent, ButtonPressEvent, Provider, ProviderId, Session, Table, Transaction, User,
    };
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn user(uid: &str, country: &str) -> User {
        User {
            uid: UserId::new(uid),
            country: Some(country.to_string()),
            ..Default::default()
        }
    }

    fn session_at(uid: &str, start: &str) -> Session {
        Session {
            uid: UserId::new(uid),
            session_start: Some(dt(start)),
            ..Default::default()
        }
    }

    #[test]
    fn test_retention_duration_and_countries() {
        let mut data = Dataset::default();
        data.users = Table::with_all_columns(vec![
            user("a", "FR"),
            user("b", "FR"),
            user("c", "US"),
        ]);
        data.sessions = Table::with_all_columns(vec![
            Session {
                uid: UserId::new("a"),
                duration_seconds: Some(120.0),
                ..Default::default()
            },
            Session {
                uid: UserId::new("b"),
                duration_seconds: Some(300.0),
                ..Default::default()
            },
        ]);

        let agg = Aggregator::new(&data);
        assert!((agg.retention_rate() - 66.666_666).abs() < 1e-3);
        assert_eq!(format!("{:.2}", agg.retention_rate()), "66.67");
        assert_eq!(agg.avg_session_duration_minutes(), 3.5);
        assert_eq!(
            agg.country_distribution(),
            vec![CountRow::new("FR", 2), CountRow::new("US", 1)]
        );
        assert_eq!(agg.distinct_countries(), 2);
    }

    #[test]
    fn test_empty_dataset_reports_zero() {
        let data = Dataset::default();
        let agg = Aggregator::new(&data);
        assert_eq!(agg.active_users_metrics(), ActiveUsers::default());
        assert_eq!(agg.retention_rate(), 0.0);
        assert_eq!(agg.avg_session_duration_minutes(), 0.0);
        assert_eq!(agg.pages_per_session(), 0.0);
        assert_eq!(agg.avg_sessions_per_user(), 0.0);
        assert_eq!(agg.conversion_rate(ConversionBasis::Sessions, 0), 0.0);
        assert_eq!(agg.frequency_segments().total(), 0);
        assert_eq!(agg.sessions_by_weekday().len(), 7);
        assert!(agg.session_duration_histogram(5.0).unwrap().is_empty());
    }

    #[test]
    fn test_status_and_new_users() {
        let mut data = Dataset::default();
        let mut active = user("a", "FR");
        active.status = Some("active".into());
        active.creation_time = Some(dt("2024-06-01 23:59:00"));
        let mut inactive = user("b", "FR");
        inactive.status = Some("Active".into());
        inactive.creation_time = Some(dt("2024-05-31 10:00:00"));
        data.users = Table::with_all_columns(vec![active, inactive]);

        let agg = Aggregator::new(&data);
        assert_eq!(agg.active_users(), 1);
        assert_eq!(agg.new_users(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()), 1);
    }

    #[test]
    fn test_mean_of_observed_periods() {
        let mut data = Dataset::default();
        data.sessions = Table::with_all_columns(vec![
            session_at("a", "2024-03-04 10:00:00"),
            session_at("b", "2024-03-04 11:00:00"),
            session_at("a", "2024-03-06 09:00:00"),
            // Two weeks later; the empty week in between forms no group
            session_at("a", "2024-03-20 09:00:00"),
            Session::default(),
        ]);

        let agg = Aggregator::new(&data);
        let metrics = agg.active_users_metrics();
        assert!((metrics.dau - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.wau, 2.0);
        assert_eq!(metrics.mau, 4.0);

        let weekly = agg.active_series(Period::Week);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].period_start, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(weekly[0].count, 3);
    }

    #[test]
    fn test_frequency_segments() {
        let mut data = Dataset::default();
        let mut sessions = vec![session_at("one", "2024-01-01 00:00:00")];
        sessions.extend((0..7).map(|_| session_at("seven", "2024-01-01 00:00:00")));
        sessions.extend((0..8).map(|_| session_at("eight", "2024-01-01 00:00:00")));
        sessions.extend((0..2).map(|_| session_at("two", "2024-01-01 00:00:00")));
        data.sessions = Table::with_all_columns(sessions);
        data.users = Table::with_all_columns(vec![user("idle", "FR")]);

        let agg = Aggregator::new(&data);
        let segments = agg.frequency_segments();
        assert_eq!(segments.daily, 1);
        assert_eq!(segments.weekly, 2);
        assert_eq!(segments.monthly, 1);
        assert_eq!(agg.avg_sessions_per_user(), 4.5);
    }

    #[test]
    fn test_value_counts_ties_keep_first_occurrence() {
        let counts = value_counts(["b", "a", "c", "a", "b", "d"]);
        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["b", "a", "c", "d"]);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_pages_and_buttons() {
        let mut data = Dataset::default();
        data.sessions = Table::with_all_columns(vec![
            Session {
                visited_pages: vec!["home".into(), "search".into()],
                ..Default::default()
            },
            Session {
                visited_pages: vec!["search".into()],
                ..Default::default()
            },
            Session::default(),
        ]);
        data.button_presses = Table::with_all_columns(vec![
            ButtonPressEvent {
                button: "book".into(),
                ..Default::default()
            },
            ButtonPressEvent {
                button: "call".into(),
                ..Default::default()
            },
            ButtonPressEvent {
                button: "call".into(),
                ..Default::default()
            },
        ]);

        let agg = Aggregator::new(&data);
        assert_eq!(agg.pages_per_session(), 1.0);
        assert_eq!(
            agg.most_visited_pages(),
            vec![CountRow::new("search", 2), CountRow::new("home", 1)]
        );
        assert_eq!(agg.most_pressed_buttons()[0], CountRow::new("call", 2));
    }

    #[test]
    fn test_rankings_use_inner_join() {
        let mut data = Dataset::default();
        let mut named = user("u1", "FR");
        named.first_name = Some("Awa".into());
        named.last_name = Some("Ngono".into());
        data.users = Table::with_all_columns(vec![named, user("u2", "FR")]);
        data.sessions = Table::with_all_columns(vec![
            session_at("ghost", "2024-01-01 00:00:00"),
            session_at("ghost", "2024-01-01 00:00:00"),
            session_at("u2", "2024-01-01 00:00:00"),
            session_at("u1", "2024-01-01 00:00:00"),
            session_at("u1", "2024-01-01 00:00:00"),
        ]);
        data.providers = Table::with_all_columns(vec![Provider {
            uid: ProviderId::new("p1"),
            company_name: Some("Kribi Cars".into()),
        }]);
        data.transactions = Table::with_all_columns(vec![
            Transaction {
                provider_id: ProviderId::new("p1"),
                creation_time: None,
            },
            Transaction {
                provider_id: ProviderId::new("p9"),
                creation_time: None,
            },
        ]);

        let agg = Aggregator::new(&data);
        let users = agg.most_active_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Awa Ngono");
        assert_eq!(users[0].count, 2);
        assert_eq!(users[1].name, "u2");

        let providers = agg.most_active_providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "Kribi Cars");
        assert_eq!(agg.conversion_rate(ConversionBasis::Transactions, 4), 50.0);
    }

    #[test]
    fn test_devices_towns_and_trend() {
        let mut data = Dataset::default();
        let mut u1 = user("u1", "Cameroon");
        u1.is_android = Some(true);
        u1.town = Some(" yaounde".into());
        u1.creation_time = Some(dt("2024-02-10 09:00:00"));
        let mut u2 = user("u2", "Cameroon");
        u2.is_android = Some(false);
        u2.town = Some("Douala, Yaoundé et Edea".into());
        u2.creation_time = Some(dt("2024-01-10 09:00:00"));
        let mut u3 = user("u3", "Cameroon");
        u3.town = Some("  ".into());
        data.users = Table::with_all_columns(vec![u1, u2, u3]);

        let agg = Aggregator::new(&data);
        assert_eq!(
            agg.device_distribution(),
            vec![
                CountRow::new("Android", 1),
                CountRow::new("iOS", 1),
                CountRow::new(UNKNOWN_DEVICE, 1)
            ]
        );
        assert_eq!(
            agg.town_distribution(&TownNormalizer::default()),
            vec![CountRow::new("Yaoundé", 2)]
        );

        let by_country = agg.device_by_country();
        assert_eq!(by_country.len(), 2);
        assert_eq!(by_country[0].device, "iOS");
        assert_eq!(by_country[1].device, "Android");

        let trend = agg.signup_trend();
        assert_eq!(trend[0].year_month, "2024-01");
        assert_eq!(trend[1].year_month, "2024-02");
    }

    #[test]
    fn test_weekday_counts_are_zero_filled() {
        let mut data = Dataset::default();
        data.app_opens = Table::with_all_columns(vec![
            AppOpenEvent {
                uid: None,
                time: Some(dt("2024-03-10 12:00:00")),
            },
            AppOpenEvent {
                uid: None,
                time: Some(dt("2024-03-17 12:00:00")),
            },
        ]);

        let agg = Aggregator::new(&data);
        let by_day = agg.app_opens_by_weekday();
        assert_eq!(by_day.len(), 7);
        assert_eq!(by_day[0], CountRow::new("Monday", 0));
        assert_eq!(by_day[6], CountRow::new("Sunday", 2));
        assert_eq!(agg.active_days(), 2);
    }

    #[test]
    fn test_duration_histogram() {
        let mut data = Dataset::default();
        data.sessions = Table::with_all_columns(
            [30.0, 200.0, 290.0, 1500.0]
                .into_iter()
                .map(|secs| Session {
                    duration_seconds: Some(secs),
                    ..Default::default()
                })
                .collect(),
        );

        let agg = Aggregator::new(&data);
        let bins = agg.session_duration_histogram(5.0).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[1].lower_minutes, 25.0);
        assert!(agg.session_duration_histogram(0.0).is_err());
    }

    #[test]
    fn test_non_finite_durations_are_ignored() {
        let mut data = Dataset::default();
        data.sessions = Table::with_all_columns(
            [Some(120.0), Some(f64::NAN), Some(f64::INFINITY), None]
                .into_iter()
                .map(|duration_seconds| Session {
                    duration_seconds,
                    ..Default::default()
                })
                .collect(),
        );

        let agg = Aggregator::new(&data);
        assert_eq!(agg.avg_session_duration_minutes(), 2.0);
        let bins = agg.session_duration_histogram(5.0).unwrap();
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 1);
    }
}
