//! Report views
//!
//! One view per analytics page. A view filters the dataset, runs the
//! aggregator and packs the results into a serializable report. Optional
//! sections check the header columns they depend on first; a missing
//! column skips the section, logs a warning and records it in the report.

use crate::aggregation::Aggregator;
use appstat_core::aggregation_types::{
    AudienceReport, ConversionBasis, EngagementReport, GeoReport, OverviewReport,
};
use appstat_core::error::Result;
use appstat_core::filters::FilterConfig;
use appstat_core::period::Period;
use appstat_core::timezone::TimezoneConfig;
use appstat_core::town::TownNormalizer;
use appstat_core::types::{Dataset, Table, columns};
use appstat_loader::{LoadOptions, TableKind};
use std::fmt;
use tracing::{debug, warn};

/// The report views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Audience,
    Engagement,
    Geo,
}

impl View {
    /// Tables a view reads; only these are loaded
    pub fn tables(&self) -> Vec<TableKind> {
        match self {
            View::Overview => vec![TableKind::Users, TableKind::AppOpens],
            View::Audience => vec![
                TableKind::Users,
                TableKind::Sessions,
                TableKind::Transactions,
                TableKind::Providers,
            ],
            View::Engagement => vec![
                TableKind::Users,
                TableKind::Sessions,
                TableKind::ButtonPresses,
                TableKind::Transactions,
                TableKind::Providers,
            ],
            View::Geo => vec![TableKind::Users, TableKind::Sessions],
        }
    }

    /// Loader options for this view; only views with page sections decode
    /// `visited_pages`, so a malformed literal cannot abort the others
    pub fn load_options(&self, base: LoadOptions) -> LoadOptions {
        match self {
            View::Audience | View::Engagement => base,
            View::Overview | View::Geo => base.without_visited_pages(),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Overview => write!(f, "overview"),
            View::Audience => write!(f, "audience"),
            View::Engagement => write!(f, "engagement"),
            View::Geo => write!(f, "geo"),
        }
    }
}

/// Knobs shared by the views
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub conversion_basis: ConversionBasis,
    pub histogram_bin_minutes: f64,
    pub towns: TownNormalizer,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            conversion_basis: ConversionBasis::default(),
            histogram_bin_minutes: 5.0,
            towns: TownNormalizer::default(),
        }
    }
}

/// Collects the warnings of skipped sections
#[derive(Default)]
struct Sections {
    warnings: Vec<String>,
}

impl Sections {
    /// Run `compute` if `table` has every `required` column
    fn guard<R, T>(
        &mut self,
        section: &str,
        kind: TableKind,
        table: &Table<R>,
        required: &[&str],
        compute: impl FnOnce() -> T,
    ) -> Option<T> {
        match table.missing_columns(required).first() {
            None => Some(compute()),
            Some(column) => {
                let file = kind.file_name();
                warn!(section, file, column, "Skipping section, column missing");
                self.warnings
                    .push(format!("{section} skipped: {file} has no '{column}' column"));
                None
            }
        }
    }
}

/// Builds the report of each view
///
/// # Examples
///
/// ```
/// use appstat::dashboard::Dashboard;
/// use appstat_core::{Dataset, FilterConfig};
/// use appstat_core::timezone::TimezoneConfig;
///
/// let dashboard = Dashboard::new(TimezoneConfig::utc());
/// let report = dashboard.overview(&Dataset::default(), &FilterConfig::default());
/// assert_eq!(report.total_users, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    timezone: TimezoneConfig,
    options: ViewOptions,
}

impl Dashboard {
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self {
            timezone,
            options: ViewOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Headline figures: user counts, active days, countries, genders, app opens
    pub fn overview(&self, data: &Dataset, filter: &FilterConfig) -> OverviewReport {
        let filtered = filter.apply(data);
        let agg = Aggregator::new(&filtered);
        let users = &filtered.users;
        let mut sections = Sections::default();

        let active_users = sections.guard(
            "Active users",
            TableKind::Users,
            users,
            &[columns::STATUS],
            || agg.active_users(),
        );
        let new_users = sections.guard(
            "New users",
            TableKind::Users,
            users,
            &[columns::CREATION_TIME],
            || agg.new_users(self.timezone.today()),
        );
        let distinct_countries = sections.guard(
            "Countries",
            TableKind::Users,
            users,
            &[columns::COUNTRY],
            || agg.distinct_countries(),
        );
        let country_distribution = sections.guard(
            "Country distribution",
            TableKind::Users,
            users,
            &[columns::COUNTRY],
            || agg.country_distribution(),
        );
        let gender_distribution = sections.guard(
            "Gender distribution",
            TableKind::Users,
            users,
            &[columns::GENDER],
            || agg.gender_distribution(),
        );
        let active_days = sections.guard(
            "Active days",
            TableKind::AppOpens,
            &filtered.app_opens,
            &[columns::TIME],
            || agg.active_days(),
        );
        let app_opens_by_weekday = sections.guard(
            "App opens by weekday",
            TableKind::AppOpens,
            &filtered.app_opens,
            &[columns::TIME],
            || agg.app_opens_by_weekday(),
        );

        OverviewReport {
            total_users: agg.total_users(),
            active_users,
            new_users,
            active_days,
            distinct_countries,
            country_distribution,
            gender_distribution,
            app_opens_by_weekday,
            warnings: sections.warnings,
        }
    }

    /// Who the users are and what they do
    pub fn audience(&self, data: &Dataset, filter: &FilterConfig) -> AudienceReport {
        let filtered = filter.apply(data);
        let agg = Aggregator::new(&filtered);
        let users = &filtered.users;
        let sessions = &filtered.sessions;
        let mut sections = Sections::default();

        let avg_session_duration_minutes = sections.guard(
            "Average session duration",
            TableKind::Sessions,
            sessions,
            &[columns::SESSION_DURATION],
            || agg.avg_session_duration_minutes(),
        );
        let pages_per_session = sections.guard(
            "Pages per session",
            TableKind::Sessions,
            sessions,
            &[columns::VISITED_PAGES],
            || agg.pages_per_session(),
        );
        let country_distribution = sections.guard(
            "Country distribution",
            TableKind::Users,
            users,
            &[columns::COUNTRY],
            || agg.country_distribution(),
        );
        let device_distribution = sections.guard(
            "Device distribution",
            TableKind::Users,
            users,
            &[columns::IS_ANDROID],
            || agg.device_distribution(),
        );
        let most_visited_pages = sections.guard(
            "Most visited pages",
            TableKind::Sessions,
            sessions,
            &[columns::VISITED_PAGES],
            || agg.most_visited_pages(),
        );
        let most_active_users = sections.guard(
            "Most active users",
            TableKind::Users,
            users,
            &[columns::FIRST_NAME, columns::LAST_NAME],
            || agg.most_active_users(),
        );
        let most_active_providers = sections.guard(
            "Most active providers",
            TableKind::Providers,
            &filtered.providers,
            &[columns::COMPANY_NAME],
            || agg.most_active_providers(),
        );
        let age_distribution = sections.guard(
            "Age distribution",
            TableKind::Users,
            users,
            &[columns::AGE],
            || agg.age_distribution(),
        );
        let gender_distribution = sections.guard(
            "Gender distribution",
            TableKind::Users,
            users,
            &[columns::GENDER],
            || agg.gender_distribution(),
        );
        let town_distribution = sections.guard(
            "Town distribution",
            TableKind::Users,
            users,
            &[columns::TOWN],
            || agg.town_distribution(&self.options.towns),
        );
        let source_distribution = sections.guard(
            "Source distribution",
            TableKind::Users,
            users,
            &[columns::SOURCE],
            || agg.source_distribution(),
        );

        AudienceReport {
            total_users: agg.total_users(),
            total_sessions: sessions.len(),
            retention_rate: agg.retention_rate(),
            avg_session_duration_minutes,
            pages_per_session,
            country_distribution,
            device_distribution,
            most_visited_pages,
            most_active_users,
            most_active_providers,
            age_distribution,
            gender_distribution,
            town_distribution,
            source_distribution,
            warnings: sections.warnings,
        }
    }

    /// Conversion, activity and loyalty
    ///
    /// Users are never filtered by creation date here, and the conversion
    /// denominator is the unfiltered signup count.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram bin width is not positive
    pub fn engagement(&self, data: &Dataset, filter: &FilterConfig) -> Result<EngagementReport> {
        let filter = filter.clone().users_by_creation(false);
        let filtered = filter.apply(data);
        let agg = Aggregator::new(&filtered);
        let mut sections = Sections::default();

        let signups = data.users.len();
        let basis = self.options.conversion_basis;
        debug!(%basis, signups, "Computing conversion rate");

        let sessions = &filtered.sessions;
        let activity = sections.guard(
            "Active users",
            TableKind::Sessions,
            sessions,
            &[columns::SESSION_START],
            || {
                (
                    agg.active_users_metrics(),
                    agg.active_series(Period::Day),
                    agg.active_series(Period::Week),
                    agg.active_series(Period::Month),
                )
            },
        );
        let (active_users, daily_series, weekly_series, monthly_series) = match activity {
            Some((metrics, daily, weekly, monthly)) => {
                (Some(metrics), Some(daily), Some(weekly), Some(monthly))
            }
            None => (None, None, None, None),
        };
        let avg_session_duration_minutes = sections.guard(
            "Average session duration",
            TableKind::Sessions,
            sessions,
            &[columns::SESSION_DURATION],
            || agg.avg_session_duration_minutes(),
        );
        let duration_histogram = sections
            .guard(
                "Session duration histogram",
                TableKind::Sessions,
                sessions,
                &[columns::SESSION_DURATION],
                || agg.session_duration_histogram(self.options.histogram_bin_minutes),
            )
            .transpose()?;
        let most_visited_pages = sections.guard(
            "Most visited pages",
            TableKind::Sessions,
            sessions,
            &[columns::VISITED_PAGES],
            || agg.most_visited_pages(),
        );
        let most_pressed_buttons = sections.guard(
            "Most pressed buttons",
            TableKind::ButtonPresses,
            &filtered.button_presses,
            &[columns::BUTTON],
            || agg.most_pressed_buttons(),
        );
        let country_distribution = sections.guard(
            "Country distribution",
            TableKind::Users,
            &filtered.users,
            &[columns::COUNTRY],
            || agg.country_distribution(),
        );

        Ok(EngagementReport {
            conversion_basis: basis,
            conversion_rate: agg.conversion_rate(basis, signups),
            active_users,
            daily_series,
            weekly_series,
            monthly_series,
            frequency: agg.frequency_segments(),
            avg_sessions_per_user: agg.avg_sessions_per_user(),
            avg_session_duration_minutes,
            most_visited_pages,
            most_pressed_buttons,
            duration_histogram,
            country_distribution,
            warnings: sections.warnings,
        })
    }

    /// Where the users are and when they come
    pub fn geo(&self, data: &Dataset, filter: &FilterConfig) -> GeoReport {
        let filtered = filter.apply(data);
        let agg = Aggregator::new(&filtered);
        let users = &filtered.users;
        let mut sections = Sections::default();

        let country_distribution = sections.guard(
            "Country distribution",
            TableKind::Users,
            users,
            &[columns::COUNTRY],
            || agg.country_distribution(),
        );
        let device_by_country = sections.guard(
            "Devices by country",
            TableKind::Users,
            users,
            &[columns::COUNTRY, columns::IS_ANDROID],
            || agg.device_by_country(),
        );
        let signup_trend = sections.guard(
            "Signup trend",
            TableKind::Users,
            users,
            &[columns::CREATION_TIME, columns::COUNTRY],
            || agg.signup_trend(),
        );
        let town_distribution = sections.guard(
            "Town distribution",
            TableKind::Users,
            users,
            &[columns::TOWN],
            || agg.town_distribution(&self.options.towns),
        );
        let sessions_by_weekday = sections.guard(
            "Sessions by weekday",
            TableKind::Sessions,
            &filtered.sessions,
            &[columns::SESSION_START],
            || agg.sessions_by_weekday(),
        );

        GeoReport {
            country_distribution,
            device_by_country,
            signup_trend,
            sessions_by_weekday,
            town_distribution,
            warnings: sections.warnings,
        }
    }
}
