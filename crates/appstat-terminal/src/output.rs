//! Output formatting for dashboard reports
//!
//! Two formatters implement [`OutputFormatter`]:
//! - [`TableFormatter`] renders one prettytable per report section for a
//!   terminal, with thousands separators and two-decimal rates;
//! - [`JsonFormatter`] serializes the report structs as chart-ready JSON.
//!
//! Sections skipped by a missing-column guard are simply absent; their
//! warnings are printed at the end of the table output.
//!
//! # Examples
//!
//! ```
//! use appstat_core::aggregation_types::OverviewReport;
//! use appstat_terminal::get_formatter;
//!
//! let report = OverviewReport { total_users: 1200, ..Default::default() };
//! let table = get_formatter(false, None).format_overview(&report);
//! assert!(table.contains("1,200"));
//!
//! let json = get_formatter(true, None).format_overview(&report);
//! assert!(json.contains("\"total_users\": 1200"));
//! ```

use appstat_core::aggregation_types::{
    AudienceReport, CountRow, DeviceCountryRow, EngagementReport, GeoReport, HistogramBin,
    OverviewReport, PeriodCount, RankedEntry, TrendRow,
};
use colored::Colorize;
use prettytable::{Table, format, row};
use serde::Serialize;

/// Trait for report formatters
pub trait OutputFormatter {
    /// Format the headline figures
    fn format_overview(&self, report: &OverviewReport) -> String;

    /// Format audience distributions and rankings
    fn format_audience(&self, report: &AudienceReport) -> String;

    /// Format conversion and activity figures
    fn format_engagement(&self, report: &EngagementReport) -> String;

    /// Format geographic and temporal distributions
    fn format_geo(&self, report: &GeoReport) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    /// Truncate rankings and distributions to this many rows
    pub top: Option<usize>,
}

impl TableFormatter {
    pub fn new(top: Option<usize>) -> Self {
        Self { top }
    }

    /// Format a number with thousands separators
    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    fn format_rate(rate: f64) -> String {
        format!("{rate:.2}%")
    }

    fn format_decimal(value: f64) -> String {
        format!("{value:.2}")
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn limit<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        match self.top {
            Some(n) if n < rows.len() => &rows[..n],
            _ => rows,
        }
    }

    fn push_section(output: &mut String, title: &str, body: String) {
        output.push_str(&format!("\n{}\n", title.bold()));
        output.push_str(&body);
    }

    fn metrics_table(metrics: &[(&str, String)]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Metric", b -> "Value"]);
        for (name, value) in metrics {
            table.add_row(row![name, r -> value]);
        }
        table.to_string()
    }

    fn counts_table(&self, label: &str, rows: &[CountRow]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> label, b -> "Count"]);
        for item in self.limit(rows) {
            table.add_row(row![item.label, r -> Self::format_number(item.count)]);
        }
        table.to_string()
    }

    fn ranked_table(&self, rows: &[RankedEntry]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "#", b -> "Name", b -> "Id", b -> "Count"]);
        for (rank, entry) in self.limit(rows).iter().enumerate() {
            table.add_row(row![
                r -> rank + 1,
                entry.name,
                entry.id,
                r -> Self::format_number(entry.count)
            ]);
        }
        table.to_string()
    }

    fn series_table(series: &[(&str, &[PeriodCount])]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Period", b -> "Start", b -> "Sessions"]);
        for (name, points) in series {
            for p in *points {
                table.add_row(row![
                    name,
                    p.period_start.to_string(),
                    r -> Self::format_number(p.count)
                ]);
            }
        }
        table.to_string()
    }

    fn histogram_table(bins: &[HistogramBin]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Duration (minutes)", b -> "Sessions"]);
        for bin in bins {
            table.add_row(row![
                format!("{:.0} - {:.0}", bin.lower_minutes, bin.upper_minutes),
                r -> Self::format_number(bin.count)
            ]);
        }
        table.to_string()
    }

    fn device_country_table(rows: &[DeviceCountryRow]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Country", b -> "Device", b -> "Users"]);
        for item in rows {
            table.add_row(row![item.country, item.device, r -> Self::format_number(item.count)]);
        }
        table.to_string()
    }

    fn trend_table(rows: &[TrendRow]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Month", b -> "Country", b -> "Signups"]);
        for item in rows {
            table.add_row(row![item.year_month, item.country, r -> Self::format_number(item.count)]);
        }
        table.to_string()
    }

    fn push_counts(&self, output: &mut String, title: &str, label: &str, rows: Option<&Vec<CountRow>>) {
        if let Some(rows) = rows {
            Self::push_section(output, title, self.counts_table(label, rows));
        }
    }

    fn push_warnings(output: &mut String, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        output.push('\n');
        for warning in warnings {
            output.push_str(&format!("{}\n", format!("Warning: {warning}").yellow()));
        }
    }
}

impl OutputFormatter for TableFormatter {
    fn format_overview(&self, report: &OverviewReport) -> String {
        let mut metrics = vec![("Total users", Self::format_number(report.total_users))];
        if let Some(active) = report.active_users {
            metrics.push(("Active users", Self::format_number(active)));
        }
        if let Some(new) = report.new_users {
            metrics.push(("New users today", Self::format_number(new)));
        }
        if let Some(days) = report.active_days {
            metrics.push(("Active days", Self::format_number(days)));
        }
        if let Some(countries) = report.distinct_countries {
            metrics.push(("Countries", Self::format_number(countries)));
        }

        let mut output = String::new();
        Self::push_section(&mut output, "Overview", Self::metrics_table(&metrics));
        self.push_counts(&mut output, "Users by country", "Country", report.country_distribution.as_ref());
        self.push_counts(&mut output, "Users by gender", "Gender", report.gender_distribution.as_ref());
        if let Some(rows) = &report.app_opens_by_weekday {
            Self::push_section(
                &mut output,
                "App opens by weekday",
                TableFormatter::new(None).counts_table("Weekday", rows),
            );
        }
        Self::push_warnings(&mut output, &report.warnings);
        output
    }

    fn format_audience(&self, report: &AudienceReport) -> String {
        let mut metrics = vec![
            ("Users", Self::format_number(report.total_users)),
            ("Sessions", Self::format_number(report.total_sessions)),
            ("Retention rate", Self::format_rate(report.retention_rate)),
        ];
        if let Some(minutes) = report.avg_session_duration_minutes {
            metrics.push(("Avg session duration (min)", Self::format_decimal(minutes)));
        }
        if let Some(pages) = report.pages_per_session {
            metrics.push(("Pages per session", Self::format_decimal(pages)));
        }

        let mut output = String::new();
        Self::push_section(&mut output, "Audience", Self::metrics_table(&metrics));
        self.push_counts(&mut output, "Users by country", "Country", report.country_distribution.as_ref());
        self.push_counts(&mut output, "Users by device", "Device", report.device_distribution.as_ref());
        self.push_counts(&mut output, "Most visited pages", "Page", report.most_visited_pages.as_ref());
        if let Some(users) = &report.most_active_users {
            Self::push_section(&mut output, "Most active users", self.ranked_table(users));
        }
        if let Some(providers) = &report.most_active_providers {
            Self::push_section(&mut output, "Most active providers", self.ranked_table(providers));
        }
        self.push_counts(&mut output, "Users by age", "Age", report.age_distribution.as_ref());
        self.push_counts(&mut output, "Users by gender", "Gender", report.gender_distribution.as_ref());
        self.push_counts(&mut output, "Users by town", "Town", report.town_distribution.as_ref());
        self.push_counts(&mut output, "Users by source", "Source", report.source_distribution.as_ref());
        Self::push_warnings(&mut output, &report.warnings);
        output
    }

    fn format_engagement(&self, report: &EngagementReport) -> String {
        let mut metrics = vec![(
            "Conversion rate",
            format!(
                "{} ({})",
                Self::format_rate(report.conversion_rate),
                report.conversion_basis
            ),
        )];
        if let Some(active) = report.active_users {
            metrics.push(("DAU", Self::format_decimal(active.dau)));
            metrics.push(("WAU", Self::format_decimal(active.wau)));
            metrics.push(("MAU", Self::format_decimal(active.mau)));
        }
        metrics.extend([
            ("Daily users", Self::format_number(report.frequency.daily)),
            ("Weekly users", Self::format_number(report.frequency.weekly)),
            ("Monthly users", Self::format_number(report.frequency.monthly)),
            (
                "Avg sessions per user",
                Self::format_decimal(report.avg_sessions_per_user),
            ),
        ]);
        if let Some(minutes) = report.avg_session_duration_minutes {
            metrics.push(("Avg session duration (min)", Self::format_decimal(minutes)));
        }

        let mut output = String::new();
        Self::push_section(&mut output, "Engagement", Self::metrics_table(&metrics));
        if let (Some(daily), Some(weekly), Some(monthly)) = (
            &report.daily_series,
            &report.weekly_series,
            &report.monthly_series,
        ) {
            Self::push_section(
                &mut output,
                "Active sessions per period",
                Self::series_table(&[
                    ("day", daily.as_slice()),
                    ("week", weekly.as_slice()),
                    ("month", monthly.as_slice()),
                ]),
            );
        }
        self.push_counts(&mut output, "Most visited pages", "Page", report.most_visited_pages.as_ref());
        self.push_counts(&mut output, "Most pressed buttons", "Button", report.most_pressed_buttons.as_ref());
        if let Some(bins) = &report.duration_histogram {
            Self::push_section(&mut output, "Session durations", Self::histogram_table(bins));
        }
        self.push_counts(&mut output, "Users by country", "Country", report.country_distribution.as_ref());
        Self::push_warnings(&mut output, &report.warnings);
        output
    }

    fn format_geo(&self, report: &GeoReport) -> String {
        let mut output = String::new();
        self.push_counts(&mut output, "Users by country", "Country", report.country_distribution.as_ref());
        if let Some(rows) = &report.device_by_country {
            Self::push_section(&mut output, "Devices by country", Self::device_country_table(rows));
        }
        if let Some(rows) = &report.signup_trend {
            Self::push_section(&mut output, "Signups per month", Self::trend_table(rows));
        }
        if let Some(rows) = &report.sessions_by_weekday {
            Self::push_section(
                &mut output,
                "Sessions by weekday",
                TableFormatter::new(None).counts_table("Weekday", rows),
            );
        }
        self.push_counts(&mut output, "Users by town", "Town", report.town_distribution.as_ref());
        Self::push_warnings(&mut output, &report.warnings);
        output
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    fn to_json<T: Serialize>(report: &T) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize report: {}", e);
            serde_json::json!({ "error": e.to_string() }).to_string()
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_overview(&self, report: &OverviewReport) -> String {
        Self::to_json(report)
    }

    fn format_audience(&self, report: &AudienceReport) -> String {
        Self::to_json(report)
    }

    fn format_engagement(&self, report: &EngagementReport) -> String {
        Self::to_json(report)
    }

    fn format_geo(&self, report: &GeoReport) -> String {
        Self::to_json(report)
    }
}

/// Get the formatter for the requested output mode
pub fn get_formatter(json: bool, top: Option<usize>) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(top))
    }
}
