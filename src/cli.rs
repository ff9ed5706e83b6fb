//! CLI interface for appstat
//!
//! This module defines the command-line interface using clap:
//! `appstat [global flags] <view>`. Filters and output flags are global so
//! they can be placed before or after the subcommand.
//!
//! # Example
//!
//! ```bash
//! # Engagement figures for French Android users in the first quarter
//! appstat engagement --country France --device android --since 2024-01 --until 2024-03
//!
//! # Audience report as JSON from another snapshot directory
//! appstat --data-dir exports/2024-06 audience --json
//!
//! # Flatten a JSON dump into the CSV files the other commands read
//! appstat export --from dump --out exports/latest
//! ```

use appstat_core::aggregation_types::ConversionBasis;
use appstat_core::error::{AppstatError, Result};
use appstat_core::filters::{DateRange, FilterConfig};
use appstat_core::town::TownNormalizer;
use appstat_core::types::Device;
use appstat_loader::LoadOptions;
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Compute retention, engagement and audience metrics from app CSV exports
#[derive(Parser, Debug, Clone)]
#[command(name = "appstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the exported CSV files
    #[arg(long, short = 'd', env = "APPSTAT_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Keep only users from this country (repeatable)
    #[arg(long = "country", short = 'c', global = true)]
    pub countries: Vec<String>,

    /// Keep only users on this device: android or ios (repeatable)
    #[arg(long = "device", global = true)]
    pub devices: Vec<Device>,

    /// Filter by start date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Filter by end date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Fail on unparsable timestamps instead of treating them as missing
    #[arg(long, global = true)]
    pub strict_dates: bool,

    /// Timezone deciding what "today" is (e.g. "Africa/Douala", "Europe/Paris", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for "today" (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Show only the first N rows of each ranking in table output
    #[arg(long, global = true)]
    pub top: Option<usize>,

    /// Extra town alias as FROM=TO (repeatable)
    #[arg(long = "town-alias", global = true)]
    pub town_aliases: Vec<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Arguments shared by the engagement view and the narrative report
#[derive(Args, Debug, Clone)]
pub struct EngagementArgs {
    /// What counts as a converted signup: sessions or transactions
    #[arg(long, default_value = "sessions")]
    pub conversion: ConversionBasis,

    /// Width of the session duration histogram bins, in minutes
    #[arg(long, default_value = "5")]
    pub bin_minutes: f64,
}

/// Arguments for the bulk export
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Directory of JSON array dumps to read
    #[arg(long)]
    pub from: PathBuf,

    /// Directory the CSV files are written to
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Collection whose documents hold the nested event collections
    #[arg(long, default_value = "Analyse")]
    pub parent: String,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Headline user and activity figures
    Overview,

    /// Who the users are: demographics, devices, pages and top users
    Audience,

    /// Conversion, DAU/WAU/MAU, loyalty segments and session durations
    Engagement(EngagementArgs),

    /// Geographic distributions and signup trends
    Geo,

    /// Markdown narrative of the engagement figures
    Report(EngagementArgs),

    /// Flatten document collections into CSV files
    Export(ExportArgs),
}

impl Cli {
    /// Filter built from the country, device and date flags
    ///
    /// `today` closes a range given only `--since`.
    pub fn filter_config(&self, today: NaiveDate) -> Result<FilterConfig> {
        let mut filter = FilterConfig::new().with_countries(self.countries.iter().cloned());
        for device in &self.devices {
            filter = filter.with_device(*device);
        }

        let range = match (&self.since, &self.until) {
            (None, None) => None,
            (since, until) => {
                let start = match since {
                    Some(s) => parse_date_bound(s, Bound::Start)?,
                    None => NaiveDate::MIN,
                };
                let end = match until {
                    Some(s) => parse_date_bound(s, Bound::End)?,
                    None => today,
                };
                Some(DateRange::new(start, end)?)
            }
        };

        Ok(match range {
            Some(range) => filter.with_date_range(range),
            None => filter,
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        if self.strict_dates {
            LoadOptions::strict()
        } else {
            LoadOptions::lenient()
        }
    }

    /// Built-in town aliases extended with `--town-alias`
    pub fn town_normalizer(&self) -> Result<TownNormalizer> {
        self.town_aliases
            .iter()
            .try_fold(TownNormalizer::default(), |towns, spec| {
                towns.with_alias_spec(spec)
            })
    }
}

/// Which end of a range a date flag sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse a date flag in YYYY-MM-DD or YYYY-MM format
///
/// A bare month expands to its first day as a start bound and to its last
/// day as an end bound.
///
/// # Examples
/// ```
/// use appstat::cli::{Bound, parse_date_bound};
/// use chrono::NaiveDate;
///
/// let start = parse_date_bound("2024-02", Bound::Start).unwrap();
/// let end = parse_date_bound("2024-02", Bound::End).unwrap();
/// assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn parse_date_bound(date_str: &str, bound: Bound) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() != 2 {
        return Err(AppstatError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )));
    }

    let year = parts[0]
        .parse::<i32>()
        .map_err(|_| AppstatError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
    let month = parts[1]
        .parse::<u32>()
        .map_err(|_| AppstatError::InvalidDate(format!("Invalid month in '{date_str}'")))?;
    if !(1..=12).contains(&month) {
        return Err(AppstatError::InvalidDate(format!(
            "Month must be between 1-12, got {month}"
        )));
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppstatError::InvalidDate(format!("Invalid date: {date_str}")))?;
    match bound {
        Bound::Start => Ok(first),
        Bound::End => {
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            };
            next.and_then(|d| d.pred_opt())
                .filter(|d| d.month() == month)
                .ok_or_else(|| AppstatError::InvalidDate(format!("Invalid date: {date_str}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "appstat",
            "--country",
            "France",
            "--country",
            "USA",
            "engagement",
            "--device",
            "ios",
            "--conversion",
            "transactions",
            "--json",
        ]);
        assert!(cli.json);
        assert_eq!(cli.countries, vec!["France", "USA"]);
        assert_eq!(cli.devices, vec![Device::Ios]);
        match &cli.command {
            Command::Engagement(args) => {
                assert_eq!(args.conversion, ConversionBasis::Transactions);
                assert_eq!(args.bin_minutes, 5.0);
            }
            other => panic!("Expected Engagement command, got {other:?}"),
        }
    }

    #[test]
    fn test_export_parsing() {
        let cli = Cli::parse_from(["appstat", "export", "--from", "dump", "--out", "csv"]);
        match &cli.command {
            Command::Export(args) => {
                assert_eq!(args.from, PathBuf::from("dump"));
                assert_eq!(args.parent, "Analyse");
            }
            other => panic!("Expected Export command, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["appstat", "export"]).is_err());
        assert!(Cli::try_parse_from(["appstat", "overview", "--device", "windows"]).is_err());
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(parse_date_bound("2024-01-15", Bound::End).unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date_bound("2024-12", Bound::End).unwrap(), date(2024, 12, 31));
        assert_eq!(parse_date_bound("2023-02", Bound::End).unwrap(), date(2023, 2, 28));
        assert_eq!(parse_date_bound("2024-12", Bound::Start).unwrap(), date(2024, 12, 1));

        assert!(parse_date_bound("invalid", Bound::Start).is_err());
        assert!(parse_date_bound("2024-13", Bound::Start).is_err());
        assert!(parse_date_bound("2024", Bound::Start).is_err());
    }

    #[test]
    fn test_filter_config() {
        let today = date(2024, 6, 15);

        let cli = Cli::parse_from(["appstat", "overview"]);
        assert!(cli.filter_config(today).unwrap().is_empty());

        let cli = Cli::parse_from(["appstat", "overview", "--since", "2024-05"]);
        let range = cli.filter_config(today).unwrap().date_range.unwrap();
        assert_eq!(range.start(), date(2024, 5, 1));
        assert_eq!(range.end(), today);

        let cli = Cli::parse_from(["appstat", "overview", "--until", "2024-05"]);
        let range = cli.filter_config(today).unwrap().date_range.unwrap();
        assert_eq!(range.start(), NaiveDate::MIN);
        assert_eq!(range.end(), date(2024, 5, 31));

        let cli = Cli::parse_from(["appstat", "overview", "--since", "2024-06", "--until", "2024-05"]);
        assert!(matches!(
            cli.filter_config(today),
            Err(AppstatError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_town_aliases() {
        let cli = Cli::parse_from(["appstat", "geo", "--town-alias", "dla=Douala"]);
        let towns = cli.town_normalizer().unwrap();
        assert_eq!(towns.normalize("DLA"), "Douala");

        let cli = Cli::parse_from(["appstat", "geo", "--town-alias", "dla"]);
        assert!(cli.town_normalizer().is_err());
    }
}
