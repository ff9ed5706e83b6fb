//! Data loader for exported CSV snapshots
//!
//! A snapshot directory holds one CSV file per table. Each table can be
//! loaded on its own, or several at once with [`DataLoader::load`], which
//! reads the requested files concurrently on the current task.
//!
//! Columns missing from a header leave the matching field empty; the
//! table remembers which columns were present so that report sections can
//! be skipped with a warning instead of failing.
//!
//! # Examples
//!
//! ```no_run
//! use appstat_loader::{DataLoader, LoadOptions, TableKind};
//!
//! # async fn example() -> appstat_core::Result<()> {
//! let loader = DataLoader::new("exports/2024-06")?.with_options(LoadOptions::strict());
//! let dataset = loader.load(&[TableKind::Users, TableKind::Sessions]).await?;
//! println!("{} users, {} sessions", dataset.users.len(), dataset.sessions.len());
//! # Ok(())
//! # }
//! ```

use crate::page_list;
use crate::timestamp::{self, TimestampMode};
use appstat_core::error::{AppstatError, Result};
use appstat_core::types::{
    AppOpenEvent, ButtonPressEvent, Dataset, Provider, ProviderId, Session, Table, Transaction,
    User, UserId, columns,
};
use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const USERS_FILE: &str = "users.csv";
pub const SESSIONS_FILE: &str = "sessions_with_pages_true.csv";
pub const APP_OPENS_FILE: &str = "appOpenedTime.csv";
pub const BUTTON_PRESSES_FILE: &str = "buttonPressedTime.csv";
pub const TRANSACTIONS_FILE: &str = "transaction.csv";
pub const PROVIDERS_FILE: &str = "prestataires.csv";

/// The tables of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Users,
    Sessions,
    AppOpens,
    ButtonPresses,
    Transactions,
    Providers,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::Users,
        TableKind::Sessions,
        TableKind::AppOpens,
        TableKind::ButtonPresses,
        TableKind::Transactions,
        TableKind::Providers,
    ];

    /// File name inside the snapshot directory
    pub fn file_name(&self) -> &'static str {
        match self {
            TableKind::Users => USERS_FILE,
            TableKind::Sessions => SESSIONS_FILE,
            TableKind::AppOpens => APP_OPENS_FILE,
            TableKind::ButtonPresses => BUTTON_PRESSES_FILE,
            TableKind::Transactions => TRANSACTIONS_FILE,
            TableKind::Providers => PROVIDERS_FILE,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Cells pandas reads as missing, matched exactly
const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Per-table timestamp handling and visited-pages decoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    modes: [TimestampMode; 6],
    skip_visited_pages: bool,
}

impl LoadOptions {
    /// Unparsable timestamps become null everywhere
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Unparsable timestamps abort loading everywhere
    pub fn strict() -> Self {
        Self {
            modes: [TimestampMode::Strict; 6],
            skip_visited_pages: false,
        }
    }

    /// Override the mode of one table
    pub fn with_mode(mut self, kind: TableKind, mode: TimestampMode) -> Self {
        self.modes[kind.index()] = mode;
        self
    }

    pub fn mode(&self, kind: TableKind) -> TimestampMode {
        self.modes[kind.index()]
    }

    /// Leave `visited_pages` undecoded; the loaded sessions table then
    /// reports the column as absent
    pub fn without_visited_pages(mut self) -> Self {
        self.skip_visited_pages = true;
        self
    }

    pub fn decodes_visited_pages(&self) -> bool {
        !self.skip_visited_pages
    }
}

/// Loader bound to one snapshot directory
pub struct DataLoader {
    data_dir: PathBuf,
    options: LoadOptions,
    show_progress: bool,
}

impl DataLoader {
    /// Create a loader for `data_dir`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the directory does not exist
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if !data_dir.is_dir() {
            return Err(AppstatError::Config(format!(
                "data directory {} does not exist",
                data_dir.display()
            )));
        }

        debug!("Using data directory {}", data_dir.display());
        Ok(Self {
            data_dir,
            options: LoadOptions::default(),
            show_progress: false,
        })
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Show a spinner while loading
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the requested tables; the others stay empty
    pub async fn load(&self, kinds: &[TableKind]) -> Result<Dataset> {
        let wants = |kind: TableKind| kinds.contains(&kind);

        let progress = self.spinner(kinds.len());

        let (users, sessions, app_opens, button_presses, transactions, providers) = futures::try_join!(
            async {
                if wants(TableKind::Users) {
                    self.load_users().await
                } else {
                    Ok(Table::default())
                }
            },
            async {
                if wants(TableKind::Sessions) {
                    self.load_sessions().await
                } else {
                    Ok(Table::default())
                }
            },
            async {
                if wants(TableKind::AppOpens) {
                    self.load_app_opens().await
                } else {
                    Ok(Table::default())
                }
            },
            async {
                if wants(TableKind::ButtonPresses) {
                    self.load_button_presses().await
                } else {
                    Ok(Table::default())
                }
            },
            async {
                if wants(TableKind::Transactions) {
                    self.load_transactions().await
                } else {
                    Ok(Table::default())
                }
            },
            async {
                if wants(TableKind::Providers) {
                    self.load_providers().await
                } else {
                    Ok(Table::default())
                }
            },
        )?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        info!(
            users = users.len(),
            sessions = sessions.len(),
            app_opens = app_opens.len(),
            button_presses = button_presses.len(),
            transactions = transactions.len(),
            providers = providers.len(),
            "Loaded snapshot"
        );

        Ok(Dataset {
            users,
            sessions,
            app_opens,
            button_presses,
            transactions,
            providers,
        })
    }

    /// Load every table
    pub async fn load_all(&self) -> Result<Dataset> {
        self.load(&TableKind::ALL).await
    }

    pub async fn load_users(&self) -> Result<Table<User>> {
        let kind = TableKind::Users;
        let raw = self.read(kind).await?;
        let mode = self.options.mode(kind);

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(raw.records.len());
        for row in raw.rows() {
            let uid = UserId::new(row.text(columns::UID).unwrap_or_default());
            if !seen.insert(uid.clone()) {
                warn!(file = USERS_FILE, line = row.line, uid = %uid, "Duplicate user id");
            }
            rows.push(User {
                uid,
                country: row.text(columns::COUNTRY),
                is_android: row.boolean(columns::IS_ANDROID),
                creation_time: row.timestamp(columns::CREATION_TIME, mode)?,
                status: row.text(columns::STATUS),
                gender: row.text(columns::GENDER),
                age: row.text(columns::AGE),
                town: row.text(columns::TOWN),
                source: row.text(columns::SOURCE),
                first_name: row.text(columns::FIRST_NAME),
                last_name: row.text(columns::LAST_NAME),
            });
        }

        Ok(Table::new(rows, raw.headers))
    }

    pub async fn load_sessions(&self) -> Result<Table<Session>> {
        let kind = TableKind::Sessions;
        let raw = self.read(kind).await?;
        let mode = self.options.mode(kind);

        let decode_pages = self.options.decodes_visited_pages();

        let mut rows = Vec::with_capacity(raw.records.len());
        for row in raw.rows() {
            let visited_pages = match row.cell(columns::VISITED_PAGES) {
                Some(literal) if decode_pages => {
                    page_list::decode(literal).map_err(|e| AppstatError::PageList {
                        file: raw.path.clone(),
                        line: row.line,
                        error: e.to_string(),
                    })?
                }
                _ => Vec::new(),
            };

            rows.push(Session {
                uid: UserId::new(row.text(columns::UID).unwrap_or_default()),
                session_start: row.timestamp(columns::SESSION_START, mode)?,
                session_end: row.timestamp(columns::SESSION_END, mode)?,
                duration_seconds: row.float(columns::SESSION_DURATION),
                visited_pages,
                conversion: row.boolean(columns::CONVERSION),
                favorites: row.float(columns::FAVORITES),
            });
        }

        let mut headers = raw.headers;
        if !decode_pages {
            debug!(file = SESSIONS_FILE, "Visited pages left undecoded");
            headers.retain(|h| h != columns::VISITED_PAGES);
        }
        Ok(Table::new(rows, headers))
    }

    pub async fn load_app_opens(&self) -> Result<Table<AppOpenEvent>> {
        let kind = TableKind::AppOpens;
        let raw = self.read(kind).await?;
        let mode = self.options.mode(kind);

        let mut rows = Vec::with_capacity(raw.records.len());
        for row in raw.rows() {
            rows.push(AppOpenEvent {
                uid: row.text(columns::UID).map(UserId::new),
                time: row.timestamp(columns::TIME, mode)?,
            });
        }

        Ok(Table::new(rows, raw.headers))
    }

    pub async fn load_button_presses(&self) -> Result<Table<ButtonPressEvent>> {
        let kind = TableKind::ButtonPresses;
        let raw = self.read(kind).await?;
        let mode = self.options.mode(kind);

        let mut rows = Vec::with_capacity(raw.records.len());
        for row in raw.rows() {
            rows.push(ButtonPressEvent {
                uid: UserId::new(row.text(columns::UID).unwrap_or_default()),
                button: row.text(columns::BUTTON).unwrap_or_default(),
                time: row.timestamp(columns::TIME, mode)?,
            });
        }

        Ok(Table::new(rows, raw.headers))
    }

    pub async fn load_transactions(&self) -> Result<Table<Transaction>> {
        let kind = TableKind::Transactions;
        let raw = self.read(kind).await?;
        let mode = self.options.mode(kind);

        let mut rows = Vec::with_capacity(raw.records.len());
        for row in raw.rows() {
            rows.push(Transaction {
                provider_id: ProviderId::new(row.text(columns::PROVIDER_UID).unwrap_or_default()),
                creation_time: row.timestamp(columns::CREATION_TIME, mode)?,
            });
        }

        Ok(Table::new(rows, raw.headers))
    }

    pub async fn load_providers(&self) -> Result<Table<Provider>> {
        let raw = self.read(TableKind::Providers).await?;

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(raw.records.len());
        for row in raw.rows() {
            let uid = ProviderId::new(row.text(columns::UID).unwrap_or_default());
            if !seen.insert(uid.clone()) {
                warn!(file = PROVIDERS_FILE, line = row.line, uid = %uid, "Duplicate provider id");
            }
            rows.push(Provider {
                uid,
                company_name: row.text(columns::COMPANY_NAME),
            });
        }

        Ok(Table::new(rows, raw.headers))
    }

    fn spinner(&self, tables: usize) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading {tables} tables from {}", self.data_dir.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }

    async fn read(&self, kind: TableKind) -> Result<RawTable> {
        let path = self.data_dir.join(kind.file_name());
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| AppstatError::Source {
                file: path.clone(),
                source,
            })?;
        let raw = RawTable::parse(path, &bytes)?;
        debug!(
            "Read {} rows with {} columns from {}",
            raw.records.len(),
            raw.headers.len(),
            kind.file_name()
        );
        Ok(raw)
    }
}

/// Parsed CSV file before typing
struct RawTable {
    path: PathBuf,
    headers: Vec<String>,
    records: Vec<csv::StringRecord>,
}

impl RawTable {
    fn parse(path: PathBuf, bytes: &[u8]) -> Result<Self> {
        let parse_error = |e: csv::Error| AppstatError::Parse {
            file: path.clone(),
            error: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(parse_error)?;

        Ok(Self {
            path,
            headers,
            records,
        })
    }

    fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.records.iter().enumerate().map(move |(idx, record)| RawRow {
            table: self,
            record,
            line: record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2),
        })
    }
}

struct RawRow<'a> {
    table: &'a RawTable,
    record: &'a csv::StringRecord,
    line: usize,
}

impl<'a> RawRow<'a> {
    /// Trimmed cell of `column`; blanks and NA markers are missing
    fn cell(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.headers.iter().position(|h| h == column)?;
        self.record
            .get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty() && !NA_VALUES.contains(v))
    }

    fn text(&self, column: &str) -> Option<String> {
        self.cell(column).map(str::to_string)
    }

    fn boolean(&self, column: &str) -> Option<bool> {
        let value = self.cell(column)?;
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => {
                debug!(line = self.line, column, value, "Unrecognized boolean");
                None
            }
        }
    }

    /// Finite number in `column`; `inf` and unparsable cells are missing
    fn float(&self, column: &str) -> Option<f64> {
        let value = self.cell(column)?;
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(number),
            _ => {
                debug!(line = self.line, column, value, "Unrecognized number");
                None
            }
        }
    }

    fn timestamp(&self, column: &str, mode: TimestampMode) -> Result<Option<NaiveDateTime>> {
        timestamp::parse_cell(self.cell(column), mode, &self.table.path, self.line, column)
    }
}
