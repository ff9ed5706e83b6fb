//! Common test utilities for appstat tests
//!
//! [`Snapshot`] writes the six CSV files of an export snapshot into a
//! temporary directory, with the full header unless a test overrides it.

#![allow(dead_code)]

use appstat_loader::data_loader::{
    APP_OPENS_FILE, BUTTON_PRESSES_FILE, PROVIDERS_FILE, SESSIONS_FILE, TRANSACTIONS_FILE,
    USERS_FILE,
};
use appstat_loader::page_list;
use chrono::NaiveDate;
use tempfile::TempDir;

pub const USERS_HEADER: &str =
    "uid,country,isAndroid,creationTime,status,gender,age,town,source,first_name,last_name";
pub const SESSIONS_HEADER: &str =
    "uid,session_start,session_end,session_duration_in_seconds,visited_pages,conversion,favorites";
pub const APP_OPENS_HEADER: &str = "time,uid";
pub const BUTTON_PRESSES_HEADER: &str = "uid,button,time";
pub const TRANSACTIONS_HEADER: &str = "prestataireUid,creationTime";
pub const PROVIDERS_HEADER: &str = "uid,companyName";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builder for a snapshot directory
pub struct Snapshot {
    users_header: String,
    sessions_header: String,
    app_opens_header: String,
    users: Vec<String>,
    sessions: Vec<String>,
    app_opens: Vec<String>,
    button_presses: Vec<String>,
    transactions: Vec<String>,
    providers: Vec<String>,
    skip: Vec<&'static str>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            users_header: USERS_HEADER.to_string(),
            sessions_header: SESSIONS_HEADER.to_string(),
            app_opens_header: APP_OPENS_HEADER.to_string(),
            users: Vec::new(),
            sessions: Vec::new(),
            app_opens: Vec::new(),
            button_presses: Vec::new(),
            transactions: Vec::new(),
            providers: Vec::new(),
            skip: Vec::new(),
        }
    }

    /// An active user with only the key fields set
    pub fn user(self, uid: &str, country: &str, is_android: bool, created: &str) -> Self {
        let row = format!("{uid},{country},{is_android},{created},active,,,,,,");
        self.user_row(&row)
    }

    /// A user row matching [`USERS_HEADER`] verbatim
    pub fn user_row(mut self, row: &str) -> Self {
        self.users.push(row.to_string());
        self
    }

    /// Replace the users header; rows must follow it
    pub fn users_header(mut self, header: &str) -> Self {
        self.users_header = header.to_string();
        self
    }

    /// Replace the sessions header; rows must follow it
    pub fn sessions_header(mut self, header: &str) -> Self {
        self.sessions_header = header.to_string();
        self
    }

    pub fn session(
        mut self,
        uid: &str,
        start: &str,
        end: &str,
        duration_seconds: f64,
        pages: &[&str],
    ) -> Self {
        self.sessions.push(format!(
            "{uid},{start},{end},{duration_seconds},\"{}\",true,0",
            page_list::encode(pages)
        ));
        self
    }

    /// A session row matching [`SESSIONS_HEADER`] verbatim
    pub fn session_row(mut self, row: &str) -> Self {
        self.sessions.push(row.to_string());
        self
    }

    pub fn app_open(mut self, uid: &str, time: &str) -> Self {
        self.app_opens.push(format!("{time},{uid}"));
        self
    }

    /// Replace the app-opens header and add rows that follow it
    pub fn app_opens_rows(mut self, header: &str, rows: &[&str]) -> Self {
        self.app_opens_header = header.to_string();
        self.app_opens.extend(rows.iter().map(|r| r.to_string()));
        self
    }

    pub fn button_press(mut self, uid: &str, button: &str, time: &str) -> Self {
        self.button_presses.push(format!("{uid},{button},{time}"));
        self
    }

    pub fn transaction(mut self, provider: &str, time: &str) -> Self {
        self.transactions.push(format!("{provider},{time}"));
        self
    }

    pub fn provider(mut self, uid: &str, company: &str) -> Self {
        self.providers.push(format!("{uid},{company}"));
        self
    }

    /// Leave one file out of the snapshot
    pub fn without(mut self, file: &'static str) -> Self {
        self.skip.push(file);
        self
    }

    /// Write every file into a fresh temporary directory
    pub fn write(self) -> TempDir {
        let dir = TempDir::new().unwrap();
        let files = [
            (USERS_FILE, self.users_header.as_str(), &self.users),
            (SESSIONS_FILE, self.sessions_header.as_str(), &self.sessions),
            (APP_OPENS_FILE, self.app_opens_header.as_str(), &self.app_opens),
            (BUTTON_PRESSES_FILE, BUTTON_PRESSES_HEADER, &self.button_presses),
            (TRANSACTIONS_FILE, TRANSACTIONS_HEADER, &self.transactions),
            (PROVIDERS_FILE, PROVIDERS_HEADER, &self.providers),
        ];
        for (name, header, rows) in files {
            if self.skip.contains(&name) {
                continue;
            }
            let mut content = format!("{header}\n");
            for row in rows {
                content.push_str(row);
                content.push('\n');
            }
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }
}

/// The three-user snapshot used by the retention scenario
pub fn retention_snapshot() -> Snapshot {
    Snapshot::new()
        .user("u1", "FR", true, "2024-01-10 09:00:00")
        .user("u2", "FR", false, "2024-01-11 09:00:00")
        .user("u3", "US", true, "2024-01-12 09:00:00")
        .session(
            "u1",
            "2024-02-01 10:00:00",
            "2024-02-01 10:02:00",
            120.0,
            &["home", "search"],
        )
        .session(
            "u2",
            "2024-02-02 10:00:00",
            "2024-02-02 10:05:00",
            300.0,
            &["home"],
        )
}
