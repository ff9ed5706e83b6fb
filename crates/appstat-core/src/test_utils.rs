//! Shared test utilities for unit tests
//!
//! Integration tests cannot see this module (it is `#[cfg(test)]`); they have
//! their own builders in tests/common/mod.rs.

use crate::types::{Session, User, UserId};
use chrono::NaiveDateTime;

/// Parse a `YYYY-MM-DD HH:MM:SS` literal
pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// A user with a country and an optional creation time
pub fn user(uid: &str, country: &str, created: Option<&str>) -> User {
    User {
        uid: UserId::new(uid),
        country: Some(country.to_string()),
        creation_time: created.map(dt),
        ..Default::default()
    }
}

/// A session with optional bounds and duration
pub fn session(uid: &str, start: Option<&str>, end: Option<&str>, duration: Option<f64>) -> Session {
    Session {
        uid: UserId::new(uid),
        session_start: start.map(dt),
        session_end: end.map(dt),
        duration_seconds: duration,
        ..Default::default()
    }
}
