#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use sojourn::db;
use sojourn::history::types::NewTrip;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Shorthand for a UTC instant at `seconds` past the epoch.
pub fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

/// A minimal trip request: everything optional left absent.
pub fn bare_trip(start: DateTime<Utc>, name: &str) -> NewTrip {
    NewTrip {
        start,
        end: None,
        group: None,
        name: name.into(),
        country: None,
        timezone_offset: None,
    }
}
