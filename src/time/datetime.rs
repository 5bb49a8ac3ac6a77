//! Timestamp parsing and timezone conversion helpers

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::time::SystemTime;

/// Naive formats tried after RFC 3339, all assumed to be UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a container creation date into a UTC naive datetime
///
/// Accepts RFC 3339 (`Z` or `+08:00`), offsets without a colon (`+0800`,
/// as written by some QuickTime encoders) and bare timestamps, which are
/// taken to be UTC already.
pub fn parse_video_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.naive_utc());
    }

    if let Some(stripped) = s.strip_suffix('Z') {
        return parse_naive(stripped);
    }

    parse_naive(s)
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

/// Convert a UTC naive datetime to local wall-clock time
pub fn utc_to_local(utc: NaiveDateTime) -> NaiveDateTime {
    Local.from_utc_datetime(&utc).naive_local()
}

/// Local wall-clock time of a filesystem timestamp
pub fn system_time_to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
