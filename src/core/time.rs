//! Shared timestamp helpers for moderation records.
//!
//! Timestamps are stored as RFC 3339 UTC strings; stat dates as `YYYY-MM-DD`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use ulid::Ulid;

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Stat-date key for a timestamp, e.g. `2026-08-23`.
pub fn stat_date(ts: DateTime<Utc>) -> String {
    ts.date_naive().format("%Y-%m-%d").to_string()
}

/// Mute expiry: `now + duration_minutes`, as stored in `user_warnings.mute_until`.
pub fn mute_expiry(now: DateTime<Utc>, duration_minutes: i64) -> DateTime<Utc> {
    now + Duration::minutes(duration_minutes)
}

pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn parse_stat_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}
