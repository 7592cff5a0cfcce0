//! Timestamps are stored as fixed-width UTC strings (`2026-03-01T09:30:00.000Z`).
//!
//! The fixed width keeps lexicographic and chronological order identical, so
//! range filters can compare the stored text directly on every backend, and
//! the first ten characters are always the calendar date.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid timestamp '{0}': expected an RFC 3339 date-time")]
pub struct InvalidTimestamp(pub String);

#[must_use]
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, InvalidTimestamp> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| InvalidTimestamp(input.to_string()))
}

/// Parses any RFC 3339 input and re-encodes it in the stored form.
pub fn normalize_timestamp(input: &str) -> Result<String, InvalidTimestamp> {
    parse_timestamp(input).map(format_timestamp)
}

/// Like [`normalize_timestamp`], but a bare `YYYY-MM-DD` also passes and
/// means midnight UTC on that day.
pub fn normalize_range_bound(input: &str) -> Result<String, InvalidTimestamp> {
    parse_timestamp(input).map(format_timestamp).or_else(|err| {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| format_timestamp(midnight.and_utc()))
            .ok_or(err)
    })
}

/// The `YYYY-MM-DD` prefix of a stored timestamp.
#[must_use]
pub fn date_part(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
