// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Shared helpers for date/time formatting and month keys.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Extract "YYYY-MM" from an ISO 8601 date string.
///
/// Timestamps are stored as RFC3339 strings, so the month key is a prefix.
pub fn extract_month_key(date: &str) -> Option<&str> {
    if date.len() >= 7 {
        Some(&date[..7])
    } else {
        None
    }
}

/// Month key ("YYYY-MM") for a UTC timestamp.
pub fn month_key(date: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// First and last instant of the calendar month containing `date`,
/// as RFC3339 strings. Used for `MonthlyChallenge` date bounds.
pub fn month_bounds(date: DateTime<Utc>) -> (String, String) {
    let start = date
        .date_naive()
        .with_day(1)
        .expect("day 1 always valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight always valid")
        .and_utc();
    let next_month = if start.month() == 12 {
        start
            .with_year(start.year() + 1)
            .and_then(|d| d.with_month(1))
    } else {
        start.with_month(start.month() + 1)
    }
    .expect("first of month always valid");
    let end = next_month - chrono::Duration::seconds(1);
    (format_utc_rfc3339(start), format_utc_rfc3339(end))
}
