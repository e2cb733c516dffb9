//! Clock and calendar formatting helpers
//!
//! Reservations store their slot as minute offsets from local midnight
//! (`300` = 05:00) and their day as a bare calendar date.

use chrono::{DateTime, NaiveDate};

/// Minutes in a day; the exclusive upper bound of a slot end.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Format a minute offset as `HH:MM`, zero padded.
pub fn format_minutes(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Format a calendar day as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a day from either `YYYY-MM-DD` or a full RFC 3339 timestamp.
///
/// For timestamps the calendar day is taken in the timestamp's own offset.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive())
}
