//! Shared date and formatting helpers.
//!
//! These back both the repositories and the render layer.

use chrono::{DateTime, Datelike, Local, NaiveDate};

/// Format a date for display, e.g. `Jan 20, 2025`.
#[must_use]
pub fn format_date(date: &DateTime<Local>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format a calendar date for display, e.g. `Jan 20, 2025`.
#[must_use]
pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Parse a stored date-ish string and format it for display.
///
/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates. Unparseable
/// input yields the `—` placeholder; this never errors.
#[must_use]
pub fn format_display_date(value: &str) -> String {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return format_date(&timestamp.with_timezone(&Local));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return format_naive_date(date);
    }
    "—".to_string()
}

/// Calendar-day key for the wellness diary, `YYYY-MM-DD`.
#[must_use]
pub fn date_key(date: &DateTime<Local>) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Whole days between two instants, anchored at local midnight.
///
/// Zero or negative means the target day has arrived.
#[must_use]
pub fn days_until(target: &DateTime<Local>, now: &DateTime<Local>) -> i64 {
    (target.date_naive() - now.date_naive()).num_days()
}

/// Compact relative-time label for chat timestamps.
#[must_use]
pub fn relative_time(timestamp: &DateTime<Local>, now: &DateTime<Local>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);
    let seconds = elapsed.num_seconds();
    if seconds < 60 {
        return "Just now".to_string();
    }
    if seconds < 3600 {
        return format!("{}m ago", elapsed.num_minutes());
    }
    if seconds < 86_400 {
        return format!("{}h ago", elapsed.num_hours());
    }
    format_date(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_date_falls_back_to_placeholder() {
        assert_eq!(format_display_date("not a date"), "—");
        assert_eq!(format_display_date(""), "—");
    }

    #[test]
    fn display_date_accepts_plain_dates() {
        assert_eq!(format_display_date("2024-01-31"), "Jan 31, 2024");
    }

    #[test]
    fn days_until_is_midnight_anchored() {
        let now = Local.with_ymd_and_hms(2025, 1, 20, 23, 59, 0).single().expect("valid");
        let tomorrow = Local.with_ymd_and_hms(2025, 1, 21, 0, 5, 0).single().expect("valid");
        assert_eq!(days_until(&tomorrow, &now), 1);
    }
}
