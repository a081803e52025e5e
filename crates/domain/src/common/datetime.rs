//! Reference-date parsing for relative date resolution.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a reference date given as RFC3339 or a plain `YYYY-MM-DD` day.
///
/// RFC3339 values are converted to UTC before the offset is dropped.
///
/// # Examples
///
/// ```
/// use storyteller_domain::common::parse_reference_date;
/// use chrono::Datelike;
///
/// let dt = parse_reference_date("2024-01-15").unwrap();
/// assert_eq!(dt.year(), 2024);
/// assert!(parse_reference_date("next tuesday").is_none());
/// ```
pub fn parse_reference_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
