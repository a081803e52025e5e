//! Free-form date parsing.
//!
//! Accepted forms (case-insensitive, optional leading qualifier):
//! - ISO-like: `2024-03-15`, `2024-03`, `2024-03-15T14:30`, `2024-03-15 14:30:05`
//! - Month names: `15 March 1200`, `March 15, 1200`, `March 1200`
//! - Bare and fictional years: `2024`, `Year 3042`, `1492 DR`, `-44`
//! - Era markers: `500 BCE`, `44 B.C.`, `AD 1066`, `1066 CE`
//! - Relative to the reference date: `today`, `yesterday`, `3 days ago`,
//!   `in 2 weeks`, `+1 year`, `6 months before reference`, `next spring`
//! - Ranges: `<date> to <date>`
//! - Qualifiers: `around`, `circa`, `ca.`, `c.`, `about`, `approximately`, `~`

use std::sync::LazyLock;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::time_point::{TimePoint, MAX_ABS_YEAR};

static QUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:~\s*|(?:around|circa|ca\.|c\.|about|approximately|approx\.)\s+)")
        .expect("valid regex")
});
static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+to\s+").expect("valid regex"));
static ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?)(\d{1,9})-(\d{1,2})(?:-(\d{1,2})(?:[T ](\d{1,2}):(\d{2})(?::(\d{2}))?(?:\.\d+)?Z?)?)?$",
    )
    .expect("valid regex")
});
static DAY_MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]+)\.?,?\s+(-?)(\d{1,9})$")
        .expect("valid regex")
});
static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(-?)(\d{1,9})$")
        .expect("valid regex")
});
static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+)\.?,?\s+(-?)(\d{1,9})$").expect("valid regex")
});
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:year\s+)?(-?)(\d{1,9})$").expect("valid regex"));
static OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(in\s+)?([+-])?\s*(\d{1,6})\s+(day|week|month|year)s?(?:\s+(ago|before|after|later|from\s+now))?(?:\s+(?:the\s+)?(?:reference(?:\s+date)?|today|now))?$",
    )
    .expect("valid regex")
});
static NEXT_LAST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(next|last|this)\s+(week|month|year|spring|summer|autumn|fall|winter)$")
        .expect("valid regex")
});
static ERA_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?\d)\s*(B\.?C\.?E\.?|B\.?C\.?|C\.?E\.?|A\.?D\.?|[A-Z]{2,5})$")
        .expect("valid regex")
});
static ERA_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(A\.?D\.?)\s+(.*\d)$").expect("valid regex"));

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Why a date string could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum DateParseError {
    #[error("date is empty")]
    Empty,
    #[error("date is not in a recognized format")]
    Unparseable,
}

/// How much of the calendar the source text specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Year,
    Month,
    Day,
    Minute,
}

/// One endpoint of a parsed date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatePoint {
    pub time: TimePoint,
    pub precision: DatePrecision,
    pub is_bce: bool,
    /// Year numeral exactly as typed, without sign or era marker.
    pub original_year: Option<String>,
    /// Era marker exactly as typed (`B.C.`, `AD`, `DR`).
    pub era_label: Option<String>,
}

impl DatePoint {
    pub fn millis(&self) -> i64 {
        self.time.to_millis()
    }
}

/// Normalized output of [`parse_date`].
///
/// # Invariants
///
/// - `start` is `Some` whenever `error` is `None`
/// - `end`, when present, is never before `start`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDate {
    pub start: Option<DatePoint>,
    pub end: Option<DatePoint>,
    pub approximate: bool,
    pub is_bce: bool,
    pub original_year: Option<String>,
    pub error: Option<DateParseError>,
}

impl ParsedDate {
    pub fn failed(error: DateParseError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.start.is_some()
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    pub fn start_millis(&self) -> Option<i64> {
        if self.error.is_some() {
            return None;
        }
        self.start.as_ref().map(DatePoint::millis)
    }

    pub fn end_millis(&self) -> Option<i64> {
        if self.error.is_some() {
            return None;
        }
        self.end.as_ref().map(DatePoint::millis)
    }
}

/// Parser options.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Anchor for relative expressions such as `3 days ago`.
    pub reference_date: NaiveDateTime,
}

impl ParseOptions {
    pub fn new(reference_date: NaiveDateTime) -> Self {
        Self { reference_date }
    }
}

/// Parses a free-form date string.
///
/// Never fails: problems are reported through [`ParsedDate::error`], and
/// callers must check it before using `start`.
pub fn parse_date(text: &str, opts: &ParseOptions) -> ParsedDate {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ParsedDate::failed(DateParseError::Empty);
    }

    let (approximate, body) = match QUALIFIER_RE.find(trimmed) {
        Some(m) => (true, trimmed[m.end()..].trim()),
        None => (false, trimmed),
    };
    if body.is_empty() {
        return ParsedDate::failed(DateParseError::Unparseable);
    }

    let parts: Vec<&str> = RANGE_RE.splitn(body, 2).collect();
    let (start, end) = match parts.as_slice() {
        [single] => match parse_point(single, opts) {
            Some(point) => (point, None),
            None => {
                tracing::debug!(input = %text, "Unparseable date");
                return ParsedDate::failed(DateParseError::Unparseable);
            }
        },
        [from, to] => {
            let (Some(mut from), Some(to)) = (parse_point(from, opts), parse_point(to, opts))
            else {
                tracing::debug!(input = %text, "Unparseable date range");
                return ParsedDate::failed(DateParseError::Unparseable);
            };
            // "500 to 450 BCE": the trailing era applies to an unmarked leading year
            if to.is_bce && to.era_label.is_some() && from.era_label.is_none() && !from.is_bce {
                if let Some(bce) = as_bce(&from) {
                    from = bce;
                }
            }
            if to.millis() < from.millis() {
                tracing::debug!(input = %text, "Reversed date range, swapping endpoints");
                (to, Some(from))
            } else {
                (from, Some(to))
            }
        }
        _ => return ParsedDate::failed(DateParseError::Unparseable),
    };

    ParsedDate {
        is_bce: start.is_bce,
        original_year: start.original_year.clone(),
        start: Some(start),
        end,
        approximate,
        error: None,
    }
}

fn parse_point(text: &str, opts: &ParseOptions) -> Option<DatePoint> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(point) = parse_relative(text, opts.reference_date) {
        return Some(point);
    }

    let (body, era) = split_era(text);
    let era_is_bce = era.as_deref().map(is_bce_marker).unwrap_or(false);
    let point = parse_absolute(body, era_is_bce)?;
    Some(DatePoint { era_label: era, ..point })
}

/// Splits a trailing (or `AD` leading) era marker from the date body.
fn split_era(text: &str) -> (&str, Option<String>) {
    if let Some(caps) = ERA_PREFIX_RE.captures(text) {
        if let (Some(marker), Some(body)) = (caps.get(1), caps.get(2)) {
            return (body.as_str().trim(), Some(marker.as_str().to_string()));
        }
    }
    if let Some(caps) = ERA_SUFFIX_RE.captures(text) {
        if let (Some(body), Some(marker)) = (caps.get(1), caps.get(2)) {
            return (body.as_str().trim(), Some(marker.as_str().to_string()));
        }
    }
    // Lowercase markers ("500 bce") are not matched by the uppercase-only
    // fictional era pattern, so check the well-known ones explicitly.
    let lower = text.to_ascii_lowercase();
    for marker in ["b.c.e.", "bce", "b.c.", "bc", "c.e.", "ce", "a.d.", "ad"] {
        if let Some(prefix) = lower.strip_suffix(marker) {
            let body = &text[..prefix.len()];
            if body.trim_end().ends_with(|c: char| c.is_ascii_digit()) {
                return (body.trim(), Some(text[prefix.len()..].to_string()));
            }
        }
    }
    (text, None)
}

fn is_bce_marker(marker: &str) -> bool {
    let letters: String = marker
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    letters == "BC" || letters == "BCE"
}

fn parse_absolute(body: &str, era_is_bce: bool) -> Option<DatePoint> {
    parse_iso(body, era_is_bce)
        .or_else(|| parse_day_month_year(body, era_is_bce))
        .or_else(|| parse_month_day_year(body, era_is_bce))
        .or_else(|| parse_month_year(body, era_is_bce))
        .or_else(|| parse_year(body, era_is_bce))
}

fn is_negative(caps: &regex_lite::Captures<'_>, idx: usize) -> bool {
    caps.get(idx).is_some_and(|m| !m.as_str().is_empty())
}

fn parse_iso(body: &str, era_is_bce: bool) -> Option<DatePoint> {
    let caps = ISO_RE.captures(body)?;
    let year_text = caps.get(2)?.as_str();
    let month: u32 = caps.get(3)?.as_str().parse().ok()?;
    let day: Option<u32> = caps.get(4).and_then(|m| m.as_str().parse().ok());
    let hour: Option<u32> = caps.get(5).and_then(|m| m.as_str().parse().ok());
    let minute: u32 = caps.get(6).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let second: u32 = caps.get(7).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let (year, is_bce) = astronomical_year(year_text, is_negative(&caps, 1) || era_is_bce)?;
    let (time, precision) = match (day, hour) {
        (None, _) => (TimePoint::from_ymd(year, month, 1)?, DatePrecision::Month),
        (Some(day), None) => (TimePoint::from_ymd(year, month, day)?, DatePrecision::Day),
        (Some(day), Some(hour)) => (
            TimePoint::new(year, month, day, hour, minute, second)?,
            DatePrecision::Minute,
        ),
    };
    Some(point(time, precision, is_bce, year_text))
}

fn parse_day_month_year(body: &str, era_is_bce: bool) -> Option<DatePoint> {
    let caps = DAY_MONTH_YEAR_RE.captures(body)?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_from_name(caps.get(2)?.as_str())?;
    let year_text = caps.get(4)?.as_str();
    let (year, is_bce) = astronomical_year(year_text, is_negative(&caps, 3) || era_is_bce)?;
    let time = TimePoint::from_ymd(year, month, day)?;
    Some(point(time, DatePrecision::Day, is_bce, year_text))
}

fn parse_month_day_year(body: &str, era_is_bce: bool) -> Option<DatePoint> {
    let caps = MONTH_DAY_YEAR_RE.captures(body)?;
    let month = month_from_name(caps.get(1)?.as_str())?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year_text = caps.get(4)?.as_str();
    let (year, is_bce) = astronomical_year(year_text, is_negative(&caps, 3) || era_is_bce)?;
    let time = TimePoint::from_ymd(year, month, day)?;
    Some(point(time, DatePrecision::Day, is_bce, year_text))
}

fn parse_month_year(body: &str, era_is_bce: bool) -> Option<DatePoint> {
    let caps = MONTH_YEAR_RE.captures(body)?;
    let month = month_from_name(caps.get(1)?.as_str())?;
    let year_text = caps.get(3)?.as_str();
    let (year, is_bce) = astronomical_year(year_text, is_negative(&caps, 2) || era_is_bce)?;
    let time = TimePoint::from_ymd(year, month, 1)?;
    Some(point(time, DatePrecision::Month, is_bce, year_text))
}

fn parse_year(body: &str, era_is_bce: bool) -> Option<DatePoint> {
    let caps = YEAR_RE.captures(body)?;
    let year_text = caps.get(2)?.as_str();
    let (year, is_bce) = astronomical_year(year_text, is_negative(&caps, 1) || era_is_bce)?;
    let time = TimePoint::from_ymd(year, 1, 1)?;
    Some(point(time, DatePrecision::Year, is_bce, year_text))
}

fn point(time: TimePoint, precision: DatePrecision, is_bce: bool, year_text: &str) -> DatePoint {
    DatePoint {
        time,
        precision,
        is_bce,
        original_year: Some(year_text.to_string()),
        era_label: None,
    }
}

/// Maps a typed year numeral onto the astronomical axis.
///
/// `n BCE` becomes `1 - n`, so 1 BCE is year 0 and sorts right before 1 CE.
/// Typed year zero does not exist in either era.
fn astronomical_year(year_text: &str, bce: bool) -> Option<(i64, bool)> {
    let magnitude: i64 = year_text.parse().ok()?;
    if magnitude == 0 || magnitude > MAX_ABS_YEAR {
        return None;
    }
    if bce {
        Some((1 - magnitude, true))
    } else {
        Some((magnitude, false))
    }
}

/// Re-reads an unmarked CE point as BCE (used for `500 to 450 BCE`).
fn as_bce(point: &DatePoint) -> Option<DatePoint> {
    let year_text = point.original_year.as_deref()?;
    let (year, _) = astronomical_year(year_text, true)?;
    let t = point.time;
    let time = TimePoint::new(year, t.month(), t.day(), t.hour(), t.minute(), t.second())?;
    Some(DatePoint {
        time,
        is_bce: true,
        ..point.clone()
    })
}

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    if lower == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|full| *full == lower || (lower.len() == 3 && full.starts_with(&lower)))
        .map(|idx| idx as u32 + 1)
}

// =============================================================================
// Relative expressions
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

fn parse_relative(text: &str, reference: NaiveDateTime) -> Option<DatePoint> {
    let lower = text.to_ascii_lowercase();
    let today = reference.date();
    match lower.as_str() {
        "now" => return Some(relative_point(TimePoint::from_naive(reference), DatePrecision::Minute)),
        "today" => return Some(day_point(today)),
        "yesterday" => return today.checked_sub_days(Days::new(1)).map(day_point),
        "tomorrow" => return today.checked_add_days(Days::new(1)).map(day_point),
        _ => {}
    }

    if let Some(caps) = OFFSET_RE.captures(text) {
        let has_in = caps.get(1).is_some();
        let sign = caps.get(2).map(|m| m.as_str());
        let amount: i64 = caps.get(3)?.as_str().parse().ok()?;
        let unit = match caps.get(4)?.as_str().to_ascii_lowercase().as_str() {
            "day" => Unit::Day,
            "week" => Unit::Week,
            "month" => Unit::Month,
            _ => Unit::Year,
        };
        let direction = caps.get(5).map(|m| m.as_str().to_ascii_lowercase());
        let negative = match (sign, direction.as_deref()) {
            (Some("-"), _) | (_, Some("ago")) | (_, Some("before")) => true,
            (Some("+"), _) => false,
            (_, Some(_)) => false,
            (None, None) if has_in => false,
            // "3 days" on its own has no direction
            (None, None) => return None,
            _ => false,
        };
        let signed = if negative { -amount } else { amount };
        return shift(today, signed, unit).map(day_point);
    }

    if let Some(caps) = NEXT_LAST_RE.captures(text) {
        let which = caps.get(1)?.as_str().to_ascii_lowercase();
        let what = caps.get(2)?.as_str().to_ascii_lowercase();
        let step: i64 = match which.as_str() {
            "next" => 1,
            "last" => -1,
            _ => 0,
        };
        let date = match what.as_str() {
            "week" => shift(today, step, Unit::Week)?,
            "month" => shift(today, step, Unit::Month)?,
            "year" => shift(today, step, Unit::Year)?,
            season => season_start(today, season, step)?,
        };
        return Some(day_point(date));
    }

    None
}

fn shift(date: NaiveDate, amount: i64, unit: Unit) -> Option<NaiveDate> {
    match unit {
        Unit::Day => shift_days(date, amount),
        Unit::Week => shift_days(date, amount.checked_mul(7)?),
        Unit::Month => shift_months(date, amount),
        Unit::Year => shift_months(date, amount.checked_mul(12)?),
    }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let span = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(span)
    } else {
        date.checked_sub_months(span)
    }
}

/// Meteorological season starts: spring Mar 1, summer Jun 1, autumn Sep 1, winter Dec 1.
///
/// `step` 1 picks the first start after `today`, -1 the most recent season that
/// has already ended, 0 the season `today` falls in.
fn season_start(today: NaiveDate, season: &str, step: i64) -> Option<NaiveDate> {
    let month = match season {
        "spring" => 3,
        "summer" => 6,
        "autumn" | "fall" => 9,
        _ => 12,
    };
    let year = today.year();
    let mut candidates = Vec::with_capacity(4);
    for y in [year - 2, year - 1, year, year + 1] {
        if let Some(date) = NaiveDate::from_ymd_opt(y, month, 1) {
            candidates.push(date);
        }
    }
    match step {
        1 => candidates.into_iter().find(|d| *d > today),
        -1 => candidates
            .into_iter()
            .rev()
            .find(|d| d.checked_add_months(Months::new(3)).is_some_and(|end| end <= today)),
        _ => candidates.into_iter().rev().find(|d| *d <= today),
    }
}

fn day_point(date: NaiveDate) -> DatePoint {
    relative_point(TimePoint::from_naive_date(date), DatePrecision::Day)
}

fn relative_point(time: TimePoint, precision: DatePrecision) -> DatePoint {
    DatePoint {
        time,
        precision,
        is_bce: time.year() <= 0,
        original_year: None,
        era_label: None,
    }
}
