//! Proleptic Gregorian instants over a signed astronomical year axis.
//!
//! chrono's `NaiveDate` stops at roughly ±262,000 years, which is too small for
//! fictional chronologies. `TimePoint` keeps its own civil-day arithmetic so the
//! millisecond key stays monotonic from deep BCE through far-future years.
//!
//! Years are astronomical: `1 BCE` is year `0`, `500 BCE` is year `-499`.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Largest absolute astronomical year accepted. Keeps millisecond keys inside `i64`.
pub const MAX_ABS_YEAR: i64 = 100_000_000;

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// A calendar instant with second resolution.
///
/// Field order matters: the derived `Ord` compares year, month, day, hour,
/// minute, second in that order, which matches chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimePoint {
    year: i64,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

impl TimePoint {
    /// Creates a validated instant. Returns `None` for impossible calendar values.
    pub fn new(year: i64, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        if year.abs() > MAX_ABS_YEAR {
            return None;
        }
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Midnight at the start of the given day.
    pub fn from_ymd(year: i64, month: u32, day: u32) -> Option<Self> {
        Self::new(year, month, day, 0, 0, 0)
    }

    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self {
            year: i64::from(dt.year()),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }

    pub fn from_naive_date(date: NaiveDate) -> Self {
        Self {
            year: i64::from(date.year()),
            month: date.month(),
            day: date.day(),
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// Converts back into chrono, when the year fits chrono's range.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let year = i32::try_from(self.year).ok()?;
        NaiveDate::from_ymd_opt(year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// Milliseconds relative to 1970-01-01T00:00:00 on the proleptic Gregorian calendar.
    pub fn to_millis(&self) -> i64 {
        let days = days_from_civil(self.year, self.month, self.day);
        days * MILLIS_PER_DAY
            + i64::from(self.hour) * MILLIS_PER_HOUR
            + i64::from(self.minute) * MILLIS_PER_MINUTE
            + i64::from(self.second) * MILLIS_PER_SECOND
    }

    /// Inverse of [`TimePoint::to_millis`], truncating sub-second precision.
    pub fn from_millis(millis: i64) -> Option<Self> {
        let days = millis.div_euclid(MILLIS_PER_DAY);
        let rem = millis.rem_euclid(MILLIS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        // rem < MILLIS_PER_DAY so each component fits in u32
        let hour = (rem / MILLIS_PER_HOUR) as u32;
        let minute = ((rem % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE) as u32;
        let second = ((rem % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND) as u32;
        Self::new(year, month, day, hour, minute, second)
    }

    #[inline]
    pub fn year(&self) -> i64 {
        self.year
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.month
    }

    #[inline]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[inline]
    pub fn hour(&self) -> u32 {
        self.hour
    }

    #[inline]
    pub fn minute(&self) -> u32 {
        self.minute
    }

    #[inline]
    pub fn second(&self) -> u32 {
        self.second
    }

    /// True when the instant falls exactly on midnight.
    pub fn is_midnight(&self) -> bool {
        self.hour == 0 && self.minute == 0 && self.second == 0
    }
}

/// Writes the form the date parser reads back: `YYYY-MM-DD`, then `THH:MM`
/// unless the minute is midnight, then ` BCE` for years before 1 CE.
/// Seconds are dropped.
impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bce = self.year <= 0;
        let year = if bce { 1 - self.year } else { self.year };
        write!(f, "{year:04}-{:02}-{:02}", self.month, self.day)?;
        if self.hour != 0 || self.minute != 0 {
            write!(f, "T{:02}:{:02}", self.hour, self.minute)?;
        }
        if bce {
            f.write_str(" BCE")?;
        }
        Ok(())
    }
}

pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

// Howard Hinnant's days_from_civil, shifted so 1970-01-01 is day 0.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = (i64::from(month) + 9) % 12;
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = if month <= 2 { y + 1 } else { y };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_zero() {
        let p = TimePoint::from_ymd(1970, 1, 1).unwrap();
        assert_eq!(p.to_millis(), 0);
    }

    #[test]
    fn matches_chrono_inside_its_range() {
        for (y, m, d) in [(2024, 2, 29), (1, 1, 1), (-43, 3, 15), (1600, 12, 31), (9999, 6, 1)] {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let dt = date.and_hms_opt(13, 45, 10).unwrap();
            let ours = TimePoint::from_naive(dt).to_millis();
            assert_eq!(ours, dt.and_utc().timestamp_millis(), "{y}-{m}-{d}");
        }
    }

    #[test]
    fn millis_round_trip_far_outside_chrono() {
        let p = TimePoint::new(-50_000_000, 7, 4, 6, 30, 0).unwrap();
        assert_eq!(TimePoint::from_millis(p.to_millis()), Some(p));

        let q = TimePoint::from_ymd(40_000_000, 12, 31).unwrap();
        assert_eq!(TimePoint::from_millis(q.to_millis()), Some(q));
    }

    #[test]
    fn ordering_matches_millis() {
        let a = TimePoint::from_ymd(-499, 1, 1).unwrap();
        let b = TimePoint::from_ymd(0, 1, 1).unwrap();
        let c = TimePoint::from_ymd(1, 1, 1).unwrap();
        assert!(a < b && b < c);
        assert!(a.to_millis() < b.to_millis() && b.to_millis() < c.to_millis());
    }

    #[test]
    fn rejects_invalid_calendar_values() {
        assert!(TimePoint::from_ymd(2023, 2, 29).is_none());
        assert!(TimePoint::from_ymd(2024, 13, 1).is_none());
        assert!(TimePoint::new(2024, 1, 1, 24, 0, 0).is_none());
        assert!(TimePoint::from_ymd(MAX_ABS_YEAR + 1, 1, 1).is_none());
    }

    #[test]
    fn display_uses_bce_suffix_before_year_one() {
        assert_eq!(TimePoint::from_ymd(-44, 3, 15).unwrap().to_string(), "0045-03-15 BCE");
        assert_eq!(TimePoint::from_ymd(0, 1, 1).unwrap().to_string(), "0001-01-01 BCE");
        assert_eq!(
            TimePoint::new(2024, 5, 1, 9, 5, 30).unwrap().to_string(),
            "2024-05-01T09:05"
        );
    }

    #[test]
    fn display_reads_back_as_the_same_point() {
        let opts = crate::temporal::ParseOptions::new(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        for point in [
            TimePoint::from_ymd(-44, 3, 15).unwrap(),
            TimePoint::from_ymd(0, 12, 31).unwrap(),
            TimePoint::new(2024, 5, 1, 9, 5, 0).unwrap(),
        ] {
            let parsed = crate::temporal::parse_date(&point.to_string(), &opts);
            assert_eq!(parsed.start.map(|s| s.time), Some(point), "{point}");
        }
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(0));
        assert!(is_leap_year(-4));
    }
}
