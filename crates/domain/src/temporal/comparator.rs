//! Sort keys and human-readable rendering for parsed dates.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::parser::{parse_date, DatePoint, DatePrecision, ParseOptions, ParsedDate};
use crate::entities::Event;

const MONTH_DISPLAY: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Display conventions for [`to_display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayLocale {
    /// `15 March 1200`, 24-hour clock
    #[default]
    EnGb,
    /// `March 15, 1200`, 12-hour clock
    EnUs,
}

/// The single sort key used across timeline and conflict code.
///
/// Returns `None` when the value carries an error or has no start.
pub fn to_millis(parsed: &ParsedDate) -> Option<i64> {
    parsed.start_millis()
}

/// End of the interval, defaulting to the start for point dates.
pub fn end_or_start_millis(parsed: &ParsedDate) -> Option<i64> {
    parsed.end_millis().or_else(|| parsed.start_millis())
}

/// Orders parsed dates chronologically; unusable dates sort last.
pub fn compare_parsed(a: &ParsedDate, b: &ParsedDate) -> Ordering {
    match (to_millis(a), to_millis(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Renders a parsed date back into text, keeping the era marker and the year
/// numeral the author typed rather than a normalized ISO form.
pub fn to_display(parsed: &ParsedDate, locale: DisplayLocale) -> String {
    let Some(start) = parsed.start.as_ref().filter(|_| parsed.error.is_none()) else {
        return "Unknown date".to_string();
    };
    let mut out = String::new();
    if parsed.approximate {
        out.push_str("c. ");
    }
    out.push_str(&format_point(start, locale));
    if let Some(end) = &parsed.end {
        out.push_str(" to ");
        out.push_str(&format_point(end, locale));
    }
    out
}

/// Renders a single endpoint.
pub fn format_point(point: &DatePoint, locale: DisplayLocale) -> String {
    let year = year_text(point);
    let t = point.time;
    let month = MONTH_DISPLAY
        .get(t.month().saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?");
    let date = match (point.precision, locale) {
        (DatePrecision::Year, _) => year,
        (DatePrecision::Month, _) => format!("{month} {year}"),
        (DatePrecision::Day | DatePrecision::Minute, DisplayLocale::EnGb) => {
            format!("{} {month} {year}", t.day())
        }
        (DatePrecision::Day | DatePrecision::Minute, DisplayLocale::EnUs) => {
            format!("{month} {}, {year}", t.day())
        }
    };
    if point.precision != DatePrecision::Minute {
        return date;
    }
    match locale {
        DisplayLocale::EnGb => format!("{date} {:02}:{:02}", t.hour(), t.minute()),
        DisplayLocale::EnUs => {
            let (hour, suffix) = match t.hour() {
                0 => (12, "AM"),
                h @ 1..=11 => (h, "AM"),
                12 => (12, "PM"),
                h => (h - 12, "PM"),
            };
            format!("{date} {hour}:{:02} {suffix}", t.minute())
        }
    }
}

fn year_text(point: &DatePoint) -> String {
    let numeral = point.original_year.clone().unwrap_or_else(|| {
        let year = point.time.year();
        if point.is_bce {
            (1 - year).to_string()
        } else {
            year.to_string()
        }
    });
    match (&point.era_label, point.is_bce) {
        (Some(label), _) => format!("{numeral} {label}"),
        (None, true) => format!("{numeral} BCE"),
        (None, false) => numeral,
    }
}

/// Sorts events by parsed start. Events whose date is missing or unparseable
/// keep their relative input order after all dated events.
pub fn sort_chronologically<'a>(events: &'a [Event], opts: &ParseOptions) -> Vec<&'a Event> {
    let mut keyed: Vec<(usize, Option<i64>, &Event)> = events
        .iter()
        .enumerate()
        .map(|(idx, event)| {
            let key = event
                .date_time()
                .map(|text| parse_date(text, opts))
                .and_then(|parsed| to_millis(&parsed));
            (idx, key, event)
        })
        .collect();
    keyed.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => x.cmp(&y).then(a.0.cmp(&b.0)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });
    keyed.into_iter().map(|(_, _, event)| event).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn opts() -> ParseOptions {
        ParseOptions::new(
            NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn display(text: &str) -> String {
        to_display(&parse_date(text, &opts()), DisplayLocale::EnGb)
    }

    mod display {
        use super::*;

        #[test]
        fn preserves_bce_marker_and_numeral() {
            assert_eq!(display("0500 B.C.E."), "0500 B.C.E.");
            assert_eq!(display("44 bc"), "44 bc");
            assert_eq!(display("-0044"), "0044 BCE");
        }

        #[test]
        fn preserves_fictional_era() {
            assert_eq!(display("1492 DR"), "1492 DR");
            assert_eq!(display("Year 3042"), "3042");
        }

        #[test]
        fn approximate_and_ranges() {
            assert_eq!(display("circa 1200"), "c. 1200");
            assert_eq!(display("500 to 450 BCE"), "500 BCE to 450 BCE");
        }

        #[test]
        fn day_and_time_precision() {
            assert_eq!(display("2024-03-05"), "5 March 2024");
            assert_eq!(display("2024-03-05T14:07"), "5 March 2024 14:07");
            let us = to_display(&parse_date("2024-03-05T14:07", &opts()), DisplayLocale::EnUs);
            assert_eq!(us, "March 5, 2024 2:07 PM");
        }

        #[test]
        fn relative_dates_render_resolved_year() {
            assert_eq!(display("3 days ago"), "12 June 2024");
        }

        #[test]
        fn errors_render_placeholder() {
            assert_eq!(display("nonsense"), "Unknown date");
            assert_eq!(display(""), "Unknown date");
        }
    }

    mod sorting {
        use super::*;

        #[test]
        fn to_millis_is_none_on_error() {
            assert_eq!(to_millis(&parse_date("nope", &opts())), None);
        }

        #[test]
        fn end_defaults_to_start() {
            let p = parse_date("2024-01-01", &opts());
            assert_eq!(end_or_start_millis(&p), to_millis(&p));
        }

        #[test]
        fn compare_puts_invalid_last() {
            let good = parse_date("2024", &opts());
            let bad = parse_date("???", &opts());
            assert_eq!(compare_parsed(&good, &bad), Ordering::Less);
            assert_eq!(compare_parsed(&bad, &good), Ordering::Greater);
        }

        #[test]
        fn bce_events_sort_before_ce_events() {
            let events = vec![
                Event::new("C").with_date_time("10 CE"),
                Event::new("undated"),
                Event::new("A").with_date_time("100 BCE"),
                Event::new("B").with_date_time("50 BCE"),
            ];
            let names: Vec<&str> = sort_chronologically(&events, &opts())
                .into_iter()
                .map(|e| e.name())
                .collect();
            assert_eq!(names, vec!["A", "B", "C", "undated"]);
        }
    }
}
