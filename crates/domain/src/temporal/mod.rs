//! Date parsing and temporal comparison.
//!
//! Every date-dependent computation in the crate funnels through
//! [`parse_date`] and [`to_millis`], so ordering is consistent between the
//! conflict detector and the timeline builder.

pub mod comparator;
pub mod parser;
pub mod time_point;

pub use comparator::{
    compare_parsed, end_or_start_millis, format_point, sort_chronologically, to_display, to_millis,
    DisplayLocale,
};
pub use parser::{parse_date, DateParseError, DatePoint, DatePrecision, ParseOptions, ParsedDate};
pub use time_point::{TimePoint, MAX_ABS_YEAR, MILLIS_PER_DAY};
