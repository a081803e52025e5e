//! Common utility functions shared across the domain and engine crates.
//!
//! Pure functions only: no side effects, no I/O.

pub mod datetime;
pub mod string;

pub use datetime::parse_reference_date;
pub use string::{none_if_blank, sanitize_name, truncate_chars};
