//! Date helpers.
//!
//! Dates stay strings in the models (`DD/MM/YYYY`, timestamps
//! `DD/MM/YYYY HH:MM:SS`); these functions check and order them.

use chrono::{Local, NaiveDate};

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Whether `value` is a real calendar date in `DD/MM/YYYY` form.
pub fn validate(value: &str) -> bool {
    parse(value).is_some()
}

/// Parse a `DD/MM/YYYY` date.
pub fn parse(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Current local time as `DD/MM/YYYY HH:MM:SS`.
pub fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Whether the end date is on or after the start date.
/// Unparseable dates are not compared.
pub fn is_ordered(start: &str, end: &str) -> bool {
    match (parse(start), parse(end)) {
        (Some(start), Some(end)) => start <= end,
        _ => true,
    }
}
