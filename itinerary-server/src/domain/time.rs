//! Wall-clock time handling for itinerary requests.
//!
//! Requests carry a travel date as "YYYY-MM-DD" and preferred times as
//! "HH:MM". Everything inside the planner works on `NaiveDateTime` instants
//! anchored to the travel date, so a window or a dwell that runs past
//! midnight simply lands on the next day.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Earliest travel year accepted.
const MIN_YEAR: i32 = 1900;

/// Latest travel year accepted.
const MAX_YEAR: i32 = 9999;

/// Error returned when parsing an invalid date or time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time of day from "HH:MM" format.
///
/// # Examples
///
/// ```
/// use itinerary_server::domain::parse_hhmm;
///
/// assert!(parse_hhmm("00:00").is_ok());
/// assert!(parse_hhmm("23:59").is_ok());
///
/// assert!(parse_hhmm("0800").is_err());
/// assert!(parse_hhmm("8:00").is_err());
/// assert!(parse_hhmm("24:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    // Must be exactly 5 characters: HH:MM
    if s.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    let bytes = s.as_bytes();

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

/// Parse a travel date from "YYYY-MM-DD" format.
///
/// Only years 1900 to 9999 are accepted, which keeps every instant the
/// planner derives from the date well inside chrono's range.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeError> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| TimeError::new("expected YYYY-MM-DD"))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(TimeError::new("year must be 1900-9999"));
    }
    Ok(date)
}

/// Format an instant as "HH:MM" for display.
pub fn format_hhmm(instant: NaiveDateTime) -> String {
    format!("{:02}:{:02}", instant.hour(), instant.minute())
}

/// Build a dwell duration from separate hour and minute counts.
pub fn dwell_from_parts(hours: u32, minutes: u32) -> Duration {
    Duration::hours(i64::from(hours)) + Duration::minutes(i64::from(minutes))
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
