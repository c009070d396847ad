//! Date and timestamp coercion.
//!
//! Tiingo wants `YYYY-MM-DD` for range filters and answers with ISO 8601
//! strings in a handful of shapes. Everything is normalized to UTC.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, Utc};

use crate::error::FintristError;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string into UTC.
///
/// Accepts RFC 3339 (any offset), `+HHMM` offsets, naive date-times (read as
/// UTC), `YYYY-MM-DD` (midnight UTC) and a bare `YYYY` (January 1).
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, FintristError> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        let year = s.parse::<i32>().map_err(|_| invalid(input))?;
        let date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| invalid(input))?;
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    Err(invalid(input))
}

/// Parse a date-like string into the UTC calendar date Tiingo expects.
pub fn parse_date_input(input: &str) -> Result<NaiveDate, FintristError> {
    parse_timestamp(input).map(|ts| ts.date_naive())
}

/// `date` moved back by whole years, clamping Feb 29 to Feb 28.
pub fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

fn invalid(input: &str) -> FintristError {
    FintristError::InvalidInput(format!("unrecognized date '{}'", input))
}

/// Inclusive date range sent as `startDate` / `endDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FintristError> {
        if start > end {
            return Err(FintristError::InvalidInput(
                "start must be before end".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Fill in missing bounds: `end` defaults to `today`, `start` to
    /// `default_start(end)`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
        default_start: impl FnOnce(NaiveDate) -> NaiveDate,
    ) -> Result<Self, FintristError> {
        let end = end.unwrap_or(today);
        let start = start.unwrap_or_else(|| default_start(end));
        Self::new(start, end)
    }
}
