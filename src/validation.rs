use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::error::ApiError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("regex compiles"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date format, expected YYYY-MM-DD: {0}")]
    Format(String),
    #[error("start date cannot be after end date")]
    StartAfterEnd,
}

/// Parses a `YYYY-MM-DD` string into midnight UTC of that day.
///
/// Anything else, including RFC 3339 timestamps and `/`-separated dates,
/// is rejected.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, DateError> {
    if !DATE_SHAPE.is_match(value) {
        return Err(DateError::Format(value.to_string()));
    }
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| DateError::Format(value.to_string()))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Keeps the calendar day of `t` as read in its own zone and drops the rest.
pub fn to_midnight_utc<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Inclusive on both ends, compared at day granularity.
pub fn is_date_in_range<Tz: TimeZone>(
    date: &DateTime<Tz>,
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
) -> bool {
    let date = to_midnight_utc(date);
    date >= to_midnight_utc(start) && date <= to_midnight_utc(end)
}

pub fn validate_date_order<Tz: TimeZone>(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
) -> Result<(), DateError> {
    if start > end {
        return Err(DateError::StartAfterEnd);
    }
    Ok(())
}

pub fn validate_capacity(value: i64) -> Result<u32, ApiError> {
    if value <= 0 {
        return Err(ApiError::BadRequest("capacity must be greater than 0".into()));
    }
    u32::try_from(value).map_err(|_| ApiError::BadRequest("capacity is too large".into()))
}

pub fn require_field<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::BadRequest(format!("{field} is required")))
    } else {
        Ok(value)
    }
}
