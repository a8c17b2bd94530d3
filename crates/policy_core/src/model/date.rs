//! Calendar-date helpers shared by the model, service and HTTP layers.
//!
//! # Invariants
//! - Stored and emitted dates are always `YYYY-MM-DD`.
//! - Accepted input also includes ISO-8601 date-times; the time part is
//!   discarded, never converted across offsets.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Width of the accepted start-date window on each side of "today".
pub const START_DATE_WINDOW_YEARS: u32 = 10;

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses a date from `YYYY-MM-DD` or an ISO-8601 date-time string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(date_time.date());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|date_time| date_time.date_naive())
}

/// Serde adapter for [`parse_date`].
pub fn deserialize_flexible<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(raw.as_str())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{raw}`")))
}

/// Returns the inclusive `[earliest, latest]` start-date window around `today`.
///
/// Year arithmetic follows calendar months, so Feb 29 clamps to Feb 28 in
/// non-leap target years.
pub fn start_date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let span = Months::new(START_DATE_WINDOW_YEARS * 12);
    let earliest = today.checked_sub_months(span).unwrap_or(NaiveDate::MIN);
    let latest = today.checked_add_months(span).unwrap_or(NaiveDate::MAX);
    (earliest, latest)
}

#[cfg(test)]
mod tests {
    use super::{parse_date, start_date_window};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_accepts_plain_and_date_time_forms() {
        assert_eq!(parse_date("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date(" 2024-03-01T00:00:00 "), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("2024-03-01T13:45:10.250"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("2024-03-01T23:00:00Z"), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("01/03/2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn window_spans_ten_years_each_side() {
        let (earliest, latest) = start_date_window(ymd(2026, 10, 18));
        assert_eq!(earliest, ymd(2016, 10, 18));
        assert_eq!(latest, ymd(2036, 10, 18));
    }

    #[test]
    fn window_clamps_leap_day() {
        let (earliest, latest) = start_date_window(ymd(2024, 2, 29));
        assert_eq!(earliest, ymd(2014, 2, 28));
        assert_eq!(latest, ymd(2034, 2, 28));
    }
}
