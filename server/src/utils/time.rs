//! Time utility functions
//!
//! Filter values arrive either as epoch milliseconds (what the grid's
//! transport uses for datetimes) or as ISO 8601 strings. These helpers turn
//! both into the canonical forms the SQL layer binds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formats accepted for naive (zone-less) datetimes, interpreted as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Convert milliseconds since Unix epoch to DateTime<Utc>
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Parse an ISO 8601 / RFC 3339 datetime string to milliseconds since epoch.
///
/// Strings without an offset are read as UTC; a bare `YYYY-MM-DD` means
/// midnight UTC of that day.
pub fn parse_datetime_millis(ts: &str) -> Option<i64> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(ts, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Parse a calendar date from an ISO date or datetime string.
///
/// Datetimes keep the day as written; an offset does not move it to UTC.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.date())
}

/// UTC calendar day containing the given epoch-millisecond instant
pub fn millis_to_date(millis: i64) -> Option<NaiveDate> {
    millis_to_datetime(millis).map(|dt| dt.date_naive())
}

/// Render a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_millis_to_datetime_epoch() {
        let dt = millis_to_datetime(0).unwrap();
        assert_eq!(dt.year(), 1970);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_millis_to_datetime_known_value() {
        // 2024-01-01 00:00:00 UTC = 1704067200 seconds
        let dt = millis_to_datetime(1_704_067_200_000).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_millis_to_datetime_out_of_range() {
        assert!(millis_to_datetime(i64::MAX).is_none());
    }

    #[test]
    fn test_parse_datetime_millis_rfc3339() {
        assert_eq!(
            parse_datetime_millis("2024-01-01T00:00:00Z"),
            Some(1_704_067_200_000)
        );
        assert_eq!(
            parse_datetime_millis("2024-01-01T00:00:00.250Z"),
            Some(1_704_067_200_250)
        );
    }

    #[test]
    fn test_parse_datetime_millis_with_offset() {
        // 05:00 at +05:00 is midnight UTC
        assert_eq!(
            parse_datetime_millis("2024-01-01T05:00:00+05:00"),
            Some(1_704_067_200_000)
        );
    }

    #[test]
    fn test_parse_datetime_millis_naive_is_utc() {
        assert_eq!(
            parse_datetime_millis("2024-01-01T01:01:00"),
            Some(1_704_067_200_000 + 61_000)
        );
        assert_eq!(
            parse_datetime_millis("2024-01-01 01:01:00"),
            Some(1_704_067_200_000 + 61_000)
        );
        assert_eq!(
            parse_datetime_millis("2024-01-01T01:01"),
            Some(1_704_067_200_000 + 61_000)
        );
    }

    #[test]
    fn test_parse_datetime_millis_date_only() {
        assert_eq!(parse_datetime_millis("2024-01-01"), Some(1_704_067_200_000));
    }

    #[test]
    fn test_parse_datetime_millis_invalid() {
        assert_eq!(parse_datetime_millis("not-a-timestamp"), None);
        assert_eq!(parse_datetime_millis(""), None);
        assert_eq!(parse_datetime_millis("2024-13-01"), None);
    }

    #[test]
    fn test_parse_calendar_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_calendar_date("2024-01-02"), Some(expected));
        assert_eq!(parse_calendar_date(" 2024-01-02 "), Some(expected));
        assert_eq!(parse_calendar_date("2024-01-02T23:59:59Z"), Some(expected));
        assert_eq!(parse_calendar_date("2024-01-02 08:30"), Some(expected));
        assert_eq!(parse_calendar_date("01/02/2024"), None);
    }

    #[test]
    fn test_parse_calendar_date_keeps_written_day() {
        // 23:30 at -05:00 is already the next day in UTC
        assert_eq!(
            parse_calendar_date("2024-01-01T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            parse_calendar_date("2024-01-02T00:30:00+09:00"),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }

    #[test]
    fn test_millis_to_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(millis_to_date(1_704_067_200_000), Some(expected));
        // last millisecond of the day stays on the same date
        assert_eq!(millis_to_date(1_704_153_599_999), Some(expected));
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(format_date(date), "2023-12-31");
    }
}
