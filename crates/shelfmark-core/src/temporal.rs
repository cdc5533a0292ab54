//! Calendar helpers for completion-date statistics.
//!
//! Stored completion dates are free-form strings (the data model does not
//! validate them), so every comparison here goes through an explicit parse
//! into a UTC timestamp first, never through string ordering. Windows are
//! half-open: start inclusive, end exclusive.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse a free-form completion date into a UTC timestamp.
///
/// Accepted forms, tried in order:
/// - RFC 3339 (`2026-03-15T10:30:00.000Z`, offsets converted to UTC)
/// - naive datetime, `T` or space separated, optional fractional seconds
///   (assumed UTC)
/// - bare date `2026-03-15` (midnight UTC)
///
/// Anything else yields `None`; such a value counts toward no calendar
/// window.
pub fn parse_completion_date(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    None
}

/// Months elapsed from January of year 0 to the month containing `t`.
fn month_index(t: DateTime<Utc>) -> i32 {
    t.year() * 12 + t.month0() as i32
}

/// First instant (UTC) of the month at the given absolute index.
fn month_index_start(index: i32) -> DateTime<Utc> {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Half-open UTC window `[start, end)` of the calendar month `months_back`
/// whole months before the month containing `now`. `months_back = 0` is the
/// current month.
pub fn month_window(now: DateTime<Utc>, months_back: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let index = month_index(now) - months_back as i32;
    (month_index_start(index), month_index_start(index + 1))
}

/// Half-open UTC window of the calendar year containing `now`.
pub fn year_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        month_index_start(now.year() * 12),
        month_index_start((now.year() + 1) * 12),
    )
}

/// English short month name ("Jan" … "Dec") of the month containing `t`.
pub fn short_month_name(t: DateTime<Utc>) -> String {
    t.format("%b").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_rfc3339_with_millis() {
        let parsed = parse_completion_date("2026-03-15T10:30:00.000Z").unwrap();
        assert_eq!(parsed, utc(2026, 3, 15, 10, 30, 0));
    }

    #[test]
    fn test_parse_rfc3339_offset_converts_to_utc() {
        let parsed = parse_completion_date("2026-03-15T10:30:00+02:00").unwrap();
        assert_eq!(parsed, utc(2026, 3, 15, 8, 30, 0));
    }

    #[test]
    fn test_parse_naive_datetime_assumed_utc() {
        let parsed = parse_completion_date("2026-03-15T10:30:00").unwrap();
        assert_eq!(parsed, utc(2026, 3, 15, 10, 30, 0));

        let spaced = parse_completion_date("2026-03-15 10:30:00").unwrap();
        assert_eq!(spaced, utc(2026, 3, 15, 10, 30, 0));
    }

    #[test]
    fn test_parse_bare_date_is_midnight_utc() {
        let parsed = parse_completion_date("2026-03-15").unwrap();
        assert_eq!(parsed, utc(2026, 3, 15, 0, 0, 0));
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert!(parse_completion_date("last spring").is_none());
        assert!(parse_completion_date("March 2026").is_none());
        assert!(parse_completion_date("").is_none());
        assert!(parse_completion_date("   ").is_none());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_completion_date("  2026-03-15  ").is_some());
    }

    #[test]
    fn test_current_month_window() {
        let now = utc(2026, 8, 23, 12, 0, 0);
        let (start, end) = month_window(now, 0);
        assert_eq!(start, utc(2026, 8, 1, 0, 0, 0));
        assert_eq!(end, utc(2026, 9, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_window_crosses_year_boundary() {
        let now = utc(2026, 1, 10, 0, 0, 0);
        let (start, end) = month_window(now, 5);
        assert_eq!(start, utc(2025, 8, 1, 0, 0, 0));
        assert_eq!(end, utc(2025, 9, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_window_is_half_open() {
        let now = utc(2026, 8, 23, 12, 0, 0);
        let (start, end) = month_window(now, 1);
        // July window: July 1 inclusive through August 1 exclusive.
        assert_eq!(start, utc(2026, 7, 1, 0, 0, 0));
        assert_eq!(end, utc(2026, 8, 1, 0, 0, 0));

        let last_july_instant = utc(2026, 7, 31, 23, 59, 59);
        assert!(last_july_instant >= start && last_july_instant < end);

        // The boundary instant belongs to the next month, not this one.
        let boundary = utc(2026, 8, 1, 0, 0, 0);
        assert!(!(boundary >= start && boundary < end));
    }

    #[test]
    fn test_adjacent_month_windows_tile() {
        let now = utc(2026, 8, 23, 12, 0, 0);
        for back in 0..5 {
            let (_, newer_end) = month_window(now, back + 1);
            let (older_start, _) = month_window(now, back);
            assert_eq!(newer_end, older_start);
        }
    }

    #[test]
    fn test_year_window() {
        let now = utc(2026, 8, 23, 12, 0, 0);
        let (start, end) = year_window(now);
        assert_eq!(start, utc(2026, 1, 1, 0, 0, 0));
        assert_eq!(end, utc(2027, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_short_month_names() {
        assert_eq!(short_month_name(utc(2026, 1, 1, 0, 0, 0)), "Jan");
        assert_eq!(short_month_name(utc(2026, 8, 15, 0, 0, 0)), "Aug");
        assert_eq!(short_month_name(utc(2026, 12, 31, 0, 0, 0)), "Dec");
    }

    #[test]
    fn test_february_window_handles_leap_year() {
        let now = utc(2028, 3, 10, 0, 0, 0);
        let (start, end) = month_window(now, 1);
        assert_eq!(start, utc(2028, 2, 1, 0, 0, 0));
        assert_eq!(end, utc(2028, 3, 1, 0, 0, 0));
        assert!(utc(2028, 2, 29, 23, 0, 0) < end);
    }
}
