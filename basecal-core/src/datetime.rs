//! Date/time helpers shared by extraction, write-back and event creation.
//!
//! All times are local wall-clock `NaiveDateTime`s. Nothing here converts
//! between timezones.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;

/// Format used for every date written into frontmatter.
pub const FRONTMATTER_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Default start of the visible hour window.
pub const DEFAULT_MIN_TIME: &str = "00:00";

/// Default end of the visible hour window.
pub const DEFAULT_MAX_TIME: &str = "24:00";

/// Length given to events that have no end date.
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:[01]\d|2[0-3]):[0-5]\d(?::[0-5]\d)?|24:00(?::00)?)$")
        .expect("time-of-day pattern is valid")
});

/// Format a date as `YYYY-MM-DD HH:MM`, dropping seconds.
pub fn format_datetime_for_frontmatter(dt: &NaiveDateTime) -> String {
    dt.format(FRONTMATTER_FORMAT).to_string()
}

/// Parse the date shapes the vault's typed value system recognises.
///
/// Returns the parsed wall-clock time and whether the input carried a time
/// component. RFC 3339 strings keep the wall-clock time of their own offset.
pub fn parse_datetime(input: &str) -> Option<(NaiveDateTime, bool)> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some((date.and_time(NaiveTime::MIN), false));
    }

    for fmt in [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some((dt, true));
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| (dt.naive_local(), true))
}

/// Whether a time falls exactly on midnight.
pub fn is_midnight(dt: &NaiveDateTime) -> bool {
    dt.time() == NaiveTime::MIN
}

/// The same day at 00:00.
pub fn start_of_day(dt: &NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(NaiveTime::MIN)
}

/// End used for events without an end date.
pub fn default_end(start: &NaiveDateTime) -> NaiveDateTime {
    *start + Duration::minutes(DEFAULT_EVENT_MINUTES)
}

/// Whole minutes between two times, truncating seconds.
pub fn whole_minutes(start: &NaiveDateTime, end: &NaiveDateTime) -> i64 {
    let start = start.with_second(0).unwrap_or(*start);
    let end = end.with_second(0).unwrap_or(*end);
    (end - start).num_minutes()
}

/// Whether `s` is a valid `HH:MM[:SS]` time of day (`24:00` allowed).
pub fn is_valid_time_of_day(s: &str) -> bool {
    TIME_OF_DAY.is_match(s)
}

/// Use `value` if it is a valid time of day, otherwise `fallback`.
pub fn time_or_default(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if is_valid_time_of_day(v) => v.to_string(),
        Some(v) if !v.is_empty() => {
            log::warn!("Ignoring invalid time '{}', using {}", v, fallback);
            fallback.to_string()
        }
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn format_drops_seconds() {
        assert_eq!(
            format_datetime_for_frontmatter(&dt(2024, 3, 1, 9, 5, 59)),
            "2024-03-01 09:05"
        );
    }

    #[test]
    fn formatted_value_parses_back_to_same_minute() {
        let original = dt(2024, 12, 31, 23, 59, 42);
        let (parsed, has_time) =
            parse_datetime(&format_datetime_for_frontmatter(&original)).unwrap();

        assert!(has_time);
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 12);
        assert_eq!(parsed.day(), 31);
        assert_eq!(parsed.hour(), 23);
        assert_eq!(parsed.minute(), 59);
        assert_eq!(parsed.second(), 0);
    }

    #[test]
    fn parse_accepts_date_only_as_midnight() {
        let (parsed, has_time) = parse_datetime("2024-03-02").unwrap();
        assert!(!has_time);
        assert!(is_midnight(&parsed));
    }

    #[test]
    fn parse_accepts_iso_and_rfc3339() {
        assert_eq!(
            parse_datetime("2024-03-01T09:30").unwrap().0,
            dt(2024, 3, 1, 9, 30, 0)
        );
        assert_eq!(
            parse_datetime("2024-03-01T09:30:00+02:00").unwrap().0,
            dt(2024, 3, 1, 9, 30, 0)
        );
    }

    #[test]
    fn parse_rejects_other_text() {
        assert!(parse_datetime("next tuesday").is_none());
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("03/01/2024").is_none());
    }

    #[test]
    fn whole_minutes_ignores_seconds() {
        assert_eq!(
            whole_minutes(&dt(2024, 3, 1, 9, 0, 0), &dt(2024, 3, 1, 10, 30, 0)),
            90
        );
        assert_eq!(
            whole_minutes(&dt(2024, 3, 1, 9, 0, 50), &dt(2024, 3, 1, 9, 1, 10)),
            1
        );
    }

    #[test]
    fn time_of_day_validation() {
        assert!(is_valid_time_of_day("00:00"));
        assert!(is_valid_time_of_day("07:30:15"));
        assert!(is_valid_time_of_day("24:00"));
        assert!(!is_valid_time_of_day("24:30"));
        assert!(!is_valid_time_of_day("7:30"));
        assert!(!is_valid_time_of_day("12:60"));
        assert!(!is_valid_time_of_day(""));
    }

    #[test]
    fn invalid_times_fall_back() {
        assert_eq!(time_or_default(Some("25:00"), DEFAULT_MAX_TIME), "24:00");
        assert_eq!(time_or_default(None, DEFAULT_MIN_TIME), "00:00");
        assert_eq!(time_or_default(Some("08:00"), DEFAULT_MIN_TIME), "08:00");
    }
}
