//! Natural-language times for the command line.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime, NaiveTime};

/// A parsed `WHEN`: the local time and whether a time of day was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct When {
    pub at: NaiveDateTime,
    pub all_day: bool,
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    let abbrevs = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    lowered_words(input)
        .map(|word| {
            abbrevs
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| full.to_string())
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn lowered_words(input: &str) -> impl Iterator<Item = String> + '_ {
    input.split_whitespace().map(str::to_lowercase)
}

/// Whether the input names a time of day (am/pm, HH:MM, noon, midnight, "at N").
fn has_time_component(input: &str) -> bool {
    let lower = input.to_lowercase();
    if lower.contains("noon") || lower.contains("midnight") {
        return true;
    }

    let bytes = lower.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let is_meridiem = (b == b'a' || b == b'p') && bytes.get(i + 1) == Some(&b'm');
        if is_meridiem {
            let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
            let spaced_digit = i > 1 && bytes[i - 1] == b' ' && bytes[i - 2].is_ascii_digit();
            let word_ends = bytes.get(i + 2).is_none_or(|c| !c.is_ascii_alphabetic());
            if (digit_before || spaced_digit) && word_ends {
                return true;
            }
        }

        if b == b':' {
            let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
            let digit_after = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
            if digit_before && digit_after {
                return true;
            }
        }
    }

    let after_at = lower
        .find(" at ")
        .map(|pos| &lower[pos + 4..])
        .or_else(|| lower.strip_prefix("at "));
    after_at.is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// Parse a `WHEN`. Date-only input is an all-day time at midnight.
pub fn parse_when(input: &str) -> Result<When> {
    if let Some((at, has_time)) = basecal_core::datetime::parse_datetime(input) {
        return Ok(When {
            at,
            all_day: !has_time,
        });
    }

    let expanded = expand_abbreviations(input);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow::anyhow!("Could not parse date/time: \"{}\"", input))?;

    if has_time_component(input) {
        Ok(When {
            at: dt,
            all_day: false,
        })
    } else {
        Ok(When {
            at: dt.date().and_time(NaiveTime::MIN),
            all_day: true,
        })
    }
}

/// Parse a humantime duration such as `30m` or `1h 30m`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let std_dur = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    Duration::from_std(std_dur).context("Duration too large")
}

/// End time from `--end` or `--duration`, if either was given.
pub fn resolve_end(start: &When, end: Option<&str>, duration: Option<&str>) -> Result<Option<NaiveDateTime>> {
    if let Some(end) = end {
        let cleaned = end
            .strip_prefix("until ")
            .or_else(|| end.strip_prefix("to "))
            .unwrap_or(end);
        return Ok(Some(parse_when(cleaned)?.at));
    }
    if let Some(duration) = duration {
        return Ok(Some(start.at + parse_duration(duration)?));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};

    #[test]
    fn time_component_am_pm() {
        assert!(has_time_component("tomorrow 6pm"));
        assert!(has_time_component("friday 11am"));
        assert!(has_time_component("sat 3 pm"));
        assert!(has_time_component("9AM"));
    }

    #[test]
    fn time_component_colon_and_keywords() {
        assert!(has_time_component("tomorrow 15:00"));
        assert!(has_time_component("tomorrow noon"));
        assert!(has_time_component("at 9"));
        assert!(has_time_component("friday at 15"));
    }

    #[test]
    fn no_time_component() {
        assert!(!has_time_component("tomorrow"));
        assert!(!has_time_component("march 20"));
        assert!(!has_time_component("december"));
        assert!(!has_time_component("camp"));
    }

    #[test]
    fn expands_abbreviations() {
        assert_eq!(expand_abbreviations("sat 3pm"), "saturday 3pm");
        assert_eq!(expand_abbreviations("Sept 5"), "september 5");
        assert_eq!(expand_abbreviations("next friday"), "next friday");
    }

    #[test]
    fn frontmatter_style_input_is_exact() {
        let when = parse_when("2024-03-04 09:30").unwrap();
        assert!(!when.all_day);
        assert_eq!(when.at.hour(), 9);
        assert_eq!(when.at.minute(), 30);

        let day = parse_when("2024-03-04").unwrap();
        assert!(day.all_day);
        assert_eq!(day.at, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_time(NaiveTime::MIN));
    }

    #[test]
    fn natural_language_dates() {
        let when = parse_when("march 20").unwrap();
        assert!(when.all_day);
        assert_eq!((when.at.month(), when.at.day()), (3, 20));

        assert!(!parse_when("tomorrow 3pm").unwrap().all_day);
        assert!(parse_when("not a date at all xyz").is_err());
    }

    #[test]
    fn end_from_duration_or_time() {
        let start = parse_when("2024-03-04 09:00").unwrap();
        let end = resolve_end(&start, None, Some("90m")).unwrap().unwrap();
        assert_eq!(end - start.at, Duration::minutes(90));

        let end = resolve_end(&start, Some("until 2024-03-04 11:00"), None).unwrap().unwrap();
        assert_eq!(end.hour(), 11);

        assert!(resolve_end(&start, None, None).unwrap().is_none());
        assert!(resolve_end(&start, None, Some("soon")).is_err());
    }
}
