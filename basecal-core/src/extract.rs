//! Turn query results into calendar entries.

use chrono::NaiveDateTime;

use crate::query::Record;
use crate::value::{PropertyId, Value};

/// A record placed on the calendar. Rebuilt on every refresh.
pub struct CalendarEntry<'a> {
    pub record: &'a dyn Record,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub title: Option<String>,
}

impl std::fmt::Debug for CalendarEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarEntry")
            .field("path", &self.record.path())
            .field("start", &self.start)
            .field("end", &self.end)
            .field("title", &self.title)
            .finish()
    }
}

/// Property bindings used during extraction.
#[derive(Debug, Clone, Copy)]
pub struct EntryBindings<'a> {
    pub start: &'a PropertyId,
    pub end: Option<&'a PropertyId>,
    pub title: Option<&'a PropertyId>,
}

/// Build entries for every record whose start property resolves to a date.
///
/// Records keep their result-set order. A record whose start is missing,
/// not a date, or fails to resolve is left out.
pub fn extract_entries<'a, R: Record>(
    records: &'a [R],
    bindings: EntryBindings<'_>,
) -> Vec<CalendarEntry<'a>> {
    records
        .iter()
        .filter_map(|record| extract_entry(record, bindings))
        .collect()
}

fn extract_entry<'a>(record: &'a dyn Record, bindings: EntryBindings<'_>) -> Option<CalendarEntry<'a>> {
    let start = match record.get_value(bindings.start) {
        Ok(Value::Date(d)) => d.datetime,
        Ok(Value::Null) => {
            log::warn!("{}: no {}; skipping", record.path(), bindings.start);
            return None;
        }
        Ok(other) => {
            log::warn!(
                "{}: {} is a {}, not a date; skipping",
                record.path(),
                bindings.start,
                other.type_name()
            );
            return None;
        }
        Err(e) => {
            log::warn!("{}: skipping, {}", record.path(), e);
            return None;
        }
    };

    let end = bindings.end.and_then(|prop| match record.get_value(prop) {
        Ok(Value::Date(d)) => Some(d.datetime),
        Ok(_) => None,
        Err(e) => {
            log::warn!("{}: ignoring end date, {}", record.path(), e);
            None
        }
    });

    let title = bindings.title.and_then(|prop| match record.get_value(prop) {
        Ok(value) => value.display_string(),
        Err(e) => {
            log::warn!("{}: ignoring title, {}", record.path(), e);
            None
        }
    });

    Some(CalendarEntry {
        record,
        start,
        end,
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BaseCalError, BaseCalResult};
    use crate::value::DateValue;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::Once;

    thread_local! {
        static LOGGED: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    /// Keeps each test thread's log records for inspection.
    struct ThreadLog;

    impl log::Log for ThreadLog {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            LOGGED.with(|l| l.borrow_mut().push((record.level(), record.args().to_string())));
        }

        fn flush(&self) {}
    }

    fn logged_during(f: impl FnOnce()) -> Vec<(log::Level, String)> {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = log::set_logger(&ThreadLog);
            log::set_max_level(log::LevelFilter::Trace);
        });
        LOGGED.with(|l| l.borrow_mut().clear());
        f();
        LOGGED.with(|l| l.take())
    }

    struct FakeRecord {
        path: String,
        values: HashMap<String, BaseCalResult<Value>>,
    }

    impl FakeRecord {
        fn new(path: &str) -> Self {
            FakeRecord {
                path: path.to_string(),
                values: HashMap::new(),
            }
        }

        fn with(mut self, key: &str, value: BaseCalResult<Value>) -> Self {
            self.values.insert(key.to_string(), value);
            self
        }
    }

    impl Record for FakeRecord {
        fn path(&self) -> &str {
            &self.path
        }

        fn display_name(&self) -> &str {
            &self.path
        }

        fn get_value(&self, property: &PropertyId) -> BaseCalResult<Value> {
            match self.values.get(&property.name) {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(_)) => Err(BaseCalError::PropertyAccess {
                    property: property.to_string(),
                    message: "boom".to_string(),
                }),
                None => Ok(Value::Null),
            }
        }
    }

    fn date(d: u32, h: u32) -> Value {
        Value::Date(DateValue {
            datetime: NaiveDate::from_ymd_opt(2024, 3, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
            has_time: true,
        })
    }

    fn access_error() -> BaseCalResult<Value> {
        Err(BaseCalError::Query(String::new()))
    }

    #[test]
    fn records_without_resolvable_start_are_excluded() {
        let records = vec![
            FakeRecord::new("ok.md").with("start", Ok(date(1, 9))),
            FakeRecord::new("missing.md"),
            FakeRecord::new("text.md").with("start", Ok(Value::String("soon".into()))),
            FakeRecord::new("throws.md").with("start", access_error()),
            FakeRecord::new("later.md").with("start", Ok(date(2, 9))),
        ];
        let start = PropertyId::note("start");
        let bindings = EntryBindings {
            start: &start,
            end: None,
            title: None,
        };

        let entries = extract_entries(&records, bindings);
        let paths: Vec<_> = entries.iter().map(|e| e.record.path()).collect();
        assert_eq!(paths, vec!["ok.md", "later.md"]);
    }

    #[test]
    fn every_excluded_record_is_warned_about() {
        let records = vec![
            FakeRecord::new("missing.md"),
            FakeRecord::new("text.md").with("start", Ok(Value::String("soon".into()))),
            FakeRecord::new("throws.md").with("start", access_error()),
        ];
        let start = PropertyId::note("start");
        let bindings = EntryBindings {
            start: &start,
            end: None,
            title: None,
        };

        let logged = logged_during(|| assert!(extract_entries(&records, bindings).is_empty()));
        for path in ["missing.md", "text.md", "throws.md"] {
            assert!(
                logged.iter().any(|(level, msg)| *level == log::Level::Warn && msg.starts_with(path)),
                "no warning for {path}: {logged:?}"
            );
        }
    }

    #[test]
    fn end_and_title_are_optional() {
        let records = vec![
            FakeRecord::new("a.md")
                .with("start", Ok(date(1, 9)))
                .with("end", Ok(date(1, 10)))
                .with("title", Ok(Value::String("Standup".into()))),
            FakeRecord::new("b.md")
                .with("start", Ok(date(1, 9)))
                .with("end", access_error())
                .with("title", Ok(Value::String("   ".into()))),
        ];
        let (start, end, title) = (
            PropertyId::note("start"),
            PropertyId::note("end"),
            PropertyId::note("title"),
        );
        let bindings = EntryBindings {
            start: &start,
            end: Some(&end),
            title: Some(&title),
        };

        let entries = extract_entries(&records, bindings);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].end, date(1, 10).as_date().map(|d| d.datetime));
        assert_eq!(entries[0].title.as_deref(), Some("Standup"));
        assert_eq!(entries[1].end, None);
        assert_eq!(entries[1].title, None);
    }
}
