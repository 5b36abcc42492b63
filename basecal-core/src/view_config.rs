//! Per-view configuration, read from the view entry of a `.base` file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value as YamlValue};

use crate::datetime::{time_or_default, DEFAULT_MAX_TIME, DEFAULT_MIN_TIME};
use crate::error::BaseCalError;
use crate::frontmatter;
use crate::value::PropertyId;

pub const DEFAULT_WEEK_START_DAY: u8 = 1;
pub const DEFAULT_DAY_COUNT: u32 = 3;
pub const MAX_DAY_COUNT: u32 = 31;
pub const DEFAULT_NAV_STEP: u32 = 1;

/// Day-window presets of the calendar widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Rolling window of `dayCount` days starting at the focused date.
    #[default]
    #[serde(rename = "3day")]
    ThreeDay,
    /// Five days from the start of the focused week.
    #[serde(rename = "5day")]
    FiveDay,
    #[serde(rename = "month")]
    Month,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::ThreeDay, ViewMode::FiveDay, ViewMode::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::ThreeDay => "3day",
            ViewMode::FiveDay => "5day",
            ViewMode::Month => "month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::ThreeDay => "3 days",
            ViewMode::FiveDay => "Work week",
            ViewMode::Month => "Month",
        }
    }

    /// Name of the widget's view for this preset.
    pub fn widget_view(&self) -> &'static str {
        match self {
            ViewMode::ThreeDay => "timeGridDays",
            ViewMode::FiveDay => "timeGridWorkWeek",
            ViewMode::Month => "dayGridMonth",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = BaseCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "3day" | "3-day" | "days" => Ok(ViewMode::ThreeDay),
            "5day" | "5-day" | "week" => Ok(ViewMode::FiveDay),
            "month" => Ok(ViewMode::Month),
            other => Err(BaseCalError::Config(format!(
                "Unknown view mode '{}' (expected 3day, 5day or month)",
                other
            ))),
        }
    }
}

/// Everything a calendar view reads from its per-view configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfiguration {
    pub start_property: Option<PropertyId>,
    pub end_property: Option<PropertyId>,
    pub title_property: Option<PropertyId>,
    pub priority_property: Option<PropertyId>,
    pub status_property: Option<PropertyId>,
    pub all_day_property: Option<PropertyId>,
    /// Display properties; the first non-empty one titles an event.
    pub display_properties: Vec<PropertyId>,
    /// 0 = Sunday .. 6 = Saturday.
    pub week_start_day: u8,
    /// Explicit condense level, unclamped. See [`crate::style::CondenseLevel::resolve`].
    pub condense_level: Option<i64>,
    pub min_time: String,
    pub max_time: String,
    pub day_count: u32,
    pub nav_step: u32,
    pub view_mode: ViewMode,
    pub new_event_folder: Option<String>,
    pub new_event_template: Option<String>,
}

impl Default for ViewConfiguration {
    fn default() -> Self {
        ViewConfiguration {
            start_property: None,
            end_property: None,
            title_property: None,
            priority_property: None,
            status_property: None,
            all_day_property: None,
            display_properties: Vec::new(),
            week_start_day: DEFAULT_WEEK_START_DAY,
            condense_level: None,
            min_time: DEFAULT_MIN_TIME.to_string(),
            max_time: DEFAULT_MAX_TIME.to_string(),
            day_count: DEFAULT_DAY_COUNT,
            nav_step: DEFAULT_NAV_STEP,
            view_mode: ViewMode::default(),
            new_event_folder: None,
            new_event_template: None,
        }
    }
}

impl ViewConfiguration {
    pub fn from_map(map: &Mapping) -> Self {
        let view_mode = match string(map, "viewMode") {
            Some(s) => s.parse().unwrap_or_else(|e| {
                log::warn!("{}", e);
                ViewMode::default()
            }),
            None => ViewMode::default(),
        };

        ViewConfiguration {
            start_property: property(map, "startDate"),
            end_property: property(map, "endDate"),
            title_property: property(map, "titleProperty"),
            priority_property: property(map, "priorityProperty"),
            status_property: property(map, "statusProperty"),
            all_day_property: property(map, "allDayProperty"),
            display_properties: property_list(map, "order"),
            week_start_day: integer(map, "weekStartDay")
                .map(|d| d.clamp(0, 6) as u8)
                .unwrap_or(DEFAULT_WEEK_START_DAY),
            condense_level: integer(map, "condenseLevel"),
            min_time: time_or_default(string(map, "minTime").as_deref(), DEFAULT_MIN_TIME),
            max_time: time_or_default(string(map, "maxTime").as_deref(), DEFAULT_MAX_TIME),
            day_count: integer(map, "dayCount")
                .map(|n| n.clamp(1, MAX_DAY_COUNT as i64) as u32)
                .unwrap_or(DEFAULT_DAY_COUNT),
            nav_step: integer(map, "navStep")
                .map(|n| n.clamp(1, u32::MAX as i64) as u32)
                .unwrap_or(DEFAULT_NAV_STEP),
            view_mode,
            new_event_folder: string(map, "newEventFolder"),
            new_event_template: string(map, "newEventTemplate"),
        }
    }

    /// Events can be moved only when every bound date property is a native
    /// note property.
    pub fn is_editable(&self) -> bool {
        let Some(start) = &self.start_property else {
            return false;
        };
        start.is_writable() && self.end_property.as_ref().is_none_or(PropertyId::is_writable)
    }
}

fn string(map: &Mapping, key: &str) -> Option<String> {
    let text = match frontmatter::get(map, key)? {
        YamlValue::String(s) => s.trim().to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn integer(map: &Mapping, key: &str) -> Option<i64> {
    match frontmatter::get(map, key)? {
        YamlValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        YamlValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_property(key: &str, raw: &str) -> Option<PropertyId> {
    match raw.parse() {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Ignoring {}: {}", key, e);
            None
        }
    }
}

fn property(map: &Mapping, key: &str) -> Option<PropertyId> {
    string(map, key).and_then(|raw| parse_property(key, &raw))
}

fn property_list(map: &Mapping, key: &str) -> Vec<PropertyId> {
    match frontmatter::get(map, key) {
        Some(YamlValue::Sequence(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(|raw| parse_property(key, raw))
            .collect(),
        Some(YamlValue::String(s)) => s
            .split(',')
            .filter(|raw| !raw.trim().is_empty())
            .filter_map(|raw| parse_property(key, raw))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> ViewConfiguration {
        let map: Mapping = serde_yaml::from_str(yaml).unwrap();
        ViewConfiguration::from_map(&map)
    }

    #[test]
    fn empty_map_uses_defaults() {
        let cfg = ViewConfiguration::from_map(&Mapping::new());
        assert_eq!(cfg, ViewConfiguration::default());
        assert!(!cfg.is_editable());
    }

    #[test]
    fn reads_bindings_and_options() {
        let cfg = config(
            "startDate: note.start\nendDate: note.end\ntitleProperty: note.title\norder: [note.summary, file.name]\nweekStartDay: 0\ncondenseLevel: 300\nminTime: '07:00'\nmaxTime: '21:30:00'\ndayCount: 7\nviewMode: month\nnewEventFolder: Events\n",
        );

        assert_eq!(cfg.start_property, Some(PropertyId::note("start")));
        assert_eq!(cfg.end_property, Some(PropertyId::note("end")));
        assert_eq!(cfg.display_properties, vec![PropertyId::note("summary"), PropertyId::file("name")]);
        assert_eq!(cfg.week_start_day, 0);
        assert_eq!(cfg.condense_level, Some(300));
        assert_eq!(cfg.min_time, "07:00");
        assert_eq!(cfg.max_time, "21:30:00");
        assert_eq!(cfg.day_count, 7);
        assert_eq!(cfg.view_mode, ViewMode::Month);
        assert_eq!(cfg.new_event_folder.as_deref(), Some("Events"));
        assert!(cfg.is_editable());
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = config("startDate: 'note.'\nminTime: '7am'\nmaxTime: '25:00'\ndayCount: 90\nnavStep: 0\nviewMode: year\n");
        assert_eq!(cfg.start_property, None);
        assert_eq!(cfg.min_time, DEFAULT_MIN_TIME);
        assert_eq!(cfg.max_time, DEFAULT_MAX_TIME);
        assert_eq!(cfg.day_count, MAX_DAY_COUNT);
        assert_eq!(cfg.nav_step, 1);
        assert_eq!(cfg.view_mode, ViewMode::ThreeDay);
    }

    #[test]
    fn huge_nav_step_saturates() {
        assert_eq!(config("navStep: 4294967296\n").nav_step, u32::MAX);
        assert_eq!(config("navStep: -3\n").nav_step, 1);
    }

    #[test]
    fn formula_bindings_are_read_only() {
        assert!(!config("startDate: formula.when\n").is_editable());
        assert!(!config("startDate: note.start\nendDate: formula.until\n").is_editable());
        assert!(config("startDate: start\n").is_editable());
    }

    #[test]
    fn view_mode_parses_and_displays() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.as_str().parse::<ViewMode>().unwrap(), mode);
        }
        assert!("year".parse::<ViewMode>().is_err());
    }
}
