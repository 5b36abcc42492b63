//! Configuration schema shown by the host's view-options UI.

use serde::Serialize;

use crate::datetime::{DEFAULT_MAX_TIME, DEFAULT_MIN_TIME};
use crate::style::{DEFAULT_CONDENSE_LEVEL, MAX_CONDENSE_LEVEL, MIN_CONDENSE_LEVEL};
use crate::view_config::{ViewMode, DEFAULT_DAY_COUNT, DEFAULT_NAV_STEP, DEFAULT_WEEK_START_DAY, MAX_DAY_COUNT};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGroup {
    pub display_name: &'static str,
    pub items: Vec<ConfigOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfigOption {
    /// Picks a property id.
    #[serde(rename_all = "camelCase")]
    Property {
        key: &'static str,
        display_name: &'static str,
        /// Only offer date-typed properties.
        dates_only: bool,
    },
    #[serde(rename_all = "camelCase")]
    Slider {
        key: &'static str,
        display_name: &'static str,
        min: i64,
        max: i64,
        step: i64,
        default: i64,
    },
    #[serde(rename_all = "camelCase")]
    Dropdown {
        key: &'static str,
        display_name: &'static str,
        options: Vec<(String, String)>,
        default: String,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        key: &'static str,
        display_name: &'static str,
        placeholder: &'static str,
    },
}

impl ConfigOption {
    pub fn key(&self) -> &'static str {
        match self {
            ConfigOption::Property { key, .. }
            | ConfigOption::Slider { key, .. }
            | ConfigOption::Dropdown { key, .. }
            | ConfigOption::Text { key, .. } => key,
        }
    }
}

fn property(key: &'static str, display_name: &'static str, dates_only: bool) -> ConfigOption {
    ConfigOption::Property {
        key,
        display_name,
        dates_only,
    }
}

fn text(key: &'static str, display_name: &'static str, placeholder: &'static str) -> ConfigOption {
    ConfigOption::Text {
        key,
        display_name,
        placeholder,
    }
}

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// The calendar view's option groups, in display order.
pub fn view_options() -> Vec<OptionGroup> {
    vec![
        OptionGroup {
            display_name: "Date properties",
            items: vec![
                property("startDate", "Start date", true),
                property("endDate", "End date", true),
                property("allDayProperty", "All-day flag", false),
            ],
        },
        OptionGroup {
            display_name: "Calendar options",
            items: vec![
                property("titleProperty", "Title", false),
                property("priorityProperty", "Priority", false),
                property("statusProperty", "Status", false),
                ConfigOption::Dropdown {
                    key: "weekStartDay",
                    display_name: "Week starts on",
                    options: WEEKDAYS
                        .iter()
                        .enumerate()
                        .map(|(i, day)| (i.to_string(), day.to_string()))
                        .collect(),
                    default: DEFAULT_WEEK_START_DAY.to_string(),
                },
            ],
        },
        OptionGroup {
            display_name: "Time range",
            items: vec![
                text("minTime", "Day starts at", DEFAULT_MIN_TIME),
                text("maxTime", "Day ends at", DEFAULT_MAX_TIME),
            ],
        },
        OptionGroup {
            display_name: "View options",
            items: vec![
                ConfigOption::Dropdown {
                    key: "viewMode",
                    display_name: "Layout",
                    options: ViewMode::ALL
                        .iter()
                        .map(|m| (m.as_str().to_string(), m.label().to_string()))
                        .collect(),
                    default: ViewMode::default().as_str().to_string(),
                },
                ConfigOption::Slider {
                    key: "dayCount",
                    display_name: "Days shown",
                    min: 1,
                    max: MAX_DAY_COUNT as i64,
                    step: 1,
                    default: DEFAULT_DAY_COUNT as i64,
                },
                ConfigOption::Slider {
                    key: "navStep",
                    display_name: "Navigation step",
                    min: 1,
                    max: 12,
                    step: 1,
                    default: DEFAULT_NAV_STEP as i64,
                },
                ConfigOption::Slider {
                    key: "condenseLevel",
                    display_name: "Condense",
                    min: MIN_CONDENSE_LEVEL,
                    max: MAX_CONDENSE_LEVEL,
                    step: 10,
                    default: DEFAULT_CONDENSE_LEVEL,
                },
            ],
        },
        OptionGroup {
            display_name: "Event creation",
            items: vec![
                text("newEventFolder", "Folder for new events", "Vault root"),
                text("newEventTemplate", "Template", "Templates/Event.md"),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_groups_with_unique_keys() {
        let groups = view_options();
        assert_eq!(groups.len(), 5);

        let mut keys: Vec<_> = groups.iter().flat_map(|g| g.items.iter().map(ConfigOption::key)).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert!(keys.contains(&"startDate"));
    }

    #[test]
    fn serializes_with_type_tags() {
        let json = serde_json::to_value(view_options()).unwrap();
        assert_eq!(json[0]["displayName"], "Date properties");
        assert_eq!(json[0]["items"][0]["type"], "property");
        assert_eq!(json[0]["items"][0]["datesOnly"], true);
        assert_eq!(json[3]["items"][3]["default"], 80);
    }
}
