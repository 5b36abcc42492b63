//! Style maps and zoom math.
//!
//! Priority colors and status styles are plain `key -> value` maps with
//! lowercase keys. User overrides are merged over the built-in defaults and
//! never remove a default key.

use std::collections::BTreeMap;

pub type StyleMap = BTreeMap<String, String>;

/// Color used when neither the priority nor `normal` has an entry.
pub const FALLBACK_EVENT_COLOR: &str = "#3788d8";

pub const DEFAULT_PRIORITY: &str = "normal";
pub const DEFAULT_STATUS: &str = "open";

const DEFAULT_PRIORITY_COLORS: &[(&str, &str)] = &[
    ("lowest", "#9ca3af"),
    ("low", "#60a5fa"),
    ("normal", "#3788d8"),
    ("medium", "#f59e0b"),
    ("high", "#f97316"),
    ("highest", "#ef4444"),
    ("urgent", "#b91c1c"),
];

const DEFAULT_STATUS_STYLES: &[(&str, &str)] = &[
    ("open", "normal"),
    ("in-progress", "italic"),
    ("waiting", "italic|dimmed"),
    ("done", "strikethrough|dimmed"),
    ("cancelled", "strikethrough"),
];

pub const MIN_CONDENSE_LEVEL: i64 = 0;
pub const MAX_CONDENSE_LEVEL: i64 = 220;
pub const DEFAULT_CONDENSE_LEVEL: i64 = 80;

/// Zoom factor at condense level 0.
pub const MAX_SLOT_ZOOM: f64 = 1.6;
/// Zoom factor at condense level 220.
pub const MIN_SLOT_ZOOM: f64 = 0.4;
/// Slot height at zoom factor 1.
pub const BASE_SLOT_HEIGHT_PX: f64 = 28.0;
/// CSS custom property consumed by the calendar stylesheet.
pub const SLOT_HEIGHT_CSS_VAR: &str = "--basecal-slot-height";

fn to_map(entries: &[(&str, &str)]) -> StyleMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn default_priority_colors() -> StyleMap {
    to_map(DEFAULT_PRIORITY_COLORS)
}

pub fn default_status_styles() -> StyleMap {
    to_map(DEFAULT_STATUS_STYLES)
}

/// Parse `key:value` entries separated by `;` or newlines.
///
/// Keys are trimmed and lower-cased. Entries without a `:`, or with an empty
/// key or value, are skipped.
pub fn parse_style_map(input: &str) -> StyleMap {
    input
        .split([';', '\n'])
        .filter_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let key = key.trim().to_lowercase();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key, value.to_string()))
        })
        .collect()
}

/// Render a map back into the `key:value; key:value` form.
pub fn format_style_map(map: &StyleMap) -> String {
    map.iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Overlay `overrides` on `defaults`. Override keys are lower-cased.
pub fn merge_style_map(defaults: StyleMap, overrides: &StyleMap) -> StyleMap {
    let mut merged = defaults;
    for (key, value) in overrides {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        merged.insert(key.trim().to_lowercase(), value.to_string());
    }
    merged
}

pub fn priority_color_map(overrides: &StyleMap) -> StyleMap {
    merge_style_map(default_priority_colors(), overrides)
}

pub fn status_style_map(overrides: &StyleMap) -> StyleMap {
    merge_style_map(default_status_styles(), overrides)
}

/// Color for a priority, falling back to the `normal` entry, then
/// [`FALLBACK_EVENT_COLOR`].
pub fn resolve_priority_color(colors: &StyleMap, priority: &str) -> String {
    colors
        .get(&priority.to_lowercase())
        .or_else(|| colors.get(DEFAULT_PRIORITY))
        .cloned()
        .unwrap_or_else(|| FALLBACK_EVENT_COLOR.to_string())
}

/// Text-style tags for a status. Tags are separated by `|` in the map.
pub fn resolve_status_styles(styles: &StyleMap, status: &str) -> Vec<String> {
    let Some(spec) = styles.get(&status.to_lowercase()) else {
        return Vec::new();
    };

    spec.split('|')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty() && tag != "normal")
        .collect()
}

/// Condense (zoom) level, always within `[0, 220]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CondenseLevel(u16);

impl CondenseLevel {
    pub fn new(level: i64) -> Self {
        CondenseLevel(level.clamp(MIN_CONDENSE_LEVEL, MAX_CONDENSE_LEVEL) as u16)
    }

    pub fn value(self) -> i64 {
        self.0 as i64
    }

    /// Explicit per-view value, else the cached value, else the default.
    pub fn resolve(explicit: Option<i64>, cached: Option<i64>) -> Self {
        explicit
            .or(cached)
            .map(CondenseLevel::new)
            .unwrap_or_default()
    }
}

impl Default for CondenseLevel {
    fn default() -> Self {
        CondenseLevel::new(DEFAULT_CONDENSE_LEVEL)
    }
}

/// Clamp a raw condense level into `[0, 220]`.
pub fn normalize_condense_level(level: i64) -> i64 {
    CondenseLevel::new(level).value()
}

/// Zoom factor for a condense level: linear from [`MAX_SLOT_ZOOM`] at 0 to
/// [`MIN_SLOT_ZOOM`] at 220.
pub fn calculate_slot_zoom(level: CondenseLevel) -> f64 {
    let t = level.value() as f64 / MAX_CONDENSE_LEVEL as f64;
    MAX_SLOT_ZOOM - (MAX_SLOT_ZOOM - MIN_SLOT_ZOOM) * t
}

pub fn slot_height_px(level: CondenseLevel) -> f64 {
    (BASE_SLOT_HEIGHT_PX * calculate_slot_zoom(level) * 100.0).round() / 100.0
}

/// Inline style declaration setting the slot height custom property.
pub fn slot_height_css(level: CondenseLevel) -> String {
    format!("{}: {}px", SLOT_HEIGHT_CSS_VAR, slot_height_px(level))
}

/// Parse `#RRGGBB` (or `RRGGBB`) into its components.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
