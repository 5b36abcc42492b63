//! Persisted plugin settings.
//!
//! Stored as JSON in `<vault>/.basecal/settings.json`:
//!
//! ```json
//! {
//!   "priorityColors": { "high": "#f97316" },
//!   "statusStyles": "done:strikethrough|dimmed",
//!   "sidebarBasePath": "Calendar.base"
//! }
//! ```
//!
//! Style maps may be objects or `key:value; key:value` strings. The legacy
//! keys `priorityColorMap` and `statusStyleMap` are still read.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::BaseCalResult;
use crate::render::EventStyles;
use crate::style::{merge_style_map, parse_style_map, priority_color_map, status_style_map, StyleMap};
use crate::vault::Vault;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    /// Always contains every default priority.
    pub priority_colors: StyleMap,
    /// Always contains every default status.
    pub status_styles: StyleMap,
    /// Base file opened by the sidebar command; empty when unset.
    pub sidebar_base_path: String,
}

impl Default for PluginSettings {
    fn default() -> Self {
        PluginSettings {
            priority_colors: priority_color_map(&StyleMap::new()),
            status_styles: status_style_map(&StyleMap::new()),
            sidebar_base_path: String::new(),
        }
    }
}

impl PluginSettings {
    pub fn event_styles(&self) -> EventStyles {
        EventStyles {
            priority_colors: self.priority_colors.clone(),
            status_styles: self.status_styles.clone(),
        }
    }

    /// Merge `key:value` overrides into the priority colors.
    pub fn set_priority_colors(&mut self, input: &str) {
        let overrides = parse_style_map(input);
        self.priority_colors = merge_style_map(self.priority_colors.clone(), &overrides);
    }

    /// Merge `key:value` overrides into the status styles.
    pub fn set_status_styles(&mut self, input: &str) {
        let overrides = parse_style_map(input);
        self.status_styles = merge_style_map(self.status_styles.clone(), &overrides);
    }

    pub fn sidebar_base(&self) -> Option<&str> {
        let path = self.sidebar_base_path.trim();
        (!path.is_empty()).then_some(path)
    }
}

/// A style map as found on disk.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredStyleMap {
    Map(BTreeMap<String, String>),
    Text(String),
}

impl StoredStyleMap {
    fn into_map(self) -> StyleMap {
        match self {
            StoredStyleMap::Map(map) => map,
            StoredStyleMap::Text(text) => parse_style_map(&text),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    priority_colors: Option<StoredStyleMap>,
    priority_color_map: Option<StoredStyleMap>,
    status_styles: Option<StoredStyleMap>,
    status_style_map: Option<StoredStyleMap>,
    sidebar_base_path: Option<String>,
}

impl From<StoredSettings> for PluginSettings {
    fn from(stored: StoredSettings) -> Self {
        let priority = stored
            .priority_colors
            .or(stored.priority_color_map)
            .map(StoredStyleMap::into_map)
            .unwrap_or_default();
        let status = stored
            .status_styles
            .or(stored.status_style_map)
            .map(StoredStyleMap::into_map)
            .unwrap_or_default();

        PluginSettings {
            priority_colors: priority_color_map(&priority),
            status_styles: status_style_map(&status),
            sidebar_base_path: stored.sidebar_base_path.unwrap_or_default(),
        }
    }
}

/// Parse stored settings JSON, merging over defaults.
pub fn parse_settings(json: &str) -> BaseCalResult<PluginSettings> {
    let stored: StoredSettings = serde_json::from_str(json)?;
    Ok(stored.into())
}

/// Loads and saves [`PluginSettings`] for one vault.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(vault: &Vault) -> Self {
        SettingsStore {
            path: vault.meta_dir().join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Missing settings yield the defaults; unreadable ones are logged and
    /// replaced by the defaults.
    pub async fn load(&self) -> PluginSettings {
        match fs::read_to_string(&self.path).await {
            Ok(content) => parse_settings(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid settings {}: {}", self.path.display(), e);
                PluginSettings::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PluginSettings::default(),
            Err(e) => {
                log::warn!("Could not read settings {}: {}", self.path.display(), e);
                PluginSettings::default()
            }
        }
    }

    pub async fn save(&self, settings: &PluginSettings) -> BaseCalResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content).await?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::default_priority_colors;

    #[test]
    fn empty_settings_are_defaults() {
        assert_eq!(parse_settings("{}").unwrap(), PluginSettings::default());
    }

    #[test]
    fn legacy_keys_and_string_maps_are_read() {
        let settings = parse_settings(
            r##"{"priorityColorMap": "low:#111111; high:#222222", "statusStyleMap": {"Blocked": "italic"}, "sidebarBasePath": "Cal.base"}"##,
        )
        .unwrap();

        assert_eq!(settings.priority_colors["low"], "#111111");
        assert_eq!(settings.priority_colors["high"], "#222222");
        assert_eq!(settings.priority_colors["medium"], default_priority_colors()["medium"]);
        assert_eq!(settings.status_styles["blocked"], "italic");
        assert_eq!(settings.status_styles["done"], "strikethrough|dimmed");
        assert_eq!(settings.sidebar_base(), Some("Cal.base"));
    }

    #[test]
    fn current_keys_win_over_legacy() {
        let settings =
            parse_settings(r##"{"priorityColors": {"low": "#aaaaaa"}, "priorityColorMap": {"low": "#bbbbbb"}}"##).unwrap();
        assert_eq!(settings.priority_colors["low"], "#aaaaaa");
    }

    #[test]
    fn overrides_never_drop_defaults() {
        let mut settings = PluginSettings::default();
        settings.set_priority_colors("urgent:#000000");
        assert_eq!(settings.priority_colors.len(), default_priority_colors().len());
        assert_eq!(settings.priority_colors["urgent"], "#000000");
    }

    #[tokio::test]
    async fn store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::open(dir.path()).unwrap();
        let store = SettingsStore::new(&vault);

        assert_eq!(store.load().await, PluginSettings::default());

        let mut settings = PluginSettings::default();
        settings.sidebar_base_path = "Calendar.base".to_string();
        settings.set_status_styles("waiting:dimmed");
        store.save(&settings).await.unwrap();

        assert_eq!(store.load().await, settings);
    }
}
