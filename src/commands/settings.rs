use anyhow::{Context, Result};
use basecal_core::plugin::CalendarPlugin;
use owo_colors::OwoColorize;

use crate::render::Render;

pub enum SettingsChange {
    PriorityColors(String),
    StatusStyles(String),
    SidebarBase(String),
}

pub fn show(plugin: &CalendarPlugin) -> Result<()> {
    println!("{}", plugin.settings().render());
    Ok(())
}

pub async fn update(plugin: &mut CalendarPlugin, change: SettingsChange) -> Result<()> {
    plugin
        .update_settings(|settings| match change {
            SettingsChange::PriorityColors(map) => settings.set_priority_colors(&map),
            SettingsChange::StatusStyles(map) => settings.set_status_styles(&map),
            SettingsChange::SidebarBase(path) => settings.sidebar_base_path = path.trim().to_string(),
        })
        .await
        .context("Could not save settings")?;

    println!("{}", "  Settings saved".green());
    println!("{}", plugin.settings().render());
    Ok(())
}
