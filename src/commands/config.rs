use anyhow::{Context, Result};
use basecal_core::app_config::AppConfig;
use basecal_core::view_config::ViewMode;
use owo_colors::OwoColorize;

pub enum ConfigChange {
    Vault(String),
    /// `none` clears the default.
    DefaultMode(String),
}

fn print(app_config: &AppConfig) {
    let mode = app_config
        .default_view_mode
        .map(|m| m.to_string())
        .unwrap_or_else(|| "(per view)".to_string());
    println!("{}              {}", "Vault:".dimmed(), app_config.vault_path().display());
    println!("{}  {}", "Default view mode:".dimmed(), mode);
}

pub fn show(app_config: &AppConfig) -> Result<()> {
    let path = AppConfig::location()?;
    println!("{}", path.display().to_string().dimmed());
    print(app_config);
    Ok(())
}

fn parse_mode(value: &str) -> Result<Option<ViewMode>> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(value.parse()?))
}

pub fn update(change: ConfigChange) -> Result<()> {
    let path = AppConfig::location()?;
    let app_config = match change {
        ConfigChange::Vault(vault) => {
            let vault = vault.trim().to_string();
            AppConfig::update_file(&path, |c| c.vault = vault.into())
        }
        ConfigChange::DefaultMode(value) => {
            let mode = parse_mode(&value)?;
            AppConfig::update_file(&path, |c| c.default_view_mode = mode)
        }
    }
    .with_context(|| format!("Could not update {}", path.display()))?;

    println!("{}", "  Config saved".green());
    print(&app_config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_clears_the_default_mode() {
        assert_eq!(parse_mode("None").unwrap(), None);
        assert_eq!(parse_mode("week").unwrap(), Some(ViewMode::FiveDay));
        assert!(parse_mode("fortnight").is_err());
    }
}
