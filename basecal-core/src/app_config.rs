//! Machine-wide settings: which vault to open and the fallback layout.
//!
//! Per-view settings live in each `.base` file and plugin settings inside the
//! vault's `.basecal/` directory; this file only covers what is needed before
//! a vault is opened.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{BaseCalError, BaseCalResult};
use crate::view_config::ViewMode;

const DEFAULT_VAULT: &str = "~/notes";

/// Written on first run so the available keys are discoverable.
const FIRST_RUN_CONTENTS: &str = "\
# basecal configuration

# Vault directory (BASECAL_VAULT overrides it):
# vault = \"~/notes\"

# Layout for views that don't choose one (3day, 5day or month):
# default_view_mode = \"3day\"
";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "AppConfig::is_default_vault")]
    pub vault: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_view_mode: Option<ViewMode>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            vault: PathBuf::from(DEFAULT_VAULT),
            default_view_mode: None,
        }
    }
}

impl AppConfig {
    fn is_default_vault(vault: &PathBuf) -> bool {
        vault.as_os_str() == DEFAULT_VAULT
    }

    /// `~/.config/basecal/config.toml` (platform config dir).
    pub fn location() -> BaseCalResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("basecal").join("config.toml"))
            .ok_or_else(|| BaseCalError::Config("Could not determine config directory".into()))
    }

    /// Settings from the config file plus `BASECAL_*` environment overrides.
    /// The file is created, fully commented out, when missing.
    pub fn load() -> BaseCalResult<Self> {
        let path = Self::location()?;
        if !path.exists() {
            write_config_file(&path, FIRST_RUN_CONTENTS)?;
            log::info!("Created {}", path.display());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> BaseCalResult<Self> {
        build(file_source(path).add_source(Environment::with_prefix("BASECAL")))
    }

    /// Edit the config file in place. Environment overrides are neither
    /// applied nor persisted.
    pub fn update_file(path: &Path, edit: impl FnOnce(&mut AppConfig)) -> BaseCalResult<Self> {
        let mut app_config = build(file_source(path))?;
        edit(&mut app_config);
        app_config.save_to(path)?;
        Ok(app_config)
    }

    pub fn save_to(&self, path: &Path) -> BaseCalResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| BaseCalError::Config(e.to_string()))?;
        write_config_file(path, &contents)
    }

    /// Vault directory with `~` expanded.
    pub fn vault_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.vault.to_string_lossy()).as_ref())
    }
}

fn file_source(path: &Path) -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from(path.to_path_buf()).required(false))
}

fn build(builder: ConfigBuilder<DefaultState>) -> BaseCalResult<AppConfig> {
    builder
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>())
        .map_err(|e| BaseCalError::Config(e.to_string()))
}

fn write_config_file(path: &Path, contents: &str) -> BaseCalResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| BaseCalError::Config(format!("Could not create {}: {e}", parent.display())))?;
    }
    std::fs::write(path, contents)
        .map_err(|e| BaseCalError::Config(format!("Could not write {}: {e}", path.display())))
}
