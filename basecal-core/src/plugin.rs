//! Plugin shell: registrations with the host and the persisted settings.

use chrono::NaiveDate;

use crate::error::BaseCalResult;
use crate::host::HostContext;
use crate::local_cache::LocalCache;
use crate::menu::CapabilityRegistry;
use crate::schema::{view_options, OptionGroup};
use crate::settings::{PluginSettings, SettingsStore};
use crate::vault::Vault;
use crate::view::CalendarView;

/// View type id under which the calendar view is registered.
pub const VIEW_TYPE: &str = "calendar";

pub const OPEN_SIDEBAR_COMMAND_ID: &str = "open-calendar-sidebar";

const OPEN_SIDEBAR_TITLE: &str = "Open calendar in sidebar";
const RIBBON_ICON: &str = "calendar-days";
const SETTINGS_TAB_NAME: &str = "Base Calendar";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRegistration {
    pub view_type: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRegistration {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibbonRegistration {
    pub icon: &'static str,
    pub title: &'static str,
    /// Command run on click.
    pub command_id: &'static str,
}

/// Registration points the host application offers to plugins.
pub trait HostRegistry {
    fn register_view(&mut self, view: ViewRegistration, options: Vec<OptionGroup>);
    fn add_command(&mut self, command: CommandRegistration);
    fn add_ribbon_icon(&mut self, ribbon: RibbonRegistration);
    fn add_settings_tab(&mut self, name: &'static str);
}

pub struct CalendarPlugin {
    vault: Vault,
    store: SettingsStore,
    settings: PluginSettings,
    capabilities: CapabilityRegistry,
}

impl CalendarPlugin {
    /// Load settings for `vault`.
    pub async fn load(vault: Vault) -> Self {
        let store = SettingsStore::new(&vault);
        let settings = store.load().await;
        log::debug!("Loaded settings from {}", store.path().display());

        CalendarPlugin {
            vault,
            store,
            settings,
            capabilities: CapabilityRegistry::new(),
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut CapabilityRegistry {
        &mut self.capabilities
    }

    /// Register the view type, settings tab, command and ribbon icon.
    pub fn register(&self, registry: &mut dyn HostRegistry) {
        registry.register_view(
            ViewRegistration {
                view_type: VIEW_TYPE,
                name: "Calendar",
                icon: RIBBON_ICON,
            },
            view_options(),
        );
        registry.add_settings_tab(SETTINGS_TAB_NAME);
        registry.add_command(CommandRegistration {
            id: OPEN_SIDEBAR_COMMAND_ID,
            name: OPEN_SIDEBAR_TITLE,
        });
        registry.add_ribbon_icon(RibbonRegistration {
            icon: RIBBON_ICON,
            title: OPEN_SIDEBAR_TITLE,
            command_id: OPEN_SIDEBAR_COMMAND_ID,
        });
    }

    /// Change the settings and save them.
    pub async fn update_settings<F>(&mut self, update: F) -> BaseCalResult<()>
    where
        F: FnOnce(&mut PluginSettings),
    {
        update(&mut self.settings);
        self.store.save(&self.settings).await
    }

    /// A new calendar view sharing this plugin's settings and capabilities.
    pub async fn create_view<'h>(&'h self, host: HostContext<'h>, today: NaiveDate) -> CalendarView<'h> {
        let cache = LocalCache::load(&self.vault).await;
        CalendarView::new(
            self.vault.clone(),
            host,
            &self.capabilities,
            self.settings.event_styles(),
            cache,
            today,
        )
    }

    /// Command and ribbon action: open the configured base in the side panel.
    /// Returns whether anything was opened.
    pub async fn open_default_calendar(&self, host: HostContext<'_>) -> bool {
        let Some(path) = self.settings.sidebar_base() else {
            host.notifier
                .notice("No default calendar set. Choose a base file in the plugin settings.");
            return false;
        };

        if !self.vault.exists(path).await {
            host.notifier
                .notice(&format!("Default calendar not found: {}", path));
            return false;
        }
        if !self.vault.is_file(path).await {
            host.notifier
                .notice(&format!("Default calendar is not a file: {}", path));
            return false;
        }

        host.workspace.open_in_side_panel(path);
        true
    }
}
