//! Event context menus and the optional menu capability of other plugins.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{BaseCalError, BaseCalResult};

/// Name under which a task plugin publishes its menu controller.
pub const TASK_MENU_CAPABILITY: &str = "tasks.menu";

/// Oldest capability API version this crate can drive.
pub const MIN_MENU_API_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Open,
    Delete,
    /// Action owned by a capability, identified by its own id.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: String,
    pub icon: Option<String>,
    pub action: MenuAction,
}

/// A context menu. `source` names the capability that built it, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub items: Vec<MenuItem>,
    pub source: Option<String>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, title: &str, icon: Option<&str>, action: MenuAction) -> &mut Self {
        self.items.push(MenuItem {
            title: title.to_string(),
            icon: icon.map(str::to_string),
            action,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find an item by (case-insensitive) title.
    pub fn find(&self, title: &str) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.title.eq_ignore_ascii_case(title))
    }
}

/// Built-in menu for an event note.
pub fn default_menu() -> Menu {
    let mut menu = Menu::new();
    menu.add_item("Open", Some("file"), MenuAction::Open)
        .add_item("Delete", Some("trash"), MenuAction::Delete);
    menu
}

/// Menu controller published by another plugin.
pub trait MenuCapability {
    fn api_version(&self) -> u32;

    /// Fill `menu` for the note at `path`.
    fn build_menu(&self, path: &str, menu: &mut Menu) -> BaseCalResult<()>;

    /// Run one of the custom actions this capability added.
    fn run_action(&self, path: &str, action_id: &str) -> BaseCalResult<()>;
}

/// Capabilities other plugins have published, by name.
#[derive(Default)]
pub struct CapabilityRegistry {
    menus: HashMap<String, Box<dyn MenuCapability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_menu(&mut self, name: &str, capability: Box<dyn MenuCapability>) {
        self.menus.insert(name.to_string(), capability);
    }

    pub fn unregister_menu(&mut self, name: &str) {
        self.menus.remove(name);
    }

    /// The capability, if present and recent enough.
    pub fn probe_menu(&self, name: &str, min_version: u32) -> Option<&dyn MenuCapability> {
        let capability = self.menus.get(name)?;
        let version = guarded(name, || Ok(capability.api_version()))?;
        if version < min_version {
            log::debug!(
                "Capability {} is version {}, need {}",
                name,
                version,
                min_version
            );
            return None;
        }
        Some(capability.as_ref())
    }

    /// Menu from the task capability, falling back to [`default_menu`].
    pub fn context_menu(&self, path: &str) -> Menu {
        if let Some(capability) = self.probe_menu(TASK_MENU_CAPABILITY, MIN_MENU_API_VERSION) {
            let built = guarded(TASK_MENU_CAPABILITY, || {
                let mut menu = Menu::new();
                capability.build_menu(path, &mut menu)?;
                Ok(menu)
            });

            match built {
                Some(mut menu) if !menu.is_empty() => {
                    menu.source = Some(TASK_MENU_CAPABILITY.to_string());
                    return menu;
                }
                Some(_) => log::debug!("{} returned an empty menu", TASK_MENU_CAPABILITY),
                None => {}
            }
        }
        default_menu()
    }

    /// Run a custom action through the capability that owns it.
    pub fn run_custom_action(&self, source: &str, path: &str, action_id: &str) -> BaseCalResult<()> {
        let capability = self
            .probe_menu(source, MIN_MENU_API_VERSION)
            .ok_or_else(|| BaseCalError::Capability {
                name: source.to_string(),
                message: "not available".to_string(),
            })?;

        guarded(source, || capability.run_action(path, action_id)).ok_or_else(|| {
            BaseCalError::Capability {
                name: source.to_string(),
                message: format!("action '{}' failed", action_id),
            }
        })
    }
}

/// Call into another plugin's code. Errors and panics are logged and turned
/// into `None`.
pub fn guarded<T>(name: &str, call: impl FnOnce() -> BaseCalResult<T>) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            log::warn!("Capability {} failed: {}", name, e);
            None
        }
        Err(_) => {
            log::warn!("Capability {} panicked", name);
            None
        }
    }
}
