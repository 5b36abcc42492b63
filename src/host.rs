//! The terminal as a host: notices on stdout, notes opened with the system
//! handler, prompts through dialoguer.

use std::path::PathBuf;

use basecal_core::host::{HostContext, Notifier, Prompt, Workspace};
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;

pub struct TerminalHost {
    vault_root: PathBuf,
    /// Answer for the title prompt, from `--title`.
    preset_title: Option<String>,
}

impl TerminalHost {
    pub fn new(vault_root: PathBuf) -> Self {
        TerminalHost {
            vault_root,
            preset_title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.preset_title = title;
        self
    }

    pub fn ctx(&self) -> HostContext<'_> {
        HostContext::new(self, self, self)
    }

    fn open_path(&self, path: &str) {
        let full = self.vault_root.join(path);
        if let Err(e) = open::that(&full) {
            log::warn!("Could not open {}: {}", full.display(), e);
        }
    }
}

impl Notifier for TerminalHost {
    fn notice(&self, message: &str) {
        println!("  {}", message.cyan());
    }
}

impl Workspace for TerminalHost {
    fn open_link(&self, path: &str) {
        println!("  Opening {}", path);
        self.open_path(path);
    }

    fn hover_preview(&self, path: &str) {
        println!("  {}", path.dimmed());
    }

    fn open_in_side_panel(&self, path: &str) {
        println!("  Opening calendar {}", path.bold());
        self.open_path(path);
    }
}

impl Prompt for TerminalHost {
    fn prompt_title(&self, placeholder: &str) -> Option<String> {
        if let Some(title) = &self.preset_title {
            return Some(title.clone());
        }

        let result = Input::<String>::new()
            .with_prompt(format!("  Title ({})", placeholder))
            .allow_empty(true)
            .interact_text();
        match result {
            Ok(title) => Some(title),
            Err(e) => {
                log::debug!("Title prompt aborted: {}", e);
                None
            }
        }
    }

    fn confirm(&self, message: &str) -> bool {
        Confirm::new()
            .with_prompt(format!("  {}", message))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
