//! Host UI contracts.
//!
//! Components never reach for globals; everything that talks to the user goes
//! through these traits, bundled in a [`HostContext`].

/// User-visible notices.
pub trait Notifier {
    fn notice(&self, message: &str);
}

/// Navigation inside the host application.
pub trait Workspace {
    /// Open a note (vault-relative path) in the main editor.
    fn open_link(&self, path: &str);

    /// Show a hover preview of a note.
    fn hover_preview(&self, path: &str);

    /// Open a file in the side panel.
    fn open_in_side_panel(&self, path: &str);
}

/// Blocking modal prompts.
pub trait Prompt {
    /// Ask for an event title. `None` means the user cancelled.
    fn prompt_title(&self, placeholder: &str) -> Option<String>;

    /// Yes/no confirmation.
    fn confirm(&self, message: &str) -> bool;
}

/// Host services handed to every component that needs them.
#[derive(Clone, Copy)]
pub struct HostContext<'a> {
    pub notifier: &'a dyn Notifier,
    pub workspace: &'a dyn Workspace,
    pub prompt: &'a dyn Prompt,
}

impl<'a> HostContext<'a> {
    pub fn new(
        notifier: &'a dyn Notifier,
        workspace: &'a dyn Workspace,
        prompt: &'a dyn Prompt,
    ) -> Self {
        HostContext {
            notifier,
            workspace,
            prompt,
        }
    }
}
