use anyhow::{Result, bail};
use basecal_core::plugin::CalendarPlugin;
use dialoguer::Select;

use super::{note_id, open_view};
use crate::host::TerminalHost;
use crate::render::Render;

/// Show an event's context menu and run the chosen (or named) item.
pub async fn run(
    plugin: &CalendarPlugin,
    host: &TerminalHost,
    base: &str,
    note: &str,
    item: Option<&str>,
) -> Result<()> {
    let (_query, view) = open_view(plugin, host, base, None).await?;
    let id = note_id(note);

    let Some(menu) = view.context_menu(&id) else {
        bail!("'{}' is not on this calendar", id);
    };
    if menu.is_empty() {
        println!("  No actions for {}", id);
        return Ok(());
    }

    let chosen = match item {
        Some(title) => match menu.find(title) {
            Some(item) => item,
            None => bail!("No menu item '{}'. Available:\n{}", title, menu.render()),
        },
        None => {
            let titles: Vec<&str> = menu.items.iter().map(|i| i.title.as_str()).collect();
            let selection = Select::new()
                .with_prompt(format!("  {}", id))
                .items(&titles)
                .default(0)
                .interact()?;
            &menu.items[selection]
        }
    };

    view.run_menu_item(&id, &menu, chosen).await?;
    Ok(())
}
