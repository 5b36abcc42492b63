pub mod config;
pub mod menu;
pub mod new;
pub mod reschedule;
pub mod schema;
pub mod settings;
pub mod show;
pub mod sidebar;
pub mod watch;
pub mod zoom;

use anyhow::{Context, Result};
use basecal_core::plugin::CalendarPlugin;
use basecal_core::query::Query;
use basecal_core::render::Frame;
use basecal_core::view::CalendarView;
use chrono::Local;

use crate::host::TerminalHost;
use crate::render::Render;

/// `Calendar` and `Calendar.base` both name `Calendar.base`.
fn base_path(base: &str) -> String {
    let base = base.trim_start_matches("./");
    if base.ends_with(".base") {
        base.to_string()
    } else {
        format!("{}.base", base)
    }
}

/// Event id (vault-relative note path) for a note argument.
pub fn note_id(note: &str) -> String {
    let note = note.trim_start_matches("./");
    if note.ends_with(".md") {
        note.to_string()
    } else {
        format!("{}.md", note)
    }
}

/// Load a base file and show its results in a fresh calendar view.
pub async fn open_view<'h>(
    plugin: &'h CalendarPlugin,
    host: &'h TerminalHost,
    base: &str,
    view: Option<&str>,
) -> Result<(Query, CalendarView<'h>)> {
    let vault = plugin.vault();
    let base = base_path(base);

    let query = Query::load(vault, &base, view)
        .await
        .with_context(|| format!("Could not load {}", base))?;
    let result = query.run(vault).await?;

    let mut calendar = plugin.create_view(host.ctx(), Local::now().date_naive()).await;
    calendar.on_data_updated(result);
    Ok((query, calendar))
}

pub fn print_frame(view: &CalendarView<'_>, json: bool) -> Result<()> {
    let frame: Frame = view.frame()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
    } else {
        println!("{}", frame.render());
    }
    Ok(())
}
