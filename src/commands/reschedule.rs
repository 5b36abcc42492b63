//! Drag and resize write-back from the command line.

use anyhow::{Result, bail};
use basecal_core::plugin::CalendarPlugin;
use basecal_core::render::{EventDrop, EventResize};
use basecal_core::view::CalendarView;
use owo_colors::OwoColorize;

use super::{note_id, open_view};
use crate::host::TerminalHost;
use crate::when::{parse_when, resolve_end};

pub struct MoveOptions {
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub all_day: bool,
}

fn require_editable(view: &CalendarView<'_>, id: &str) -> Result<()> {
    if view.renderer().event(id).is_none() {
        bail!("'{}' is not on this calendar", id);
    }
    if !view.config().is_editable() {
        bail!("This calendar is read-only: its dates don't come from note properties");
    }
    Ok(())
}

pub async fn run_move(
    plugin: &CalendarPlugin,
    host: &TerminalHost,
    base: &str,
    note: &str,
    options: MoveOptions,
) -> Result<()> {
    let (_query, mut view) = open_view(plugin, host, base, None).await?;
    let id = note_id(note);
    require_editable(&view, &id)?;

    let start = parse_when(&options.start)?;
    let all_day = options.all_day || start.all_day;
    let end = match resolve_end(&start, options.end.as_deref(), options.duration.as_deref())? {
        Some(end) => Some(end),
        // A dropped timed event keeps its length.
        None if !all_day => view
            .renderer()
            .event(&id)
            .filter(|e| !e.all_day)
            .map(|e| start.at + (e.end - e.start)),
        None => None,
    };

    let saved = view
        .on_event_drop(EventDrop {
            id: id.clone(),
            start: start.at,
            end,
            all_day,
        })
        .await;
    if !saved {
        bail!("Could not move {} (see the log for details)", id);
    }

    println!("{}", format!("  Moved: {}", id).green());
    Ok(())
}

pub async fn run_resize(plugin: &CalendarPlugin, host: &TerminalHost, base: &str, note: &str, end: &str) -> Result<()> {
    let (_query, mut view) = open_view(plugin, host, base, None).await?;
    let id = note_id(note);
    require_editable(&view, &id)?;

    let end = parse_when(end)?.at;
    let Some(start) = view.renderer().event(&id).map(|e| e.start) else {
        bail!("'{}' is not on this calendar", id);
    };
    if end <= start {
        bail!("End must be after the start ({})", start.format("%Y-%m-%d %H:%M"));
    }

    let saved = view
        .on_event_resize(EventResize {
            id: id.clone(),
            start,
            end: Some(end),
        })
        .await;
    if !saved {
        bail!("Could not resize {} (see the log for details)", id);
    }

    println!("{}", format!("  Resized: {}", id).green());
    Ok(())
}
