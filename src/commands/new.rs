use anyhow::{Result, bail};
use basecal_core::datetime::default_end;
use basecal_core::plugin::CalendarPlugin;
use basecal_core::view::ViewState;
use chrono::Duration;
use owo_colors::OwoColorize;

use super::open_view;
use crate::host::TerminalHost;
use crate::when::{parse_when, resolve_end};

pub struct NewOptions {
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub all_day: bool,
}

/// Create an event note as if the range had been selected on the grid.
pub async fn run(plugin: &CalendarPlugin, host: &TerminalHost, base: &str, options: NewOptions) -> Result<()> {
    let (_query, view) = open_view(plugin, host, base, None).await?;
    if view.state() != ViewState::Ready {
        bail!("Choose a start date property for this view before creating events");
    }

    let start = parse_when(&options.start)?;
    let all_day = options.all_day || start.all_day;
    let end = match resolve_end(&start, options.end.as_deref(), options.duration.as_deref())? {
        Some(end) => end,
        None if all_day => start.at + Duration::days(1),
        None => default_end(&start.at),
    };

    match view.on_select(start.at, end, all_day).await? {
        Some(note) => println!("{}", format!("  Created: {}", note.path).green()),
        None => println!("{}", "  Cancelled".dimmed()),
    }
    Ok(())
}
