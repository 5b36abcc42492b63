use anyhow::Result;
use basecal_core::frontmatter;
use basecal_core::plugin::CalendarPlugin;
use basecal_core::render::Direction;
use basecal_core::view_config::ViewMode;
use chrono::NaiveDate;

use super::{open_view, print_frame};
use crate::host::TerminalHost;

pub struct ShowOptions {
    pub view: Option<String>,
    pub mode: Option<ViewMode>,
    pub date: Option<NaiveDate>,
    /// Windows to move from `date` (negative goes back).
    pub page: i32,
    pub json: bool,
}

pub async fn run(
    plugin: &CalendarPlugin,
    host: &TerminalHost,
    base: &str,
    options: ShowOptions,
    default_mode: Option<ViewMode>,
) -> Result<()> {
    let (query, mut view) = open_view(plugin, host, base, options.view.as_deref()).await?;

    // The app-wide default only applies to views that don't pick a layout.
    let configured = query
        .view()
        .is_some_and(|v| frontmatter::get(&v.config, "viewMode").is_some());
    let mode = options.mode.or(default_mode.filter(|_| !configured));

    let renderer = view.renderer_mut();
    if let Some(mode) = mode {
        renderer.switch_view_mode(mode);
    }
    if let Some(date) = options.date {
        renderer.go_to_date(date);
    }
    let direction = if options.page < 0 {
        Direction::Previous
    } else {
        Direction::Next
    };
    for _ in 0..options.page.unsigned_abs() {
        renderer.navigate(direction);
    }

    print_frame(&view, options.json)
}
