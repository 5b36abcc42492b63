use anyhow::{Result, bail};
use basecal_core::plugin::CalendarPlugin;
use basecal_core::style::slot_height_css;
use basecal_core::view::ViewState;

use super::open_view;
use crate::host::TerminalHost;

pub async fn run(plugin: &CalendarPlugin, host: &TerminalHost, base: &str, level: i64) -> Result<()> {
    let (_query, mut view) = open_view(plugin, host, base, None).await?;
    if view.state() != ViewState::Ready {
        bail!("Nothing to zoom: this view has no start date property");
    }

    let level = view.on_zoom(level).await;
    println!("  Condense level {} for {}", level.value(), view.identity());
    println!("  {}", slot_height_css(level));
    Ok(())
}
