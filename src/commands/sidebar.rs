use anyhow::Result;
use basecal_core::plugin::CalendarPlugin;

use crate::host::TerminalHost;

/// Open the default calendar base. A missing or unset base is reported as a
/// notice, not an error.
pub async fn run(plugin: &CalendarPlugin, host: &TerminalHost) -> Result<()> {
    if !plugin.open_default_calendar(host.ctx()).await {
        log::info!("No default calendar opened");
    }
    Ok(())
}
