use anyhow::Result;
use basecal_core::debounce::{Debouncer, REFRESH_DEBOUNCE};
use basecal_core::plugin::CalendarPlugin;
use basecal_core::view_config::ViewMode;
use basecal_core::watch::watch_vault;
use owo_colors::OwoColorize;

use super::{open_view, print_frame};
use crate::host::TerminalHost;

/// Show the calendar and re-render whenever notes change, until Ctrl-C.
pub async fn run(
    plugin: &CalendarPlugin,
    host: &TerminalHost,
    base: &str,
    view_name: Option<&str>,
    mode: Option<ViewMode>,
) -> Result<()> {
    let (mut query, mut view) = open_view(plugin, host, base, view_name).await?;
    if let Some(mode) = mode {
        view.renderer_mut().switch_view_mode(mode);
    }
    print_frame(&view, false)?;

    let vault = plugin.vault();
    let (_watcher, mut changes) = watch_vault(vault.root())?;
    let (mut debouncer, mut fired) = Debouncer::new(REFRESH_DEBOUNCE);

    println!("{}", "   Watching for changes (Ctrl-C to stop)".dimmed());

    loop {
        tokio::select! {
            Some(signal) = changes.recv() => {
                log::debug!("Change in {}", signal.path.display());
                debouncer.trigger();
            }
            Some(()) = fired.recv() => {
                if let Err(e) = query.reload(vault).await {
                    log::warn!("Could not reload {}: {}", query.base_path, e);
                    continue;
                }
                match query.run(vault).await {
                    Ok(result) => {
                        view.on_data_updated(result);
                        println!();
                        print_frame(&view, false)?;
                    }
                    Err(e) => log::warn!("Query failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    view.close();
    Ok(())
}
