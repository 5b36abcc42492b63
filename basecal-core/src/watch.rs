//! Vault change feed.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{BaseCalError, BaseCalResult};
use crate::vault::META_DIR;

/// A note or base file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSignal {
    pub path: PathBuf,
}

/// Keeps the filesystem watcher alive; dropping it stops the feed.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
}

/// Watch `root` recursively and send a signal for every relevant change.
pub fn watch_vault(root: &Path) -> BaseCalResult<(VaultWatcher, mpsc::UnboundedReceiver<ChangeSignal>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let base = root.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if !is_content_change(&event.kind) {
                return;
            }
            for path in event.paths {
                if is_relevant(&base, &path) {
                    let _ = tx.send(ChangeSignal { path });
                }
            }
        }
        Err(e) => log::warn!("Watch error: {}", e),
    })
    .map_err(|e| BaseCalError::Watch(e.to_string()))?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| BaseCalError::Watch(e.to_string()))?;
    log::info!("Watching {}", root.display());

    Ok((VaultWatcher { _watcher: watcher }, rx))
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// `.md` and `.base` files outside hidden directories; temp files excluded.
pub fn is_relevant(root: &Path, path: &Path) -> bool {
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };

    let hidden = rel
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
    if hidden || rel.starts_with(META_DIR) {
        return false;
    }

    rel.extension()
        .is_some_and(|ext| ext == "md" || ext == "base")
}
