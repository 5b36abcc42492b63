//! Per-view state kept outside the settings store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::BaseCalResult;
use crate::style::normalize_condense_level;
use crate::vault::Vault;

const CACHE_FILE: &str = "cache.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheData {
    #[serde(default)]
    condense_levels: BTreeMap<String, i64>,
}

/// Condense levels keyed by query identity, stored in
/// `<vault>/.basecal/cache.json`.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
    data: CacheData,
}

impl LocalCache {
    /// Load the cache. A missing or unreadable cache starts empty.
    pub async fn load(vault: &Vault) -> Self {
        let path = vault.meta_dir().join(CACHE_FILE);

        let data = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt cache {}: {}", path.display(), e);
                CacheData::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheData::default(),
            Err(e) => {
                log::warn!("Could not read cache {}: {}", path.display(), e);
                CacheData::default()
            }
        };

        LocalCache { path, data }
    }

    pub fn condense_level(&self, identity: &str) -> Option<i64> {
        self.data.condense_levels.get(identity).copied()
    }

    pub fn set_condense_level(&mut self, identity: &str, level: i64) {
        self.data
            .condense_levels
            .insert(identity.to_string(), normalize_condense_level(level));
    }

    pub async fn save(&self) -> BaseCalResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}
