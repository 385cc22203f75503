//! Wiring of the session store from configuration.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use waypoint_core::config::WaypointConfig;
use waypoint_infrastructure::{DirKeyValueStore, KvSessionStore, WaypointPaths};

/// Directory backing the key/value medium for `config`.
pub fn storage_dir(config: &WaypointConfig) -> Result<PathBuf> {
    match &config.storage_dir {
        Some(dir) => Ok(dir.clone()),
        None => WaypointPaths::store_dir().context("Failed to resolve the storage directory"),
    }
}

/// Opens the directory-backed session store described by `config`.
pub fn open_session_store(config: &WaypointConfig) -> Result<Arc<KvSessionStore>> {
    let dir = storage_dir(config)?;
    let kv = DirKeyValueStore::open(&dir)
        .with_context(|| format!("Failed to open storage at {}", dir.display()))?
        .with_quota(config.quota_bytes);
    tracing::debug!(
        "[StoreFactory] Using storage at {} (namespace '{}')",
        dir.display(),
        config.key_namespace
    );
    Ok(Arc::new(KvSessionStore::new(
        Arc::new(kv),
        &config.key_namespace,
    )))
}
