//! Key-value backed implementation of [`SessionStore`].
//!
//! # Storage Keys
//!
//! ```text
//! <ns>_session        versioned session record (flat JSON, "version" field)
//! <ns>_flow_id        bare flow id, mirrored on every save
//! <ns>_intake         intake outcome written by older clients
//! progress_<flowId>   per-flow progress blob, mirrored on every save
//! ```
//!
//! Only the session key is authoritative. The mirrors keep older readers of the
//! same medium working and are written best-effort.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use version_migrate::Migrator;
use waypoint_core::error::{StoreError, StoreResult};
use waypoint_core::session::{SessionRecord, SessionStore};

use crate::dto::{
    CURRENT_RECORD_VERSION, LegacyProgressBlob, LegacyShape, create_session_record_migrator,
};
use crate::storage::KeyValueStore;

const RECORD_ENTITY: &str = "session_record";

/// Well-known keys derived from a namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub session: String,
    pub flow_id: String,
    pub intake: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            session: format!("{}_session", namespace),
            flow_id: format!("{}_flow_id", namespace),
            intake: format!("{}_intake", namespace),
        }
    }

    /// Key of the per-flow progress blob. Not namespaced.
    pub fn progress(flow_id: &str) -> String {
        format!("progress_{}", flow_id)
    }
}

/// [`SessionStore`] over any [`KeyValueStore`].
///
/// Reads every historical shape and rewrites it in the current one.
pub struct KvSessionStore {
    kv: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    migrator: Migrator,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            kv,
            keys: StorageKeys::new(namespace),
            migrator: create_session_record_migrator(),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn migrate(&self, flat: Value) -> StoreResult<SessionRecord> {
        self.migrator
            .load_flat_from(RECORD_ENTITY, flat)
            .map_err(|e| StoreError::corrupt(format!("Failed to migrate session record: {}", e)))
    }

    /// Writes a record just read from an older shape in the current one.
    fn repair(&self, record: &mut SessionRecord) {
        if let Err(e) = self.save(record) {
            tracing::warn!(
                "[KvSessionStore] Migrated record kept in memory only, rewrite failed: {}",
                e
            );
        }
    }

    fn load_unified(&self, raw: &str) -> StoreResult<Option<SessionRecord>> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| StoreError::corrupt(format!("Session key is not valid JSON: {}", e)))?;

        let version = value
            .get("version")
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()));
        let (flat, legacy) = match version {
            Some(version) => {
                let outdated = version != CURRENT_RECORD_VERSION;
                (value, outdated)
            }
            None => (LegacyShape::Unified(value).into_flat_value()?, true),
        };

        let mut record = self.migrate(flat)?;
        if !legacy {
            return Ok(Some(record));
        }

        if record.flow_id.is_none() {
            tracing::debug!("[KvSessionStore] Legacy session has no flow, treating as absent");
            return Ok(None);
        }
        tracing::info!(
            "[KvSessionStore] Upgrading session record for flow {:?} to {}",
            record.flow_id,
            CURRENT_RECORD_VERSION
        );
        self.repair(&mut record);
        Ok(Some(record))
    }

    fn load_split(&self) -> StoreResult<Option<SessionRecord>> {
        let intake = self
            .kv
            .get(&self.keys.intake)?
            .map(|raw| serde_json::from_str::<Value>(&raw))
            .transpose()
            .map_err(|e| StoreError::corrupt(format!("Intake key is not valid JSON: {}", e)))?;

        let flow_id = self
            .kv
            .get(&self.keys.flow_id)?
            .map(|raw| unquote_flow_id(&raw))
            .filter(|id| !id.is_empty())
            .or_else(|| intake.as_ref().and_then(accepted_flow_id));

        let Some(flow_id) = flow_id else {
            return Ok(None);
        };

        let progress = self
            .kv
            .get(&StorageKeys::progress(&flow_id))?
            .map(|raw| serde_json::from_str::<LegacyProgressBlob>(&raw))
            .transpose()
            .map_err(|e| {
                StoreError::corrupt(format!("Progress blob for '{}' is invalid: {}", flow_id, e))
            })?;

        let flat = LegacyShape::Split {
            flow_id: flow_id.clone(),
            progress,
            intake,
        }
        .into_flat_value()?;
        let mut record = self.migrate(flat)?;

        tracing::info!(
            "[KvSessionStore] Migrating split legacy keys for flow {}",
            flow_id
        );
        self.repair(&mut record);
        Ok(Some(record))
    }

    fn write_mirrors(&self, record: &SessionRecord) {
        let Some(flow_id) = record.flow_id.as_deref() else {
            return;
        };

        if let Err(e) = self.kv.set(&self.keys.flow_id, flow_id) {
            tracing::warn!("[KvSessionStore] Failed to mirror flow id: {}", e);
        }

        let shadow = LegacyProgressBlob {
            completed: record.completed_step_ids.iter().map(str::to_string).collect(),
            documents: record.documents.entries().clone(),
            last_updated: record.saved_at.map(|ts| ts.to_rfc3339()),
        };
        let written = serde_json::to_string(&shadow)
            .map_err(|e| StoreError::Serialization {
                format: "JSON".to_string(),
                message: e.to_string(),
            })
            .and_then(|json| self.kv.set(&StorageKeys::progress(flow_id), &json));
        if let Err(e) = written {
            tracing::warn!(
                "[KvSessionStore] Failed to mirror progress for {}: {}",
                flow_id,
                e
            );
        }
    }

    /// Flow id of whatever is stored, read without migrating.
    fn stored_flow_id(&self) -> Option<String> {
        let from_session = self
            .kv
            .get(&self.keys.session)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .and_then(|value| value.get("flowId")?.as_str().map(str::to_string));
        from_session.or_else(|| {
            self.kv
                .get(&self.keys.flow_id)
                .ok()
                .flatten()
                .map(|raw| unquote_flow_id(&raw))
        })
    }
}

impl SessionStore for KvSessionStore {
    fn load(&self) -> StoreResult<Option<SessionRecord>> {
        match self.kv.get(&self.keys.session)? {
            Some(raw) => self.load_unified(&raw),
            None => self.load_split(),
        }
    }

    fn save(&self, record: &mut SessionRecord) -> StoreResult<()> {
        let mut stamped = record.clone();
        stamped.saved_at = Some(Utc::now());

        let json = self
            .migrator
            .save_domain_flat(RECORD_ENTITY, &stamped)
            .map_err(|e| StoreError::Serialization {
                format: "JSON".to_string(),
                message: e.to_string(),
            })?;
        self.kv.set(&self.keys.session, &json)?;
        tracing::trace!(
            "[KvSessionStore] Saved session record ({} bytes)",
            json.len()
        );

        self.write_mirrors(&stamped);
        *record = stamped;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let flow_id = self.stored_flow_id();

        self.kv.remove(&self.keys.session)?;
        self.kv.remove(&self.keys.flow_id)?;
        // An accepted intake names a flow, so it has to go too
        self.kv.remove(&self.keys.intake)?;

        if let Some(flow_id) = flow_id.filter(|id| !id.is_empty()) {
            if let Err(e) = self.kv.remove(&StorageKeys::progress(&flow_id)) {
                tracing::warn!(
                    "[KvSessionStore] Failed to remove progress for {}: {}",
                    flow_id,
                    e
                );
            }
        }
        tracing::debug!("[KvSessionStore] Cleared session");
        Ok(())
    }

    fn exists(&self) -> bool {
        let check = |key: &str| match self.kv.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[KvSessionStore] Failed to check '{}': {}", key, e);
                None
            }
        };

        check(&self.keys.session).is_some()
            || check(&self.keys.flow_id).is_some()
            || check(&self.keys.intake)
                .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
                .and_then(|intake| accepted_flow_id(&intake))
                .is_some()
    }
}

/// Flow ids were written bare, but a JSON-quoted value is accepted too.
fn unquote_flow_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') {
        if let Ok(unquoted) = serde_json::from_str::<String>(trimmed) {
            return unquoted;
        }
    }
    trimmed.to_string()
}

/// Flow id of an accepted recommendation inside an intake blob.
fn accepted_flow_id(intake: &Value) -> Option<String> {
    if intake.get("accepted")?.as_bool()? {
        intake
            .get("recommendation")?
            .get("flow_id")?
            .as_str()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "session_store_test.rs"]
mod tests;
