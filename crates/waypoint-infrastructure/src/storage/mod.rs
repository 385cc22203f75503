//! Storage layer for the durable key-value medium and atomic file writes.
//!
//! The session store never touches files directly. It reads and writes
//! string values under well-known keys through [`KeyValueStore`], which has a
//! file-backed and an in-memory implementation.

mod atomic_file;
mod dir_store;
mod memory_store;

pub use atomic_file::{AtomicTomlFile, write_atomic};
pub use dir_store::DirKeyValueStore;
pub use memory_store::MemoryKeyValueStore;

use waypoint_core::error::StoreResult;

/// A flat string-to-string store, modeled after browser local storage.
///
/// Writes may be refused with `StoreError::QuotaExceeded` when the medium is
/// full. Implementations must never panic on a full medium.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
