//! Session store trait.
//!
//! Defines the interface for durable session operations.

use super::model::SessionRecord;
use crate::error::StoreResult;

/// Durable storage for the single session record.
///
/// This trait decouples the controller from the storage medium and from the
/// historical on-disk shapes. It is the only path to the medium.
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Schema versioning and read-repair of legacy shapes
/// - Reporting a full medium as `StoreError::QuotaExceeded` instead of panicking
pub trait SessionStore: Send + Sync {
    /// Loads the session record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: a record was found (possibly migrated)
    /// - `Ok(None)`: nothing stored under any known shape
    /// - `Err(StoreError::Corrupt)`: stored data could not be interpreted
    fn load(&self) -> StoreResult<Option<SessionRecord>>;

    /// Writes the record and stamps `saved_at` on success.
    fn save(&self, record: &mut SessionRecord) -> StoreResult<()>;

    /// Removes the record.
    fn clear(&self) -> StoreResult<()>;

    /// True if a record, current or legacy, is present.
    fn exists(&self) -> bool;
}
