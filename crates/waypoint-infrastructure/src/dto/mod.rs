//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema for persisting data.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes (field renames, type changes)
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### SessionRecord Version History
//! - **(none)**: Unified blob or split per-flow keys, see [`LegacyShape`]
//! - **1.0.0**: Unified blob (`completedSteps`, `showIntake`, `timestamp`)
//! - **2.0.0**: Explicit `stage`, `schemaVersion` and `savedAt`

mod legacy;
mod session;

pub use legacy::{LEGACY_RECORD_VERSION, LegacyProgressBlob, LegacyShape};
pub use session::{
    CURRENT_RECORD_VERSION, SessionRecordV1_0_0, SessionRecordV2_0_0,
    create_session_record_migrator,
};
