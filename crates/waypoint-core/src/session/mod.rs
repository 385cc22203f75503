//! Session domain module.
//!
//! This module contains the session record, the stage machine and the
//! controller that drives a user through intake, selection and the checklist.
//!
//! # Module Structure
//!
//! - `model`: Durable session record and its collections (`SessionRecord`, `StepSet`)
//! - `stage`: Lifecycle stages and transitions (`Stage`, `SessionEvent`)
//! - `repository`: Store trait for session persistence
//! - `controller`: Session lifecycle management (`SessionController`)
//!
//! # Usage
//!
//! ```ignore
//! use waypoint_core::session::{SessionController, SessionStore, Stage};
//! ```

mod controller;
mod model;
mod repository;
mod stage;

// Re-export public API
pub use controller::{FlowLoadOutcome, FlowRequest, SessionController};
pub use model::{
    CURRENT_SCHEMA_VERSION, DocumentChecklist, PersistedStage, ProgressExport, SessionRecord,
    StepSet, completion_percentage,
};
pub use repository::SessionStore;
pub use stage::{SessionEvent, Stage};
