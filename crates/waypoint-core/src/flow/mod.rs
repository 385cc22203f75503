//! Flow domain module.
//!
//! # Module Structure
//!
//! - `model`: Resolved flow payload and catalog entries
//! - `repository`: Collaborator traits for resolving and listing flows

mod model;
mod repository;

// Re-export public API
pub use model::{
    FailureMode, FlowInfo, FlowPayload, FlowSummary, FlowVersion, OfficialLink, Step,
};
pub use repository::{FlowCatalog, FlowResolver};
