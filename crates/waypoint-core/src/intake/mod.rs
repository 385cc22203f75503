//! Intake domain module.
//!
//! # Module Structure
//!
//! - `model`: Questionnaire answers, recommendation and the intake record
//! - `service`: Recommender trait
//!
//! # Usage
//!
//! ```ignore
//! use waypoint_core::intake::{IntakeAnswers, IntakeRecord, Recommender};
//! ```

mod model;
mod service;

// Re-export public API
pub use model::{
    City, Confidence, EntryContext, IntakeAnswers, IntakeRecord, Nationality, Purpose,
    Recommendation,
};
pub use service::Recommender;
