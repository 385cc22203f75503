//! Core domain types for Waypoint.
//!
//! Everything here is free of IO: storage media and HTTP collaborators are
//! reached through the traits in [`session`], [`flow`] and [`intake`].

pub mod config;
pub mod error;
pub mod flow;
pub mod intake;
pub mod session;

// Re-export common error type
pub use error::{Result, WaypointError};
