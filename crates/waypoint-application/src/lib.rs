//! Application layer for waypoint.
//!
//! Coordinates the session state machine in `waypoint-core` with the storage
//! and HTTP implementations in `waypoint-infrastructure`.

pub mod session_service;
pub mod store_factory;

pub use session_service::{Collaborators, SessionService};
pub use store_factory::open_session_store;
