//! Error types for Waypoint.
//!
//! Three layers of errors exist:
//! - [`StoreError`]: failures of the durable session medium
//! - [`FetchError`]: failures reported by the flow resolver, recommender or catalog
//! - [`WaypointError`]: the controller/service level error that wraps both

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a session store.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    /// Durable data exists but cannot be interpreted (malformed JSON, wrong types,
    /// unknown schema version).
    #[error("Stored session is corrupt: {message}")]
    Corrupt { message: String },

    /// The medium refused a write because it is full.
    #[error("Storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization error while encoding a record for storage
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML"
        message: String,
    },
}

impl StoreError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Corrupt error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Creates a QuotaExceeded error for the given key
    pub fn quota_exceeded(key: impl Into<String>) -> Self {
        Self::QuotaExceeded { key: key.into() }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Corrupt error
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Check if this is a QuotaExceeded error
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

/// Errors reported by the external collaborators (flow resolver, recommender, catalog).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    /// The requested flow does not exist.
    #[error("Flow not found: '{flow_id}'")]
    NotFound { flow_id: String },

    /// The collaborator could not be reached or answered with garbage.
    #[error("Service unreachable: {message}")]
    Unreachable { message: String },
}

impl FetchError {
    /// Creates a NotFound error
    pub fn not_found(flow_id: impl Into<String>) -> Self {
        Self::NotFound {
            flow_id: flow_id.into(),
        }
    }

    /// Creates an Unreachable error
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }
}

/// Controller and service level error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaypointError {
    /// The event is not accepted in the current stage.
    #[error("Event '{event}' is not allowed while in stage {stage}")]
    InvalidTransition { stage: String, event: String },

    /// The operation needs a selected flow.
    #[error("No flow is selected")]
    NoFlowSelected,

    /// Session store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Collaborator error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WaypointError {
    /// Creates an InvalidTransition error
    pub fn invalid_transition(stage: impl ToString, event: impl ToString) -> Self {
        Self::InvalidTransition {
            stage: stage.to_string(),
            event: event.to_string(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is an InvalidTransition error
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

impl From<std::io::Error> for WaypointError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.into())
    }
}

impl From<serde_json::Error> for WaypointError {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(StoreError::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        })
    }
}

/// A type alias for `Result<T, WaypointError>`.
pub type Result<T> = std::result::Result<T, WaypointError>;

/// A type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
