//! Application configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default prefix of the well-known storage keys.
pub const DEFAULT_KEY_NAMESPACE: &str = "simplify_slovakia";

/// Default base URL of the flow API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Documents shown by the document tracker when no checklist is configured.
pub const DEFAULT_DOCUMENT_CHECKLIST: [&str; 10] = [
    "Passport / National ID",
    "Employment Contract",
    "Proof of Address",
    "Bank Statements",
    "Travel Insurance",
    "Passport Photos",
    "Birth Certificate",
    "Marriage Certificate (if applicable)",
    "Educational Certificates",
    "Police Clearance Certificate",
];

/// Root configuration, stored as `config.toml` in the platform config directory.
///
/// Every field has a default so a partial (or missing) file is always usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    /// Directory backing the key/value medium.
    /// None means the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    /// Prefix for the session, flow id and intake keys.
    pub key_namespace: String,
    /// Base URL for flow resolution, recommendation and the catalog.
    pub api_base_url: String,
    /// Per-request timeout for the HTTP collaborators.
    pub request_timeout_secs: u64,
    /// Optional cap on the total bytes held by the medium.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<u64>,
    /// Names listed by the document tracker.
    pub document_checklist: Vec<String>,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            key_namespace: DEFAULT_KEY_NAMESPACE.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            quota_bytes: None,
            document_checklist: DEFAULT_DOCUMENT_CHECKLIST
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: WaypointConfig =
            serde_json::from_str(r#"{"api_base_url": "https://api.example.com"}"#).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.key_namespace, DEFAULT_KEY_NAMESPACE);
        assert_eq!(config.document_checklist.len(), 10);
        assert!(config.storage_dir.is_none());
    }
}
