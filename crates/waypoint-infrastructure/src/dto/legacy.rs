//! Pre-versioning storage shapes.
//!
//! Before records carried a `version` field, progress lived in two forms:
//! - a unified blob under the session key with no version field
//! - split keys: a bare flow id, a `progress_<flowId>` blob and an intake blob
//!
//! Both are lifted into flat V1.0.0 JSON here so the regular migrator can take
//! them the rest of the way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::session::SessionRecordV1_0_0;
use waypoint_core::error::{StoreError, StoreResult};

/// Version assigned to records found in a pre-versioning shape.
pub const LEGACY_RECORD_VERSION: &str = "1.0.0";

/// The per-flow progress blob stored under `progress_<flowId>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProgressBlob {
    #[serde(default)]
    pub completed: Vec<String>,
    #[serde(default)]
    pub documents: BTreeMap<String, bool>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// A record found in one of the pre-versioning shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyShape {
    /// Unified blob under the session key, without a version field.
    Unified(Value),
    /// Split keys: flow id plus its progress blob (if any) and intake blob (if any).
    Split {
        flow_id: String,
        progress: Option<LegacyProgressBlob>,
        intake: Option<Value>,
    },
}

impl LegacyShape {
    /// Converts the shape into flat V1.0.0 JSON (with a `version` field).
    pub fn into_flat_value(self) -> StoreResult<Value> {
        let mut object = match self {
            LegacyShape::Unified(Value::Object(object)) => object,
            LegacyShape::Unified(other) => {
                return Err(StoreError::corrupt(format!(
                    "Expected a session object, found {}",
                    json_kind(&other)
                )));
            }
            LegacyShape::Split {
                flow_id,
                progress,
                intake,
            } => {
                let progress = progress.unwrap_or_default();
                let record = SessionRecordV1_0_0 {
                    flow_id: Some(flow_id),
                    completed_steps: progress.completed,
                    expanded_steps: Vec::new(),
                    documents: progress.documents,
                    intake_answers: intake,
                    show_intake: Some(false),
                    timestamp: progress.last_updated,
                };
                let value = serde_json::to_value(record).map_err(|e| StoreError::Serialization {
                    format: "JSON".to_string(),
                    message: e.to_string(),
                })?;
                match value {
                    Value::Object(object) => object,
                    _ => Map::new(),
                }
            }
        };

        object.insert(
            "version".to_string(),
            Value::String(LEGACY_RECORD_VERSION.to_string()),
        );
        Ok(Value::Object(object))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
