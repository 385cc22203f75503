//! Session record DTOs and migrations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use version_migrate::{IntoDomain, MigratesTo, Versioned};

use waypoint_core::session::{
    CURRENT_SCHEMA_VERSION, DocumentChecklist, PersistedStage, SessionRecord, StepSet,
};

/// Version string of the newest session record schema.
pub const CURRENT_RECORD_VERSION: &str = "2.0.0";

/// V1.0.0: Unified session blob as first written by the web client.
///
/// Unversioned blobs on disk are read as this version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionRecordV1_0_0 {
    #[serde(default)]
    pub flow_id: Option<String>,
    #[serde(default)]
    pub completed_steps: Vec<String>,
    #[serde(default)]
    pub expanded_steps: Vec<String>,
    #[serde(default)]
    pub documents: BTreeMap<String, bool>,
    #[serde(default)]
    pub intake_answers: Option<serde_json::Value>,
    /// Whether the intake screen was showing; missing means true.
    #[serde(default)]
    pub show_intake: Option<bool>,
    /// ISO-8601 time of the last write.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// V2.0.0: Explicit stage, schema version and renamed step sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionRecordV2_0_0 {
    #[serde(default)]
    pub flow_id: Option<String>,
    #[serde(default)]
    pub completed_step_ids: Vec<String>,
    #[serde(default)]
    pub expanded_step_ids: Vec<String>,
    #[serde(default)]
    pub documents: BTreeMap<String, bool>,
    #[serde(default)]
    pub stage: PersistedStage,
    #[serde(default)]
    pub intake_answers: Option<serde_json::Value>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from V1.0.0 to V2.0.0.
///
/// The stage is derived: a selected flow means the checklist was active,
/// otherwise `showIntake == false` means the user was browsing flows.
impl MigratesTo<SessionRecordV2_0_0> for SessionRecordV1_0_0 {
    fn migrate(self) -> SessionRecordV2_0_0 {
        let flow_id = self.flow_id.filter(|id| !id.is_empty());
        let stage = match (&flow_id, self.show_intake) {
            (Some(_), _) => PersistedStage::Active,
            (None, Some(false)) => PersistedStage::Select,
            (None, _) => PersistedStage::Intake,
        };
        let saved_at = self
            .timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc));

        SessionRecordV2_0_0 {
            flow_id,
            completed_step_ids: self.completed_steps,
            expanded_step_ids: self.expanded_steps,
            documents: self.documents,
            stage,
            intake_answers: self.intake_answers.filter(|value| !value.is_null()),
            schema_version: CURRENT_SCHEMA_VERSION,
            saved_at,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// Convert SessionRecordV2_0_0 DTO to domain model.
///
/// Duplicate step ids collapse here.
impl IntoDomain<SessionRecord> for SessionRecordV2_0_0 {
    fn into_domain(self) -> SessionRecord {
        SessionRecord {
            flow_id: self.flow_id,
            completed_step_ids: self.completed_step_ids.into_iter().collect::<StepSet>(),
            expanded_step_ids: self.expanded_step_ids.into_iter().collect::<StepSet>(),
            documents: DocumentChecklist::from(self.documents),
            stage: self.stage,
            intake_answers: self.intake_answers,
            schema_version: self.schema_version,
            saved_at: self.saved_at,
        }
    }
}

/// Convert domain model to SessionRecordV2_0_0 DTO for persistence.
impl version_migrate::FromDomain<SessionRecord> for SessionRecordV2_0_0 {
    fn from_domain(record: SessionRecord) -> Self {
        SessionRecordV2_0_0 {
            flow_id: record.flow_id,
            completed_step_ids: record.completed_step_ids.iter().map(str::to_string).collect(),
            expanded_step_ids: record.expanded_step_ids.iter().map(str::to_string).collect(),
            documents: record.documents.entries().clone(),
            stage: record.stage,
            intake_answers: record.intake_answers,
            schema_version: record.schema_version,
            saved_at: record.saved_at,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for session records.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: Renames step sets, derives `stage` from `flowId` and
///   `showIntake`, parses `timestamp` into `savedAt`
/// - V2.0.0 → SessionRecord: Converts DTO to domain model
///
/// # Example
///
/// ```ignore
/// let migrator = create_session_record_migrator();
/// let record: SessionRecord = migrator.load_flat_from("session_record", json_value)?;
/// ```
pub fn create_session_record_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let record_path = version_migrate::Migrator::define("session_record")
        .from::<SessionRecordV1_0_0>()
        .step::<SessionRecordV2_0_0>()
        .into_with_save::<SessionRecord>();

    migrator
        .register(record_path)
        .expect("Failed to register session record migration path");

    migrator
}
