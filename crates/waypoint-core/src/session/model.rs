//! Session domain model.
//!
//! This module contains the [`SessionRecord`], the durable unit of a user's
//! progress, and the collection types it is built from.
//!
//! This is the "pure" domain model that the controller operates on,
//! independent of any specific storage format or version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::flow::FlowPayload;

/// Schema version written into every record by the current code.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// A set of step identifiers.
///
/// Serialized as a sorted sequence; duplicates in stored data collapse on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepSet(BTreeSet<String>);

impl StepSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.0.contains(step_id)
    }

    /// Inserts the id. Returns false if it was already present.
    pub fn insert(&mut self, step_id: impl Into<String>) -> bool {
        self.0.insert(step_id.into())
    }

    /// Flips membership of `step_id` and returns whether it is now a member.
    pub fn toggle(&mut self, step_id: &str) -> bool {
        if self.0.remove(step_id) {
            false
        } else {
            self.0.insert(step_id.to_string());
            true
        }
    }

    /// Drops every id that is not in `known` and returns how many were dropped.
    pub fn retain_known(&mut self, known: &BTreeSet<&str>) -> usize {
        let before = self.0.len();
        self.0.retain(|id| known.contains(id.as_str()));
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for StepSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Collected-status per document name.
///
/// An entry set to `false` means the same as no entry at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentChecklist(BTreeMap<String, bool>);

impl DocumentChecklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collected(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Flips the status of `name` and returns the new status.
    pub fn toggle(&mut self, name: &str) -> bool {
        let collected = !self.is_collected(name);
        self.0.insert(name.to_string(), collected);
        collected
    }

    pub fn set(&mut self, name: impl Into<String>, collected: bool) {
        self.0.insert(name.into(), collected);
    }

    /// Number of documents marked as collected.
    pub fn collected_count(&self) -> usize {
        self.0.values().filter(|collected| **collected).count()
    }

    /// Names of collected documents in sorted order.
    pub fn collected(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, collected)| **collected)
            .map(|(name, _)| name.as_str())
    }

    /// All recorded entries, including ones set to `false`.
    pub fn entries(&self) -> &BTreeMap<String, bool> {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<BTreeMap<String, bool>> for DocumentChecklist {
    fn from(entries: BTreeMap<String, bool>) -> Self {
        Self(entries)
    }
}

/// Screen the user was last on, as persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistedStage {
    #[default]
    Intake,
    Select,
    Active,
}

/// The durable record of a user's in-progress flow.
///
/// Created when a flow is first selected, rewritten on every mutation and
/// removed only by an explicit reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Selected flow. Always set when `stage` is `Active`.
    pub flow_id: Option<String>,
    pub completed_step_ids: StepSet,
    /// Steps shown expanded. Presentation state, persisted for continuity.
    pub expanded_step_ids: StepSet,
    pub documents: DocumentChecklist,
    pub stage: PersistedStage,
    /// Last intake outcome. Opaque to the controller.
    pub intake_answers: Option<serde_json::Value>,
    pub schema_version: u32,
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Creates an empty record for a freshly selected flow.
    pub fn for_flow(flow_id: impl Into<String>) -> Self {
        Self {
            flow_id: Some(flow_id.into()),
            stage: PersistedStage::Active,
            schema_version: CURRENT_SCHEMA_VERSION,
            ..Self::default()
        }
    }

    /// Clears completed steps, expanded steps and documents.
    pub fn clear_progress(&mut self) {
        self.completed_step_ids.clear();
        self.expanded_step_ids.clear();
        self.documents.clear();
    }
}

/// Rounded completion of `flow` given the completed ids.
///
/// Only ids that are steps of `flow` count, so stale ids from an older flow
/// version never push the result above 100. Returns 0 without a flow or steps.
pub fn completion_percentage(completed: &StepSet, flow: Option<&FlowPayload>) -> u8 {
    let Some(flow) = flow else {
        return 0;
    };
    let step_ids = flow.step_ids();
    if step_ids.is_empty() {
        return 0;
    }
    let done = step_ids.iter().filter(|id| completed.contains(id)).count();
    (100.0 * done as f64 / step_ids.len() as f64).round() as u8
}

/// Portable snapshot of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressExport {
    pub flow_id: String,
    pub completed: Vec<String>,
    pub documents: BTreeMap<String, bool>,
    pub exported_at: DateTime<Utc>,
}
