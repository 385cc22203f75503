//! Flow domain models.
//!
//! A flow is resolved by an external service into a [`FlowPayload`]. The core
//! treats it as read-only data: it reads the step ids for reconciliation and
//! progress, and hands the rest to whoever renders it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A flow version as published by the flow API.
///
/// Flow files carry either an integer (`version: 1`) or a free-form label
/// (`version: "2024-03"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowVersion {
    Number(u64),
    Label(String),
}

impl fmt::Display for FlowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowVersion::Number(n) => write!(f, "{}", n),
            FlowVersion::Label(label) => f.write_str(label),
        }
    }
}

/// Header of a resolved flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowInfo {
    pub flow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<FlowVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Link to an authority's official page for a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialLink {
    pub authority: String,
    pub url: String,
}

/// Something that commonly goes wrong during a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMode {
    pub what_breaks: String,
    #[serde(default)]
    pub consequence: String,
}

/// One unit of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Conditions that must hold before the step can start.
    #[serde(default, alias = "prerequisites")]
    pub preconditions: Vec<String>,
    /// Artifacts the step produces.
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub official_links: Vec<OfficialLink>,
    #[serde(default)]
    pub failure_modes: Vec<FailureMode>,
}

impl Step {
    /// Title for display, falling back to the step id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.step_id)
    }
}

/// A resolved flow: header plus its ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPayload {
    pub flow: FlowInfo,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl FlowPayload {
    pub fn flow_id(&self) -> &str {
        &self.flow.flow_id
    }

    /// Distinct step identifiers of this flow.
    pub fn step_ids(&self) -> BTreeSet<&str> {
        self.steps.iter().map(|step| step.step_id.as_str()).collect()
    }

    /// Steps sorted by their `order` field (stable for equal orders).
    pub fn ordered_steps(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.order);
        steps
    }
}

/// Catalog entry describing an available flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub flow_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub step_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<FlowVersion>,
}
