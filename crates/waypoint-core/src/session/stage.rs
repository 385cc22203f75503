//! Session lifecycle stages and the transition table between them.
//!
//! The stage is a single explicit value rather than a combination of
//! independent flags; [`Stage::transition`] is the only place that decides which
//! events a stage accepts.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::model::PersistedStage;

/// Where the user currently is in the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// No flow chosen, asking qualification questions.
    Intake,
    /// Browsing the available flows.
    Select,
    /// A flow is chosen and its step data is being fetched.
    Resolving,
    /// Flow data loaded, checklist interactive.
    Active,
    /// The flow fetch failed. Only a reset leaves this stage.
    Failed,
}

/// Events that drive stage transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionEvent {
    /// The last intake question was answered.
    IntakeCompleted { accepted: bool },
    /// The user asked to see every flow.
    BrowseFlows,
    /// The user picked a flow.
    FlowSelected,
    /// The flow fetch for the current selection succeeded.
    FlowLoaded,
    /// The flow fetch for the current selection failed.
    FlowFailed,
    /// A step or document was toggled, or progress was cleared.
    ProgressChanged,
    /// The user confirmed a full reset.
    Reset,
}

impl Stage {
    /// Stage to start in after restoring from storage.
    pub fn restored(has_flow: bool) -> Self {
        if has_flow {
            Stage::Resolving
        } else {
            Stage::Intake
        }
    }

    /// Next stage for `event`, or `None` if the event is not accepted here.
    pub fn transition(self, event: SessionEvent) -> Option<Stage> {
        use SessionEvent::*;
        use Stage::*;

        match (self, event) {
            (_, Reset) => Some(Intake),
            (Intake, IntakeCompleted { accepted: true }) => Some(Resolving),
            (Intake, IntakeCompleted { accepted: false }) => Some(Select),
            (Intake, BrowseFlows) => Some(Select),
            // Re-selecting while resolving supersedes the in-flight fetch.
            (Select | Resolving, FlowSelected) => Some(Resolving),
            (Resolving, FlowLoaded) => Some(Active),
            (Resolving, FlowFailed) => Some(Failed),
            (Resolving | Active, ProgressChanged) => Some(self),
            _ => None,
        }
    }

    /// Whether a flow identifier is attached in this stage.
    pub fn has_flow(self) -> bool {
        matches!(self, Stage::Resolving | Stage::Active | Stage::Failed)
    }

    /// The stage as written to storage.
    ///
    /// Resolving and failed sessions are stored as active so the next visit
    /// fetches the flow again.
    pub fn persisted(self) -> PersistedStage {
        match self {
            Stage::Intake => PersistedStage::Intake,
            Stage::Select => PersistedStage::Select,
            Stage::Resolving | Stage::Active | Stage::Failed => PersistedStage::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STAGES: [Stage; 5] = [
        Stage::Intake,
        Stage::Select,
        Stage::Resolving,
        Stage::Active,
        Stage::Failed,
    ];

    #[test]
    fn test_restored() {
        assert_eq!(Stage::restored(true), Stage::Resolving);
        assert_eq!(Stage::restored(false), Stage::Intake);
    }

    #[test]
    fn test_reset_from_every_stage() {
        for stage in ALL_STAGES {
            assert_eq!(stage.transition(SessionEvent::Reset), Some(Stage::Intake));
        }
    }

    #[test]
    fn test_intake_transitions() {
        assert_eq!(
            Stage::Intake.transition(SessionEvent::IntakeCompleted { accepted: true }),
            Some(Stage::Resolving)
        );
        assert_eq!(
            Stage::Intake.transition(SessionEvent::IntakeCompleted { accepted: false }),
            Some(Stage::Select)
        );
        assert_eq!(Stage::Intake.transition(SessionEvent::BrowseFlows), Some(Stage::Select));
        assert_eq!(Stage::Intake.transition(SessionEvent::FlowSelected), None);
    }

    #[test]
    fn test_fetch_results_only_accepted_while_resolving() {
        for stage in ALL_STAGES {
            let loaded = stage.transition(SessionEvent::FlowLoaded);
            let failed = stage.transition(SessionEvent::FlowFailed);
            if stage == Stage::Resolving {
                assert_eq!(loaded, Some(Stage::Active));
                assert_eq!(failed, Some(Stage::Failed));
            } else {
                assert_eq!(loaded, None, "{} accepted flow_loaded", stage);
                assert_eq!(failed, None, "{} accepted flow_failed", stage);
            }
        }
    }

    #[test]
    fn test_selection_supersedes_while_resolving() {
        assert_eq!(
            Stage::Resolving.transition(SessionEvent::FlowSelected),
            Some(Stage::Resolving)
        );
        assert_eq!(Stage::Active.transition(SessionEvent::FlowSelected), None);
        assert_eq!(Stage::Failed.transition(SessionEvent::FlowSelected), None);
    }

    #[test]
    fn test_progress_changes_keep_stage() {
        assert_eq!(
            Stage::Active.transition(SessionEvent::ProgressChanged),
            Some(Stage::Active)
        );
        assert_eq!(
            Stage::Resolving.transition(SessionEvent::ProgressChanged),
            Some(Stage::Resolving)
        );
        assert_eq!(Stage::Failed.transition(SessionEvent::ProgressChanged), None);
        assert_eq!(Stage::Intake.transition(SessionEvent::ProgressChanged), None);
    }

    #[test]
    fn test_persisted_stage_has_flow_when_active() {
        for stage in ALL_STAGES {
            if stage.persisted() == PersistedStage::Active {
                assert!(stage.has_flow());
            }
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Stage::Resolving.to_string(), "RESOLVING");
        assert_eq!(
            SessionEvent::IntakeCompleted { accepted: true }.to_string(),
            "intake_completed"
        );
    }
}
