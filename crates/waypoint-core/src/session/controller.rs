use super::model::{
    CURRENT_SCHEMA_VERSION, DocumentChecklist, ProgressExport, SessionRecord, StepSet,
    completion_percentage,
};
use super::repository::SessionStore;
use super::stage::{SessionEvent, Stage};
use crate::error::{FetchError, Result, StoreError, WaypointError};
use crate::flow::FlowPayload;
use crate::intake::IntakeRecord;
use chrono::Utc;
use std::sync::Arc;

/// A flow fetch the controller wants issued.
///
/// The caller performs the fetch and reports the outcome through
/// [`SessionController::on_flow_loaded`] with the same `flow_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRequest {
    pub flow_id: String,
}

impl FlowRequest {
    fn new(flow_id: impl Into<String>) -> Self {
        Self {
            flow_id: flow_id.into(),
        }
    }
}

/// What happened to a fetch result handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowLoadOutcome {
    /// The result belonged to the current selection and moved the stage.
    Applied(Stage),
    /// The result belonged to a superseded selection and was ignored.
    Discarded,
}

/// Owns the session state machine.
///
/// `SessionController` is responsible for:
/// - Restoring progress from the session store on startup
/// - Applying user events (intake, selection, toggles, reset) to the stage
/// - Reconciling persisted step ids against freshly loaded flow data
/// - Writing every mutation through to the store
///
/// Network side effects are not performed here. Operations that need a flow
/// fetch return a [`FlowRequest`] instead.
pub struct SessionController {
    /// Durable backend for the session record
    store: Arc<dyn SessionStore>,
    stage: Stage,
    /// Authoritative in-memory progress; the stored copy mirrors it
    record: SessionRecord,
    /// Flow data for the current selection, once loaded
    flow: Option<FlowPayload>,
    /// Human-readable fetch failure while `Failed`
    error: Option<String>,
    /// Last failed write, cleared by the next successful one
    storage_warning: Option<StoreError>,
}

impl SessionController {
    /// Restores the session from `store`.
    ///
    /// A stored record with a flow resumes in `Resolving` and the returned
    /// request must be fetched. Anything else starts a fresh `Intake`.
    /// A corrupt record is cleared and treated as absent.
    pub fn restore(store: Arc<dyn SessionStore>) -> (Self, Option<FlowRequest>) {
        let record = match store.load() {
            Ok(Some(record)) => Some(record),
            Ok(None) => None,
            Err(err) if err.is_corrupt() => {
                tracing::warn!("[SessionController] Discarding corrupt session: {}", err);
                if let Err(clear_err) = store.clear() {
                    tracing::warn!(
                        "[SessionController] Failed to clear corrupt session: {}",
                        clear_err
                    );
                }
                None
            }
            Err(err) => {
                tracing::warn!("[SessionController] Session restore failed: {}", err);
                None
            }
        };

        let mut controller = Self {
            store,
            stage: Stage::Intake,
            record: SessionRecord::default(),
            flow: None,
            error: None,
            storage_warning: None,
        };

        let Some(record) = record.filter(|record| record.flow_id.is_some()) else {
            tracing::debug!("[SessionController] No session to restore, starting intake");
            return (controller, None);
        };

        let request = record.flow_id.clone().map(FlowRequest::new);
        tracing::info!(
            "[SessionController] Restoring session for flow {:?} ({} completed steps)",
            record.flow_id,
            record.completed_step_ids.len()
        );
        controller.stage = Stage::restored(true);
        controller.record = record;
        (controller, request)
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn flow_id(&self) -> Option<&str> {
        self.record.flow_id.as_deref()
    }

    pub fn flow(&self) -> Option<&FlowPayload> {
        self.flow.as_ref()
    }

    pub fn completed_steps(&self) -> &StepSet {
        &self.record.completed_step_ids
    }

    pub fn expanded_steps(&self) -> &StepSet {
        &self.record.expanded_step_ids
    }

    pub fn documents(&self) -> &DocumentChecklist {
        &self.record.documents
    }

    /// The fetch failure message while in `Failed`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The last write failure, if the latest write did not succeed.
    ///
    /// In-memory state stays authoritative while this is set.
    pub fn storage_warning(&self) -> Option<&StoreError> {
        self.storage_warning.as_ref()
    }

    /// The in-memory session record.
    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Rounded share of the loaded flow's steps that are completed.
    pub fn completion_percentage(&self) -> u8 {
        completion_percentage(&self.record.completed_step_ids, self.flow.as_ref())
    }

    pub fn documents_collected(&self) -> usize {
        self.record.documents.collected_count()
    }

    // ============================================================================
    // Intake and selection
    // ============================================================================

    /// Leaves the intake for the full flow list.
    pub fn browse_flows(&mut self) -> Result<()> {
        self.stage = self.next_stage(SessionEvent::BrowseFlows)?;
        Ok(())
    }

    /// Applies the final intake answer.
    ///
    /// An accepted recommendation selects its flow with empty progress and
    /// returns the fetch to issue. A declined one moves to `Select`.
    pub fn complete_intake(&mut self, intake: IntakeRecord) -> Result<Option<FlowRequest>> {
        let accepted_flow = intake.accepted_flow_id().map(str::to_string);
        let next = self.next_stage(SessionEvent::IntakeCompleted {
            accepted: accepted_flow.is_some(),
        })?;

        let intake_value = serde_json::to_value(&intake)?;
        match accepted_flow {
            Some(flow_id) => {
                tracing::info!("[SessionController] Recommendation accepted: {}", flow_id);
                self.start_flow(flow_id.clone(), Some(intake_value), next);
                Ok(Some(FlowRequest::new(flow_id)))
            }
            None => {
                self.record.intake_answers = Some(intake_value);
                self.stage = next;
                Ok(None)
            }
        }
    }

    /// Selects a flow, discarding any progress held for the previous one.
    ///
    /// Allowed from `Select`, and from `Resolving` where it supersedes the
    /// in-flight fetch.
    pub fn select_flow(&mut self, flow_id: impl Into<String>) -> Result<FlowRequest> {
        let flow_id = flow_id.into();
        let next = self.next_stage(SessionEvent::FlowSelected)?;
        if self.stage == Stage::Resolving {
            tracing::info!(
                "[SessionController] Selection {:?} superseded by {}",
                self.record.flow_id,
                flow_id
            );
        }
        let intake = self.record.intake_answers.take();
        self.start_flow(flow_id.clone(), intake, next);
        Ok(FlowRequest::new(flow_id))
    }

    fn start_flow(&mut self, flow_id: String, intake: Option<serde_json::Value>, next: Stage) {
        let mut record = SessionRecord::for_flow(flow_id);
        record.intake_answers = intake;
        self.record = record;
        self.flow = None;
        self.error = None;
        self.stage = next;
        self.persist();
    }

    /// Delivers the result of a flow fetch.
    ///
    /// Results for anything but the current selection while `Resolving` are
    /// discarded. On success, completed and expanded ids that are not steps of
    /// the loaded flow are dropped before the checklist becomes active.
    pub fn on_flow_loaded(
        &mut self,
        flow_id: &str,
        result: std::result::Result<FlowPayload, FetchError>,
    ) -> FlowLoadOutcome {
        if self.stage != Stage::Resolving || self.flow_id() != Some(flow_id) {
            tracing::info!(
                "[SessionController] Discarding stale flow response for {} (stage {}, selected {:?})",
                flow_id,
                self.stage,
                self.record.flow_id
            );
            return FlowLoadOutcome::Discarded;
        }

        match result {
            Ok(payload) => {
                let dropped = {
                    let known = payload.step_ids();
                    self.record.completed_step_ids.retain_known(&known)
                        + self.record.expanded_step_ids.retain_known(&known)
                };
                if dropped > 0 {
                    tracing::trace!(
                        "[SessionController] Dropped {} stale step references for {}",
                        dropped,
                        flow_id
                    );
                }
                self.flow = Some(payload);
                self.error = None;
                self.stage = Stage::Active;
                if dropped > 0 {
                    self.persist();
                }
            }
            Err(err) => {
                tracing::warn!("[SessionController] Flow {} failed to load: {}", flow_id, err);
                self.error = Some(err.to_string());
                self.stage = Stage::Failed;
            }
        }
        FlowLoadOutcome::Applied(self.stage)
    }

    // ============================================================================
    // Checklist mutations
    // ============================================================================

    /// Flips completion of `step_id` and returns whether it is now completed.
    ///
    /// The id is not checked against the loaded flow so toggles work while the
    /// flow is still resolving.
    pub fn toggle_step_completion(&mut self, step_id: &str) -> Result<bool> {
        self.mutate(|record| record.completed_step_ids.toggle(step_id))
    }

    /// Flips expansion of `step_id` and returns whether it is now expanded.
    pub fn toggle_step_expansion(&mut self, step_id: &str) -> Result<bool> {
        self.mutate(|record| record.expanded_step_ids.toggle(step_id))
    }

    /// Flips the collected status of a document and returns the new status.
    pub fn toggle_document(&mut self, name: &str) -> Result<bool> {
        self.mutate(|record| record.documents.toggle(name))
    }

    /// Clears completed steps and documents but keeps the flow selected.
    pub fn clear_progress(&mut self) -> Result<()> {
        self.mutate(|record| {
            record.completed_step_ids.clear();
            record.documents.clear();
        })
    }

    fn mutate<T>(&mut self, apply: impl FnOnce(&mut SessionRecord) -> T) -> Result<T> {
        if self.record.flow_id.is_none() {
            return Err(WaypointError::NoFlowSelected);
        }
        self.stage = self.next_stage(SessionEvent::ProgressChanged)?;
        let result = apply(&mut self.record);
        self.persist();
        Ok(result)
    }

    /// Snapshot of the current progress for export.
    pub fn export_progress(&self) -> Result<ProgressExport> {
        let flow_id = self
            .record
            .flow_id
            .clone()
            .ok_or(WaypointError::NoFlowSelected)?;
        Ok(ProgressExport {
            flow_id,
            completed: self
                .record
                .completed_step_ids
                .iter()
                .map(str::to_string)
                .collect(),
            documents: self.record.documents.entries().clone(),
            exported_at: Utc::now(),
        })
    }

    // ============================================================================
    // Reset
    // ============================================================================

    /// Clears the stored record and all in-memory progress, back to `Intake`.
    ///
    /// Confirmation is the caller's responsibility.
    pub fn reset(&mut self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!("[SessionController] Failed to clear stored session: {}", err);
        }
        self.stage = Stage::Intake;
        self.record = SessionRecord::default();
        self.flow = None;
        self.error = None;
        self.storage_warning = None;
        tracing::info!("[SessionController] Session reset");
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn next_stage(&self, event: SessionEvent) -> Result<Stage> {
        self.stage
            .transition(event)
            .ok_or_else(|| WaypointError::invalid_transition(self.stage, event))
    }

    /// Writes the record through to the store.
    ///
    /// Failures are kept as a warning; the in-memory state stays as is.
    fn persist(&mut self) {
        if self.record.flow_id.is_none() {
            return;
        }
        self.record.stage = self.stage.persisted();
        self.record.schema_version = CURRENT_SCHEMA_VERSION;
        match self.store.save(&mut self.record) {
            Ok(()) => self.storage_warning = None,
            Err(err) => {
                tracing::warn!(
                    "[SessionController] Progress kept in memory only, save failed: {}",
                    err
                );
                self.storage_warning = Some(err);
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
