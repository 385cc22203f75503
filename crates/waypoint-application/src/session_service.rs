use std::sync::Arc;
use tokio::sync::mpsc;
use waypoint_core::Result;
use waypoint_core::error::FetchError;
use waypoint_core::flow::{FlowCatalog, FlowPayload, FlowResolver, FlowSummary};
use waypoint_core::intake::{IntakeAnswers, IntakeRecord, Recommendation, Recommender};
use waypoint_core::session::{
    FlowLoadOutcome, FlowRequest, ProgressExport, SessionController, SessionStore, Stage,
};

/// Remote collaborators the session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn FlowResolver>,
    pub recommender: Arc<dyn Recommender>,
    pub catalog: Arc<dyn FlowCatalog>,
}

impl Collaborators {
    /// Uses one client for all three roles.
    pub fn from_client<C>(client: C) -> Self
    where
        C: FlowResolver + Recommender + FlowCatalog + 'static,
    {
        let client = Arc::new(client);
        Self {
            resolver: client.clone(),
            recommender: client.clone(),
            catalog: client,
        }
    }
}

/// A finished flow fetch, tagged with the id it was issued for.
struct FlowResolved {
    flow_id: String,
    result: std::result::Result<FlowPayload, FetchError>,
}

/// Drives a [`SessionController`] against the remote collaborators.
///
/// # Responsibilities
///
/// - Issuing the flow fetches the controller asks for on background tasks
/// - Feeding finished fetches back to the controller in arrival order
/// - Pass-through of user actions (intake, selection, toggles, reset)
///
/// # Concurrency
///
/// Fetches run concurrently and may finish in any order. Every result goes
/// through [`SessionController::on_flow_loaded`], which drops the ones that
/// belong to a superseded selection. Only the task owning the service ever
/// touches the controller, so no locking is needed.
///
/// Must be created inside a Tokio runtime.
pub struct SessionService {
    controller: SessionController,
    collaborators: Collaborators,
    resolved_tx: mpsc::UnboundedSender<FlowResolved>,
    resolved_rx: mpsc::UnboundedReceiver<FlowResolved>,
    /// Fetches issued but not yet handed to the controller
    in_flight: usize,
}

impl SessionService {
    /// Restores the session from `store` and issues the resume fetch, if any.
    pub fn start(store: Arc<dyn SessionStore>, collaborators: Collaborators) -> Self {
        let (controller, request) = SessionController::restore(store);
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();
        let mut service = Self {
            controller,
            collaborators,
            resolved_tx,
            resolved_rx,
            in_flight: 0,
        };
        if let Some(request) = request {
            service.dispatch(request);
        }
        service
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn stage(&self) -> Stage {
        self.controller.stage()
    }

    /// Number of fetches whose results have not been delivered yet.
    pub fn pending_fetches(&self) -> usize {
        self.in_flight
    }

    fn dispatch(&mut self, request: FlowRequest) {
        let resolver = self.collaborators.resolver.clone();
        let tx = self.resolved_tx.clone();
        self.in_flight += 1;
        tracing::debug!("[SessionService] Fetching flow {}", request.flow_id);

        tokio::spawn(async move {
            let result = resolver.fetch_flow(&request.flow_id).await;
            // The receiver lives as long as the service
            let _ = tx.send(FlowResolved {
                flow_id: request.flow_id,
                result,
            });
        });
    }

    /// Waits for the next fetch to finish and hands it to the controller.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<FlowLoadOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let resolved = self.resolved_rx.recv().await?;
        self.in_flight -= 1;
        let outcome = self
            .controller
            .on_flow_loaded(&resolved.flow_id, resolved.result);
        if outcome == FlowLoadOutcome::Discarded {
            tracing::debug!(
                "[SessionService] Dropped response for superseded flow {}",
                resolved.flow_id
            );
        }
        Some(outcome)
    }

    /// Processes fetch results until the session leaves `Resolving`.
    ///
    /// Results still in flight for superseded selections are left queued.
    pub async fn settle(&mut self) -> Stage {
        while self.controller.stage() == Stage::Resolving {
            if self.next_event().await.is_none() {
                tracing::warn!("[SessionService] Resolving with no fetch in flight");
                break;
            }
        }
        self.controller.stage()
    }

    // ============================================================================
    // Intake and selection
    // ============================================================================

    /// Asks the recommender for a flow matching `answers`.
    pub async fn recommend(&self, answers: &IntakeAnswers) -> Result<Recommendation> {
        if !answers.is_complete() {
            tracing::debug!("[SessionService] Requesting recommendation for partial answers");
        }
        Ok(self.collaborators.recommender.recommend(answers).await?)
    }

    /// Lists every flow the catalog offers.
    pub async fn list_flows(&self) -> Result<Vec<FlowSummary>> {
        Ok(self.collaborators.catalog.list_flows().await?)
    }

    pub fn complete_intake(&mut self, intake: IntakeRecord) -> Result<()> {
        if let Some(request) = self.controller.complete_intake(intake)? {
            self.dispatch(request);
        }
        Ok(())
    }

    pub fn browse_flows(&mut self) -> Result<()> {
        self.controller.browse_flows()
    }

    pub fn select_flow(&mut self, flow_id: impl Into<String>) -> Result<()> {
        let request = self.controller.select_flow(flow_id)?;
        self.dispatch(request);
        Ok(())
    }

    // ============================================================================
    // Checklist
    // ============================================================================

    pub fn toggle_step_completion(&mut self, step_id: &str) -> Result<bool> {
        self.controller.toggle_step_completion(step_id)
    }

    pub fn toggle_step_expansion(&mut self, step_id: &str) -> Result<bool> {
        self.controller.toggle_step_expansion(step_id)
    }

    pub fn toggle_document(&mut self, name: &str) -> Result<bool> {
        self.controller.toggle_document(name)
    }

    pub fn clear_progress(&mut self) -> Result<()> {
        self.controller.clear_progress()
    }

    pub fn export_progress(&self) -> Result<ProgressExport> {
        self.controller.export_progress()
    }

    /// Clears everything and returns to the intake.
    ///
    /// Fetches still in flight are delivered later and discarded.
    pub fn reset(&mut self) {
        self.controller.reset();
    }
}
