use super::*;
use crate::error::StoreResult;
use crate::flow::{FlowInfo, Step};
use crate::intake::{Confidence, IntakeAnswers, Recommendation};
use crate::session::model::PersistedStage;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// Mock SessionStore backed by a single slot
#[derive(Default)]
struct MockSessionStore {
    record: Mutex<Option<SessionRecord>>,
    corrupt: AtomicBool,
    full: AtomicBool,
    saves: AtomicUsize,
}

impl MockSessionStore {
    fn with_record(record: SessionRecord) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap() = Some(record);
        store
    }

    fn stored(&self) -> Option<SessionRecord> {
        self.record.lock().unwrap().clone()
    }
}

impl SessionStore for MockSessionStore {
    fn load(&self) -> StoreResult<Option<SessionRecord>> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(StoreError::corrupt("unexpected token"));
        }
        Ok(self.stored())
    }

    fn save(&self, record: &mut SessionRecord) -> StoreResult<()> {
        if self.full.load(Ordering::SeqCst) {
            return Err(StoreError::quota_exceeded("session"));
        }
        record.saved_at = Some(Utc::now());
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.corrupt.store(false, Ordering::SeqCst);
        *self.record.lock().unwrap() = None;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.record.lock().unwrap().is_some() || self.corrupt.load(Ordering::SeqCst)
    }
}

fn payload(flow_id: &str, step_ids: &[&str]) -> FlowPayload {
    FlowPayload {
        flow: FlowInfo {
            flow_id: flow_id.to_string(),
            title: Some(format!("Flow {}", flow_id)),
            version: None,
            persona_id: None,
            country: None,
        },
        steps: step_ids
            .iter()
            .enumerate()
            .map(|(i, id)| Step {
                step_id: id.to_string(),
                order: i as u32 + 1,
                title: None,
                description: None,
                preconditions: Vec::new(),
                outputs: Vec::new(),
                official_links: Vec::new(),
                failure_modes: Vec::new(),
            })
            .collect(),
    }
}

fn recommendation(flow_id: &str) -> Recommendation {
    Recommendation {
        flow_id: flow_id.to_string(),
        title: "Recommended".to_string(),
        reason: None,
        confidence: Confidence::High,
        step_count: Some(3),
    }
}

fn fresh() -> (SessionController, Arc<MockSessionStore>) {
    let store = Arc::new(MockSessionStore::default());
    let (controller, request) = SessionController::restore(store.clone());
    assert!(request.is_none());
    (controller, store)
}

/// Controller with flow `flow_id` selected and loaded.
fn active(flow_id: &str, step_ids: &[&str]) -> (SessionController, Arc<MockSessionStore>) {
    let (mut controller, store) = fresh();
    controller.browse_flows().unwrap();
    controller.select_flow(flow_id).unwrap();
    let outcome = controller.on_flow_loaded(flow_id, Ok(payload(flow_id, step_ids)));
    assert_eq!(outcome, FlowLoadOutcome::Applied(Stage::Active));
    (controller, store)
}

#[test]
fn test_restore_without_record_starts_intake() {
    let (controller, store) = fresh();
    assert_eq!(controller.stage(), Stage::Intake);
    assert!(controller.flow_id().is_none());
    assert!(!store.exists());
}

#[test]
fn test_restore_with_record_resolves_saved_flow() {
    let mut record = SessionRecord::for_flow("sk_student");
    record.completed_step_ids.insert("s1");
    let store = Arc::new(MockSessionStore::with_record(record));

    let (controller, request) = SessionController::restore(store);

    assert_eq!(controller.stage(), Stage::Resolving);
    assert_eq!(
        request,
        Some(FlowRequest {
            flow_id: "sk_student".to_string()
        })
    );
    assert!(controller.completed_steps().contains("s1"));
}

#[test]
fn test_restore_record_without_flow_starts_intake() {
    let store = Arc::new(MockSessionStore::with_record(SessionRecord::default()));
    let (controller, request) = SessionController::restore(store);
    assert_eq!(controller.stage(), Stage::Intake);
    assert!(request.is_none());
}

#[test]
fn test_restore_corrupt_record_clears_and_starts_fresh() {
    let store = Arc::new(MockSessionStore::default());
    store.corrupt.store(true, Ordering::SeqCst);

    let (controller, request) = SessionController::restore(store.clone());

    assert_eq!(controller.stage(), Stage::Intake);
    assert!(request.is_none());
    assert!(!store.exists());
}

#[test]
fn test_accepted_intake_selects_recommended_flow() {
    let (mut controller, store) = fresh();
    let intake = IntakeRecord::accepted(IntakeAnswers::default(), recommendation("sk_employee"));

    let request = controller.complete_intake(intake).unwrap();

    assert_eq!(request.unwrap().flow_id, "sk_employee");
    assert_eq!(controller.stage(), Stage::Resolving);
    let stored = store.stored().unwrap();
    assert_eq!(stored.flow_id.as_deref(), Some("sk_employee"));
    assert_eq!(stored.stage, PersistedStage::Active);
    assert_eq!(stored.intake_answers.unwrap()["accepted"], true);
}

#[test]
fn test_declined_intake_moves_to_select_without_writing() {
    let (mut controller, store) = fresh();
    let intake =
        IntakeRecord::declined(IntakeAnswers::default(), Some(recommendation("sk_employee")));

    let request = controller.complete_intake(intake).unwrap();

    assert!(request.is_none());
    assert_eq!(controller.stage(), Stage::Select);
    assert!(controller.flow_id().is_none());
    assert!(!store.exists());
}

#[test]
fn test_declined_intake_is_kept_when_flow_selected() {
    let (mut controller, store) = fresh();
    controller
        .complete_intake(IntakeRecord::declined(IntakeAnswers::default(), None))
        .unwrap();
    controller.select_flow("sk_family").unwrap();

    let stored = store.stored().unwrap();
    assert_eq!(stored.intake_answers.unwrap()["accepted"], false);
}

#[test]
fn test_select_flow_requires_select_stage() {
    let (mut controller, _store) = fresh();
    let err = controller.select_flow("sk_family").unwrap_err();
    assert!(err.is_invalid_transition());
    assert_eq!(controller.stage(), Stage::Intake);
}

#[test]
fn test_flow_loaded_activates_checklist() {
    let (controller, _store) = active("sk_family", &["a", "b", "c", "d"]);
    assert_eq!(controller.stage(), Stage::Active);
    assert_eq!(controller.flow().unwrap().steps.len(), 4);
    assert_eq!(controller.completion_percentage(), 0);
}

#[test]
fn test_flow_failure_enters_failed_until_reset() {
    let (mut controller, _store) = fresh();
    controller.browse_flows().unwrap();
    controller.select_flow("missing").unwrap();

    let outcome = controller.on_flow_loaded("missing", Err(FetchError::not_found("missing")));

    assert_eq!(outcome, FlowLoadOutcome::Applied(Stage::Failed));
    assert!(controller.error().unwrap().contains("missing"));
    assert!(controller.toggle_step_completion("a").is_err());
    assert!(controller.select_flow("other").is_err());

    controller.reset();
    assert_eq!(controller.stage(), Stage::Intake);
    assert!(controller.error().is_none());
}

#[test]
fn test_stale_response_is_discarded() {
    let (mut controller, _store) = fresh();
    controller.browse_flows().unwrap();
    controller.select_flow("flow_a").unwrap();
    controller.select_flow("flow_b").unwrap();

    let stale = controller.on_flow_loaded("flow_a", Ok(payload("flow_a", &["a1", "a2"])));
    assert_eq!(stale, FlowLoadOutcome::Discarded);
    assert_eq!(controller.stage(), Stage::Resolving);
    assert!(controller.flow().is_none());

    let current = controller.on_flow_loaded("flow_b", Ok(payload("flow_b", &["b1"])));
    assert_eq!(current, FlowLoadOutcome::Applied(Stage::Active));
    assert_eq!(controller.flow().unwrap().flow_id(), "flow_b");
}

#[test]
fn test_late_response_after_reset_is_discarded() {
    let (mut controller, store) = fresh();
    controller.browse_flows().unwrap();
    controller.select_flow("flow_a").unwrap();
    controller.reset();

    let outcome = controller.on_flow_loaded("flow_a", Ok(payload("flow_a", &["a1"])));

    assert_eq!(outcome, FlowLoadOutcome::Discarded);
    assert_eq!(controller.stage(), Stage::Intake);
    assert!(!store.exists());
}

#[test]
fn test_toggle_writes_through() {
    let (mut controller, store) = active("sk_family", &["a", "b"]);

    assert!(controller.toggle_step_completion("a").unwrap());
    assert!(store.stored().unwrap().completed_step_ids.contains("a"));

    assert!(!controller.toggle_step_completion("a").unwrap());
    assert!(!store.stored().unwrap().completed_step_ids.contains("a"));
}

#[test]
fn test_toggles_allowed_while_resolving() {
    let (mut controller, store) = fresh();
    controller.browse_flows().unwrap();
    controller.select_flow("sk_family").unwrap();

    assert!(controller.toggle_step_expansion("a").unwrap());
    assert_eq!(controller.stage(), Stage::Resolving);
    assert!(store.stored().unwrap().expanded_step_ids.contains("a"));
}

#[test]
fn test_toggle_without_flow_is_rejected() {
    let (mut controller, _store) = fresh();
    assert!(matches!(
        controller.toggle_document("Passport"),
        Err(WaypointError::NoFlowSelected)
    ));
}

#[test]
fn test_reload_reconciles_unknown_steps() {
    let mut record = SessionRecord::for_flow("sk_family");
    record.completed_step_ids = ["a", "b", "c", "d"].into_iter().collect();
    record.expanded_step_ids = ["b", "x"].into_iter().collect();
    let store = Arc::new(MockSessionStore::with_record(record));
    let (mut controller, request) = SessionController::restore(store.clone());

    let flow_id = request.unwrap().flow_id;
    controller.on_flow_loaded(&flow_id, Ok(payload("sk_family", &["a", "x", "y"])));

    assert_eq!(controller.completed_steps().iter().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(controller.expanded_steps().iter().collect::<Vec<_>>(), vec!["x"]);
    assert_eq!(controller.completion_percentage(), 33);
    let stored = store.stored().unwrap();
    assert_eq!(stored.completed_step_ids.len(), 1);
}

#[test]
fn test_reload_without_unknown_steps_does_not_write() {
    let mut record = SessionRecord::for_flow("sk_family");
    record.completed_step_ids = ["a"].into_iter().collect();
    let store = Arc::new(MockSessionStore::with_record(record));
    let (mut controller, _request) = SessionController::restore(store.clone());

    controller.on_flow_loaded("sk_family", Ok(payload("sk_family", &["a", "b"])));

    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    assert_eq!(controller.completion_percentage(), 50);
}

#[test]
fn test_selecting_new_flow_resets_progress() {
    let mut record = SessionRecord::for_flow("old_flow");
    record.completed_step_ids.insert("a");
    record.documents.set("Passport", true);
    let store = Arc::new(MockSessionStore::with_record(record));
    let (mut controller, _request) = SessionController::restore(store.clone());

    controller.select_flow("new_flow").unwrap();

    assert!(controller.completed_steps().is_empty());
    assert_eq!(controller.documents().collected_count(), 0);
    assert_eq!(
        store.stored().unwrap().flow_id.as_deref(),
        Some("new_flow")
    );
}

#[test]
fn test_quota_failure_is_not_fatal() {
    let (mut controller, store) = active("sk_family", &["a", "b"]);
    store.full.store(true, Ordering::SeqCst);

    assert!(controller.toggle_step_completion("a").unwrap());
    assert!(controller.completed_steps().contains("a"));
    assert_eq!(controller.stage(), Stage::Active);
    assert!(controller.storage_warning().unwrap().is_quota_exceeded());
    assert!(!store.stored().unwrap().completed_step_ids.contains("a"));

    store.full.store(false, Ordering::SeqCst);
    controller.toggle_document("Passport").unwrap();
    assert!(controller.storage_warning().is_none());
    assert!(store.stored().unwrap().completed_step_ids.contains("a"));
}

#[test]
fn test_clear_progress_keeps_flow() {
    let (mut controller, store) = active("sk_family", &["a", "b"]);
    controller.toggle_step_completion("a").unwrap();
    controller.toggle_document("Passport").unwrap();

    controller.clear_progress().unwrap();

    assert_eq!(controller.stage(), Stage::Active);
    assert_eq!(controller.flow_id(), Some("sk_family"));
    let stored = store.stored().unwrap();
    assert!(stored.completed_step_ids.is_empty());
    assert_eq!(stored.documents.collected_count(), 0);
}

#[test]
fn test_export_progress() {
    let (mut controller, _store) = active("sk_family", &["a", "b", "c"]);
    controller.toggle_step_completion("c").unwrap();
    controller.toggle_step_completion("a").unwrap();
    controller.toggle_document("Passport").unwrap();

    let export = controller.export_progress().unwrap();

    assert_eq!(export.flow_id, "sk_family");
    assert_eq!(export.completed, vec!["a".to_string(), "c".to_string()]);
    assert_eq!(export.documents.get("Passport"), Some(&true));
    assert_eq!(controller.documents_collected(), 1);
}

#[test]
fn test_reset_clears_store() {
    let (mut controller, store) = active("sk_family", &["a"]);
    controller.toggle_step_completion("a").unwrap();
    assert!(store.exists());

    controller.reset();

    assert!(!store.exists());
    assert_eq!(controller.stage(), Stage::Intake);
    assert!(controller.flow_id().is_none());
    assert!(controller.completed_steps().is_empty());
    assert!(controller.flow().is_none());
}

#[test]
fn test_saved_record_round_trips_through_restore() {
    let (mut controller, store) = active("sk_family", &["a", "b"]);
    controller.toggle_step_completion("b").unwrap();
    controller.toggle_step_expansion("a").unwrap();

    let (restored, request) = SessionController::restore(store.clone());

    assert_eq!(request.unwrap().flow_id, "sk_family");
    assert!(restored.completed_steps().contains("b"));
    assert!(restored.expanded_steps().contains("a"));
    assert!(restored.record().saved_at.is_some());
}
