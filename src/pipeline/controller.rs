//! Pipeline controller: stage sequencing, gating, invalidation and error capture
//!
//! Every trigger activation goes through the same protocol:
//!
//! 1. Under the state lock, check gating and mark the stage running. All
//!    downstream stages are cleared and disabled before the remote call
//!    starts, and the display reflects this immediately.
//! 2. Call the remote stage service without holding the lock.
//! 3. Under the lock again, commit the result (or the failure) only if no
//!    newer run has invalidated the slot in the meantime.
//!
//! Failures are rendered on the failing stage and returned as
//! [`StageOutcome::Failed`]; they never escape as errors.

use super::render::{render_result, Renderable};
use super::stage::{Stage, StageStatus};
use super::state::{PipelineState, RunTicket, SkipReason, StageSnapshot};
use crate::display::DisplaySurface;
use crate::service::{RemoteStageService, RequirementsRequest};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A user activation of one stage's trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Analyze the given free text
    Requirements(String),
    /// Assess impact of the stored requirements
    Impact,
    /// Generate code from the stored impact assessment
    Code,
}

impl Trigger {
    pub fn stage(&self) -> Stage {
        match self {
            Trigger::Requirements(_) => Stage::Requirements,
            Trigger::Impact => Stage::Impact,
            Trigger::Code => Stage::Code,
        }
    }
}

/// How one trigger activation ended
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// The result was stored and the next stage unlocked
    Succeeded(Value),
    /// The remote call failed; the reason was rendered on the stage
    Failed(String),
    /// Nothing happened: no status change, no remote call
    Skipped(SkipReason),
    /// An upstream re-run invalidated this run before its response arrived
    Superseded,
}

impl StageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Succeeded(_))
    }
}

/// Owns [`PipelineState`] and drives the display and remote service.
pub struct PipelineController<S, D> {
    service: S,
    display: D,
    state: Mutex<PipelineState>,
}

impl<S: RemoteStageService, D: DisplaySurface> PipelineController<S, D> {
    pub fn new(service: S, display: D) -> Self {
        Self {
            service,
            display,
            state: Mutex::new(PipelineState::new()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Paints the whole surface from the current state
    pub fn initialize(&self) {
        let state = self.lock();
        for stage in Stage::ALL {
            let status = state.status(stage);
            self.display.set_status(stage, status, status.label(stage));
            let output = match state.result(stage) {
                Some(value) => render_result(stage, value),
                None => Renderable::Placeholder(stage.waiting_placeholder().to_string()),
            };
            self.display.set_output(stage, &output);
            self.display.set_enabled(stage, state.is_enabled(stage));
        }
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        self.lock().status(stage)
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.lock().is_enabled(stage)
    }

    pub fn result(&self, stage: Stage) -> Option<Value> {
        self.lock().result(stage).cloned()
    }

    pub fn snapshot(&self) -> Vec<StageSnapshot> {
        self.lock().snapshot()
    }

    /// Runs the requirements stage on `text`. Blank text is a silent no-op.
    pub async fn analyze_requirements(&self, text: &str) -> StageOutcome {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring requirements trigger with empty input");
            return StageOutcome::Skipped(SkipReason::EmptyInput);
        }

        let payload = match serde_json::to_value(RequirementsRequest::new(text)) {
            Ok(payload) => payload,
            Err(e) => return StageOutcome::Failed(e.to_string()),
        };
        self.run_stage(Stage::Requirements, Some(payload)).await
    }

    /// Runs the impact stage on the stored requirements result
    pub async fn assess_impact(&self) -> StageOutcome {
        self.run_stage(Stage::Impact, None).await
    }

    /// Runs the code stage on the stored impact result
    pub async fn generate_code(&self) -> StageOutcome {
        self.run_stage(Stage::Code, None).await
    }

    pub async fn trigger(&self, trigger: Trigger) -> StageOutcome {
        match trigger {
            Trigger::Requirements(text) => self.analyze_requirements(&text).await,
            Trigger::Impact => self.assess_impact().await,
            Trigger::Code => self.generate_code().await,
        }
    }

    /// Schedules one stage-execution task without waiting for it
    pub fn spawn(self: &Arc<Self>, trigger: Trigger) -> JoinHandle<StageOutcome>
    where
        S: 'static,
        D: 'static,
    {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.trigger(trigger).await })
    }

    async fn run_stage(&self, stage: Stage, text_payload: Option<Value>) -> StageOutcome {
        let (ticket, payload) = match self.begin(stage, text_payload) {
            Ok(started) => started,
            Err(reason) => {
                debug!(stage = %stage, reason = %reason, "Trigger ignored");
                return StageOutcome::Skipped(reason);
            }
        };

        info!(stage = %stage, generation = ticket.generation, "Stage started");
        let start = Instant::now();
        let response = self.service.call(stage, &payload).await;
        let elapsed_ms = start.elapsed().as_millis();

        match response {
            Ok(value) => {
                if self.finish_success(ticket, value.clone()) {
                    info!(stage = %stage, elapsed_ms, "Stage succeeded");
                    StageOutcome::Succeeded(value)
                } else {
                    debug!(stage = %stage, elapsed_ms, "Discarding response of superseded run");
                    StageOutcome::Superseded
                }
            }
            Err(error) => {
                let reason = error.to_string();
                if self.finish_failure(ticket, &reason) {
                    warn!(stage = %stage, elapsed_ms, error = %reason, "Stage failed");
                    StageOutcome::Failed(reason)
                } else {
                    debug!(stage = %stage, error = %reason, "Discarding failure of superseded run");
                    StageOutcome::Superseded
                }
            }
        }
    }

    fn begin(
        &self,
        stage: Stage,
        text_payload: Option<Value>,
    ) -> Result<(RunTicket, Value), SkipReason> {
        let mut state = self.lock();

        let payload = match (state.check_invokable(stage)?, text_payload) {
            (Some(upstream), _) => upstream,
            (None, Some(text)) => text,
            (None, None) => return Err(SkipReason::EmptyInput),
        };

        let ticket = state.begin(stage);

        self.display.set_status(
            stage,
            StageStatus::Running,
            StageStatus::Running.label(stage),
        );
        self.display.set_output(
            stage,
            &Renderable::Placeholder(stage.processing_placeholder().to_string()),
        );
        self.display.set_enabled(stage, false);

        for later in stage.downstream() {
            self.display
                .set_status(later, StageStatus::Idle, StageStatus::Idle.label(later));
            self.display.set_output(
                later,
                &Renderable::Placeholder(later.waiting_placeholder().to_string()),
            );
            self.display.set_enabled(later, false);
        }

        Ok((ticket, payload))
    }

    fn finish_success(&self, ticket: RunTicket, value: Value) -> bool {
        let stage = ticket.stage;
        let output = render_result(stage, &value);

        let mut state = self.lock();
        if !state.commit_success(ticket, value) {
            return false;
        }

        self.display.set_output(stage, &output);
        self.display.set_status(
            stage,
            StageStatus::Succeeded,
            StageStatus::Succeeded.label(stage),
        );
        self.display.set_enabled(stage, true);
        if let Some(next) = stage.next() {
            self.display.set_enabled(next, true);
        }
        true
    }

    fn finish_failure(&self, ticket: RunTicket, reason: &str) -> bool {
        let stage = ticket.stage;

        let mut state = self.lock();
        if !state.commit_failure(ticket) {
            return false;
        }

        self.display
            .set_output(stage, &Renderable::Error(reason.to_string()));
        self.display
            .set_status(stage, StageStatus::Failed, StageStatus::Failed.label(stage));
        self.display.set_enabled(stage, true);
        true
    }
}

impl<S, D> std::fmt::Debug for PipelineController<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("PipelineController")
            .field("state", &*state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::NoOpDisplay;
    use crate::service::{MockStageService, ServiceError};
    use serde_json::json;

    fn controller() -> PipelineController<MockStageService, NoOpDisplay> {
        PipelineController::new(MockStageService::new(), NoOpDisplay)
    }

    #[tokio::test]
    async fn test_empty_input_is_noop() {
        let controller = controller();

        for text in ["", "   ", "\n\t"] {
            let outcome = controller.analyze_requirements(text).await;
            assert_eq!(outcome, StageOutcome::Skipped(SkipReason::EmptyInput));
        }

        assert_eq!(controller.service().call_count(), 0);
        assert_eq!(controller.status(Stage::Requirements), StageStatus::Idle);
    }

    #[tokio::test]
    async fn test_text_is_trimmed_into_payload() {
        let controller = controller();
        controller
            .service()
            .push_ok(Stage::Requirements, json!({"ok": true}));

        controller.analyze_requirements("  Users can log in \n").await;

        assert_eq!(
            controller.service().calls_for(Stage::Requirements),
            vec![json!({"text": "Users can log in"})]
        );
    }

    #[tokio::test]
    async fn test_missing_prerequisite_is_noop() {
        let controller = controller();

        assert_eq!(
            controller.assess_impact().await,
            StageOutcome::Skipped(SkipReason::MissingPrerequisite)
        );
        assert_eq!(
            controller.generate_code().await,
            StageOutcome::Skipped(SkipReason::MissingPrerequisite)
        );
        assert_eq!(controller.service().call_count(), 0);
    }

    #[tokio::test]
    async fn test_full_chain_round_trip() {
        let controller = controller();
        let r1 = json!({"business_objective": "Login", "functional_requirements": ["FR-1"]});
        let i1 = json!({"overall_risk": "Low", "affected_components": []});
        let c1 = json!({"files": [], "summary": "nothing"});

        controller.service().push_ok(Stage::Requirements, r1.clone());
        controller.service().push_ok(Stage::Impact, i1.clone());
        controller.service().push_ok(Stage::Code, c1.clone());

        assert_eq!(
            controller.trigger(Trigger::Requirements("Users can log in".into())).await,
            StageOutcome::Succeeded(r1.clone())
        );
        assert_eq!(
            controller.trigger(Trigger::Impact).await,
            StageOutcome::Succeeded(i1.clone())
        );
        assert_eq!(
            controller.trigger(Trigger::Code).await,
            StageOutcome::Succeeded(c1.clone())
        );

        assert_eq!(controller.service().calls_for(Stage::Impact), vec![r1]);
        assert_eq!(controller.service().calls_for(Stage::Code), vec![i1]);
        assert_eq!(controller.result(Stage::Code), Some(c1));
    }

    #[tokio::test]
    async fn test_failure_outcome_carries_reason() {
        let controller = controller();
        controller.service().push_err(
            Stage::Requirements,
            ServiceError::Network {
                message: "connection refused".to_string(),
            },
        );

        let outcome = controller.analyze_requirements("text").await;

        assert_eq!(
            outcome,
            StageOutcome::Failed("Network error: connection refused".to_string())
        );
        assert_eq!(controller.status(Stage::Requirements), StageStatus::Failed);
        assert!(controller.is_enabled(Stage::Requirements));
        assert!(!controller.is_enabled(Stage::Impact));
    }

    #[tokio::test]
    async fn test_spawned_trigger_runs_to_completion() {
        let controller = Arc::new(controller());
        controller
            .service()
            .push_ok(Stage::Requirements, json!("r1"));

        let handle = controller.spawn(Trigger::Requirements("Users can log in".into()));
        let outcome = handle.await.unwrap();

        assert!(outcome.is_success());
        assert!(controller.is_enabled(Stage::Impact));
    }

    #[test]
    fn test_trigger_stage() {
        assert_eq!(Trigger::Requirements(String::new()).stage(), Stage::Requirements);
        assert_eq!(Trigger::Impact.stage(), Stage::Impact);
        assert_eq!(Trigger::Code.stage(), Stage::Code);
    }
}
