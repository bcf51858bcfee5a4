//! Pipeline state: stored results, statuses, trigger flags and run generations

use super::stage::{Stage, StageStatus};
use serde::Serialize;
use serde_json::Value;

/// Why a trigger activation did not start a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Requirements text was blank
    EmptyInput,
    /// The upstream stage has no successful result
    MissingPrerequisite,
    /// The stage's own call is still in flight
    AlreadyRunning,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::EmptyInput => "input text is empty",
            SkipReason::MissingPrerequisite => "upstream stage has not succeeded",
            SkipReason::AlreadyRunning => "stage is already running",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default)]
struct StageSlot {
    status: StageStatus,
    result: Option<Value>,
    enabled: bool,
    generation: u64,
}

/// Ticket for an in-flight run, checked again when the response arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    pub stage: Stage,
    pub generation: u64,
}

/// Point-in-time copy of one stage slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSnapshot {
    pub stage: Stage,
    pub status: StageStatus,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// The controller's sole mutable entity.
///
/// Results for a stage are only ever written by [`PipelineState::commit_success`]
/// with a ticket from the matching [`PipelineState::begin`]; starting any stage
/// clears its own result and everything downstream.
#[derive(Debug, Clone)]
pub struct PipelineState {
    slots: [StageSlot; 3],
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    pub fn new() -> Self {
        let mut slots: [StageSlot; 3] = Default::default();
        slots[Stage::Requirements.index()].enabled = true;
        Self { slots }
    }

    fn slot(&self, stage: Stage) -> &StageSlot {
        &self.slots[stage.index()]
    }

    fn slot_mut(&mut self, stage: Stage) -> &mut StageSlot {
        &mut self.slots[stage.index()]
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        self.slot(stage).status
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.slot(stage).enabled
    }

    pub fn result(&self, stage: Stage) -> Option<&Value> {
        self.slot(stage).result.as_ref()
    }

    pub fn requirements_result(&self) -> Option<&Value> {
        self.result(Stage::Requirements)
    }

    pub fn impact_result(&self) -> Option<&Value> {
        self.result(Stage::Impact)
    }

    pub fn code_result(&self) -> Option<&Value> {
        self.result(Stage::Code)
    }

    /// Returns the payload a run of `stage` would send, or why it cannot start.
    ///
    /// Stage 1 has no stored input; callers supply the text payload themselves.
    pub fn check_invokable(&self, stage: Stage) -> Result<Option<Value>, SkipReason> {
        if self.status(stage).is_running() {
            return Err(SkipReason::AlreadyRunning);
        }

        match stage.upstream() {
            None => Ok(None),
            Some(upstream) => {
                let prerequisite = self.slot(upstream);
                match (&prerequisite.result, prerequisite.status) {
                    (Some(value), StageStatus::Succeeded) => Ok(Some(value.clone())),
                    _ => Err(SkipReason::MissingPrerequisite),
                }
            }
        }
    }

    /// Marks `stage` running and invalidates every downstream slot.
    pub fn begin(&mut self, stage: Stage) -> RunTicket {
        let slot = self.slot_mut(stage);
        slot.status = StageStatus::Running;
        slot.result = None;
        slot.enabled = false;
        slot.generation += 1;
        let generation = slot.generation;

        for later in stage.downstream() {
            let slot = self.slot_mut(later);
            slot.status = StageStatus::Idle;
            slot.result = None;
            slot.enabled = false;
            slot.generation += 1;
        }

        RunTicket { stage, generation }
    }

    /// Whether a response for `ticket` may still be committed
    pub fn is_current(&self, ticket: RunTicket) -> bool {
        self.slot(ticket.stage).generation == ticket.generation
    }

    /// Stores a successful result and unlocks the next stage.
    ///
    /// Returns `false` without touching state if the ticket was superseded.
    pub fn commit_success(&mut self, ticket: RunTicket, value: Value) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        let slot = self.slot_mut(ticket.stage);
        slot.status = StageStatus::Succeeded;
        slot.result = Some(value);
        slot.enabled = true;

        if let Some(next) = ticket.stage.next() {
            self.slot_mut(next).enabled = true;
        }
        true
    }

    /// Records a failed run. Downstream stays disabled.
    pub fn commit_failure(&mut self, ticket: RunTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        let slot = self.slot_mut(ticket.stage);
        slot.status = StageStatus::Failed;
        slot.result = None;
        slot.enabled = true;
        true
    }

    pub fn snapshot(&self) -> Vec<StageSnapshot> {
        Stage::ALL
            .iter()
            .map(|&stage| {
                let slot = self.slot(stage);
                StageSnapshot {
                    stage,
                    status: slot.status,
                    enabled: slot.enabled,
                    result: slot.result.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn succeed(state: &mut PipelineState, stage: Stage, value: Value) {
        let ticket = state.begin(stage);
        assert!(state.commit_success(ticket, value));
    }

    #[test]
    fn test_initial_state() {
        let state = PipelineState::new();
        assert!(state.is_enabled(Stage::Requirements));
        assert!(!state.is_enabled(Stage::Impact));
        assert!(!state.is_enabled(Stage::Code));
        for stage in Stage::ALL {
            assert_eq!(state.status(stage), StageStatus::Idle);
            assert!(state.result(stage).is_none());
        }
    }

    #[test]
    fn test_gating_requires_upstream_success() {
        let mut state = PipelineState::new();
        assert_eq!(
            state.check_invokable(Stage::Impact),
            Err(SkipReason::MissingPrerequisite)
        );

        succeed(&mut state, Stage::Requirements, json!({"id": 1}));
        assert_eq!(
            state.check_invokable(Stage::Impact),
            Ok(Some(json!({"id": 1})))
        );
        assert_eq!(
            state.check_invokable(Stage::Code),
            Err(SkipReason::MissingPrerequisite)
        );
    }

    #[test]
    fn test_running_stage_is_not_reentrant() {
        let mut state = PipelineState::new();
        state.begin(Stage::Requirements);
        assert_eq!(
            state.check_invokable(Stage::Requirements),
            Err(SkipReason::AlreadyRunning)
        );
        assert!(!state.is_enabled(Stage::Requirements));
    }

    #[test]
    fn test_begin_invalidates_downstream() {
        let mut state = PipelineState::new();
        succeed(&mut state, Stage::Requirements, json!("r"));
        succeed(&mut state, Stage::Impact, json!("i"));
        succeed(&mut state, Stage::Code, json!("c"));

        state.begin(Stage::Requirements);

        assert!(state.requirements_result().is_none());
        assert!(state.impact_result().is_none());
        assert!(state.code_result().is_none());
        assert_eq!(state.status(Stage::Impact), StageStatus::Idle);
        assert_eq!(state.status(Stage::Code), StageStatus::Idle);
        assert!(!state.is_enabled(Stage::Impact));
        assert!(!state.is_enabled(Stage::Code));
    }

    #[test]
    fn test_failure_keeps_downstream_locked() {
        let mut state = PipelineState::new();
        succeed(&mut state, Stage::Requirements, json!("r"));

        let ticket = state.begin(Stage::Impact);
        assert!(state.commit_failure(ticket));

        assert_eq!(state.status(Stage::Impact), StageStatus::Failed);
        assert!(state.impact_result().is_none());
        assert!(state.is_enabled(Stage::Impact));
        assert!(!state.is_enabled(Stage::Code));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut state = PipelineState::new();
        succeed(&mut state, Stage::Requirements, json!("r1"));
        let impact_ticket = state.begin(Stage::Impact);

        // Upstream re-run while the impact call is still in flight
        state.begin(Stage::Requirements);

        assert!(!state.commit_success(impact_ticket, json!("late")));
        assert!(state.impact_result().is_none());
        assert_eq!(state.status(Stage::Impact), StageStatus::Idle);
        assert!(!state.commit_failure(impact_ticket));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = PipelineState::new();
        succeed(&mut state, Stage::Requirements, json!({"k": "v"}));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].result, Some(json!({"k": "v"})));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json[0]["status"], "succeeded");
        assert!(json[1].get("result").is_none());
    }
}
