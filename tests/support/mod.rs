#![allow(dead_code)]

use serde_json::{json, Value};
use stagegate::pipeline::Renderable;
use stagegate::service::MockStageService;
use stagegate::{DisplaySurface, PipelineController, Stage, StageStatus, Trigger};
use std::sync::{Arc, Mutex};

/// One call the controller made on the display
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Status(Stage, StageStatus, String),
    Output(Stage, Renderable),
    Enabled(Stage, bool),
}

/// Display surface that keeps every event for later assertions
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn last_status(&self, stage: Stage) -> Option<(StageStatus, String)> {
        self.events().into_iter().rev().find_map(|event| match event {
            DisplayEvent::Status(s, status, text) if s == stage => Some((status, text)),
            _ => None,
        })
    }

    pub fn last_output(&self, stage: Stage) -> Option<Renderable> {
        self.events().into_iter().rev().find_map(|event| match event {
            DisplayEvent::Output(s, output) if s == stage => Some(output),
            _ => None,
        })
    }

    pub fn last_enabled(&self, stage: Stage) -> Option<bool> {
        self.events().into_iter().rev().find_map(|event| match event {
            DisplayEvent::Enabled(s, enabled) if s == stage => Some(enabled),
            _ => None,
        })
    }
}

impl DisplaySurface for RecordingDisplay {
    fn set_status(&self, stage: Stage, status: StageStatus, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(DisplayEvent::Status(stage, status, text.to_string()));
    }

    fn set_output(&self, stage: Stage, output: &Renderable) {
        self.events
            .lock()
            .unwrap()
            .push(DisplayEvent::Output(stage, output.clone()));
    }

    fn set_enabled(&self, stage: Stage, enabled: bool) {
        self.events
            .lock()
            .unwrap()
            .push(DisplayEvent::Enabled(stage, enabled));
    }
}

pub type TestController = PipelineController<MockStageService, RecordingDisplay>;

pub fn controller() -> Arc<TestController> {
    let controller = Arc::new(PipelineController::new(
        MockStageService::new(),
        RecordingDisplay::default(),
    ));
    controller.initialize();
    controller
}

pub fn trigger_for(stage: Stage) -> Trigger {
    match stage {
        Stage::Requirements => Trigger::Requirements("Users can log in".to_string()),
        Stage::Impact => Trigger::Impact,
        Stage::Code => Trigger::Code,
    }
}

pub fn requirements_value() -> Value {
    json!({"id": "R1", "requirements": ["login"]})
}

pub fn impact_value() -> Value {
    json!({"id": "I1", "affected": ["auth"]})
}

pub fn code_value() -> Value {
    json!({
        "files": [{"file_name": "a.py", "file_type": "python", "file_content": "print(1)"}]
    })
}

/// Drives all three stages to success with the canned values above.
pub async fn run_full_chain(controller: &TestController) {
    controller
        .service()
        .push_ok(Stage::Requirements, requirements_value());
    controller.service().push_ok(Stage::Impact, impact_value());
    controller.service().push_ok(Stage::Code, code_value());

    for stage in Stage::ALL {
        let outcome = controller.trigger(trigger_for(stage)).await;
        assert!(outcome.is_success(), "{} did not succeed: {:?}", stage, outcome);
    }
}
