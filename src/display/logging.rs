//! Logging-based display surface

use super::DisplaySurface;
use crate::pipeline::{Renderable, Stage, StageStatus};
use tracing::{debug, info, warn};

/// Surface that reports every update through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDisplay;

impl DisplaySurface for LoggingDisplay {
    fn set_status(&self, stage: Stage, status: StageStatus, text: &str) {
        match status {
            StageStatus::Failed => warn!(stage = %stage, status = %status, "{}", text),
            StageStatus::Idle => debug!(stage = %stage, status = %status, "{}", text),
            _ => info!(stage = %stage, status = %status, "{}", text),
        }
    }

    fn set_output(&self, stage: Stage, output: &Renderable) {
        match output {
            Renderable::Error(reason) => warn!(stage = %stage, error = %reason, "Stage output"),
            Renderable::Files(blocks) => {
                debug!(stage = %stage, files = blocks.len(), "Stage output")
            }
            other => debug!(stage = %stage, chars = other.to_string().len(), "Stage output"),
        }
    }

    fn set_enabled(&self, stage: Stage, enabled: bool) {
        debug!(stage = %stage, enabled, "Trigger state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_all_updates() {
        let display = LoggingDisplay;

        for status in [
            StageStatus::Idle,
            StageStatus::Running,
            StageStatus::Succeeded,
            StageStatus::Failed,
        ] {
            display.set_status(Stage::Impact, status, status.label(Stage::Impact));
        }

        display.set_output(Stage::Requirements, &Renderable::Json("{}".to_string()));
        display.set_output(Stage::Code, &Renderable::Files(vec![]));
        display.set_output(Stage::Code, &Renderable::Error("boom".to_string()));
        display.set_enabled(Stage::Code, true);
    }
}
