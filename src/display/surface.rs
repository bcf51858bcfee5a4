//! Display surface trait

use crate::pipeline::{Renderable, Stage, StageStatus};
use std::sync::Arc;

/// Where the controller paints per-stage status, output and trigger state.
///
/// Calls arrive while the controller holds its state lock, so implementations
/// must not call back into the controller.
pub trait DisplaySurface: Send + Sync {
    /// Updates the status line of a stage
    fn set_status(&self, stage: Stage, status: StageStatus, text: &str);

    /// Replaces the output region of a stage
    fn set_output(&self, stage: Stage, output: &Renderable);

    /// Enables or disables the trigger of a stage
    fn set_enabled(&self, stage: Stage, enabled: bool);
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for Arc<T> {
    fn set_status(&self, stage: Stage, status: StageStatus, text: &str) {
        (**self).set_status(stage, status, text)
    }

    fn set_output(&self, stage: Stage, output: &Renderable) {
        (**self).set_output(stage, output)
    }

    fn set_enabled(&self, stage: Stage, enabled: bool) {
        (**self).set_enabled(stage, enabled)
    }
}

/// Surface that ignores every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDisplay;

impl DisplaySurface for NoOpDisplay {
    fn set_status(&self, _stage: Stage, _status: StageStatus, _text: &str) {}

    fn set_output(&self, _stage: Stage, _output: &Renderable) {}

    fn set_enabled(&self, _stage: Stage, _enabled: bool) {}
}

/// Forwards every update to two surfaces, first `A` then `B`
#[derive(Debug, Default, Clone)]
pub struct FanoutDisplay<A, B> {
    first: A,
    second: B,
}

impl<A, B> FanoutDisplay<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: DisplaySurface, B: DisplaySurface> DisplaySurface for FanoutDisplay<A, B> {
    fn set_status(&self, stage: Stage, status: StageStatus, text: &str) {
        self.first.set_status(stage, status, text);
        self.second.set_status(stage, status, text);
    }

    fn set_output(&self, stage: Stage, output: &Renderable) {
        self.first.set_output(stage, output);
        self.second.set_output(stage, output);
    }

    fn set_enabled(&self, stage: Stage, enabled: bool) {
        self.first.set_enabled(stage, enabled);
        self.second.set_enabled(stage, enabled);
    }
}
