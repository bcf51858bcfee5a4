pub mod controller;
pub mod render;
pub mod stage;
pub mod state;

pub use controller::{PipelineController, StageOutcome, Trigger};
pub use render::{render_result, FileBlock, Renderable, NO_CODE_GENERATED};
pub use stage::{Stage, StageStatus};
pub use state::{PipelineState, RunTicket, SkipReason, StageSnapshot};
