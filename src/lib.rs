//! stagegate - gated three-stage requirements pipeline
//!
//! This library drives free-text requirements through three dependent remote
//! stages: requirements analysis, impact assessment and code generation. A
//! stage only becomes invokable once the stage before it has succeeded, and
//! re-running a stage clears every result downstream of it.
//!
//! # Core Concepts
//!
//! - **Pipeline Controller**: owns the pipeline state and runs the stage
//!   execution protocol (gating, invalidation, error capture)
//! - **Remote Stage Service**: opaque call-and-result endpoint per stage
//! - **Display Surface**: receives per-stage status, output and trigger state
//!
//! # Example Usage
//!
//! ```no_run
//! use stagegate::{HttpStageService, LoggingDisplay, PipelineController, StageOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = HttpStageService::new("http://127.0.0.1:8000")?;
//! let controller = PipelineController::new(service, LoggingDisplay);
//!
//! if let StageOutcome::Succeeded(requirements) =
//!     controller.analyze_requirements("Users can log in").await
//! {
//!     println!("{}", requirements);
//!     controller.assess_impact().await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`pipeline`]: stage state machine, controller and result rendering
//! - [`service`]: remote stage service trait, HTTP client and mock
//! - [`display`]: display surfaces (terminal, logging, no-op)
//! - [`cli`]: command-line front-end

pub mod cli;
pub mod config;
pub mod display;
pub mod pipeline;
pub mod service;
pub mod util;

pub use config::{ConfigError, StagegateConfig};
pub use display::{DisplaySurface, FanoutDisplay, LoggingDisplay, NoOpDisplay, TerminalDisplay};
pub use pipeline::{
    PipelineController, PipelineState, Renderable, SkipReason, Stage, StageOutcome, StageStatus,
    Trigger,
};
pub use service::{HttpStageService, MockStageService, RemoteStageService, ServiceError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
