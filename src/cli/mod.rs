pub mod commands;
pub mod handlers;
pub mod interactive;
pub mod output;

pub use commands::{CliArgs, Commands, HealthArgs, InteractiveArgs, RunArgs};
pub use output::{OutputFormat, OutputFormatter};
