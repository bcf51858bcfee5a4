//! Subcommand handlers. Each returns the process exit code.

use anyhow::{bail, Context, Result};
use std::fs;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::commands::{HealthArgs, InteractiveArgs, RunArgs};
use super::interactive::{run_session, HELP};
use super::output::{HealthReport, OutputFormatter, RunReport};
use crate::config::StagegateConfig;
use crate::display::{DisplaySurface, FanoutDisplay, LoggingDisplay, TerminalDisplay};
use crate::pipeline::{PipelineController, Stage, StageOutcome, Trigger};
use crate::service::{HttpStageService, RemoteStageService};

/// Runs every stage in order, stopping at the first one that does not succeed.
pub async fn run_all_stages<S, D>(
    controller: &PipelineController<S, D>,
    text: &str,
) -> Vec<(Stage, StageOutcome)>
where
    S: RemoteStageService,
    D: DisplaySurface,
{
    let mut outcomes = Vec::new();

    for stage in Stage::ALL {
        let trigger = match stage {
            Stage::Requirements => Trigger::Requirements(text.to_string()),
            Stage::Impact => Trigger::Impact,
            Stage::Code => Trigger::Code,
        };

        let outcome = controller.trigger(trigger).await;
        let proceed = outcome.is_success();
        outcomes.push((stage, outcome));

        if !proceed {
            debug!(stage = %stage, "Stopping batch run");
            break;
        }
    }

    outcomes
}

pub async fn handle_run(args: &RunArgs, config: &StagegateConfig) -> i32 {
    match run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn run(args: &RunArgs, config: &StagegateConfig) -> Result<i32> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read requirements from {}", path.display()))?,
        (None, None) => bail!("Provide requirements with --text or --file"),
    };

    if text.trim().is_empty() {
        bail!("Requirements text is empty");
    }

    let service = HttpStageService::from_config(config)?;
    let controller = PipelineController::new(service, LoggingDisplay);

    info!(base_url = %config.base_url, chars = text.len(), "Starting batch run");
    let outcomes = run_all_stages(&controller, &text).await;

    let report = RunReport::new(config.base_url.clone(), outcomes);
    let formatted = OutputFormatter::new(args.format.into()).format_run(&report)?;

    match &args.output {
        Some(path) => fs::write(path, &formatted)
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => print!("{}", formatted),
    }

    Ok(if report.success { 0 } else { 1 })
}

pub async fn handle_health(args: &HealthArgs, config: &StagegateConfig) -> i32 {
    let service = match HttpStageService::from_config(config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let report = match service.health_check().await {
        Ok(healthy) => HealthReport {
            base_url: config.base_url.clone(),
            healthy,
            error: None,
        },
        Err(e) => HealthReport {
            base_url: config.base_url.clone(),
            healthy: false,
            error: Some(e.to_string()),
        },
    };

    match OutputFormatter::new(args.format.into()).format_health(&report) {
        Ok(formatted) => print!("{}", formatted),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    }

    if report.healthy {
        0
    } else {
        1
    }
}

pub async fn handle_interactive(args: &InteractiveArgs, config: &StagegateConfig) -> i32 {
    match interactive(args, config).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Interactive session failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn interactive(args: &InteractiveArgs, config: &StagegateConfig) -> Result<()> {
    let service = HttpStageService::from_config(config)?;
    let display = FanoutDisplay::new(TerminalDisplay::stdout(), LoggingDisplay);
    let controller = Arc::new(PipelineController::new(service, display));

    if atty::is(atty::Stream::Stdin) {
        println!("stagegate {} - stage service at {}", crate::VERSION, config.base_url);
        println!("{}", HELP);
    }
    controller.initialize();

    let mut pending = None;
    if let Some(text) = &args.text {
        pending = Some(controller.spawn(Trigger::Requirements(text.clone())));
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(controller, stdin, &mut stdout).await?;

    if let Some(handle) = pending {
        handle.await.context("Initial requirements task failed")?;
    }
    Ok(())
}
