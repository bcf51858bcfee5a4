//! Terminal trigger surface
//!
//! Each line read from the input is one trigger activation or query. Stage
//! triggers are spawned onto the runtime so the prompt keeps reading while a
//! call is in flight; results are painted by the controller's display.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::display::DisplaySurface;
use crate::pipeline::{render_result, PipelineController, Stage, StageOutcome, StageStatus, Trigger};
use crate::service::RemoteStageService;

pub const HELP: &str = "\
Commands:
  analyze <text>   analyze free-text requirements
  analyze @<file>  analyze requirements read from a file
  impact           assess impact of the current requirements
  code             generate code from the current impact assessment
  status           show every stage's status
  show <stage>     print a stage's current result (requirements, impact, code)
  help             show this help
  quit             wait for running stages and exit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Analyze(String),
    AnalyzeFile(PathBuf),
    Impact,
    Code,
    Status,
    Show(Stage),
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Empty);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "analyze" | "a" => match rest.strip_prefix('@') {
            Some(path) if !path.trim().is_empty() => {
                Ok(ReplCommand::AnalyzeFile(PathBuf::from(path.trim())))
            }
            _ => Ok(ReplCommand::Analyze(rest.to_string())),
        },
        "impact" | "i" => Ok(ReplCommand::Impact),
        "code" | "c" => Ok(ReplCommand::Code),
        "status" | "s" => Ok(ReplCommand::Status),
        "show" => {
            if rest.is_empty() {
                return Err("Usage: show <requirements|impact|code>".to_string());
            }
            rest.parse::<Stage>().map(ReplCommand::Show)
        }
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command: {}. Type `help` for commands.", other)),
    }
}

/// Reads commands until `quit` or end of input, then waits for in-flight stages.
pub async fn run_session<S, D, R, W>(
    controller: Arc<PipelineController<S, D>>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    S: RemoteStageService + 'static,
    D: DisplaySurface + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut in_flight: Vec<JoinHandle<StageOutcome>> = Vec::new();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read command")?
    {
        in_flight.retain(|handle| !handle.is_finished());

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{}", message)?;
                continue;
            }
        };
        debug!(?command, "Command received");

        let trigger = match command {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            ReplCommand::Status => {
                write_status(&controller, out)?;
                continue;
            }
            ReplCommand::Show(stage) => {
                match controller.result(stage) {
                    Some(value) => writeln!(out, "{}", render_result(stage, &value))?,
                    None => writeln!(out, "{} has no result yet", stage.title())?,
                }
                continue;
            }
            ReplCommand::Analyze(text) => Trigger::Requirements(text),
            ReplCommand::AnalyzeFile(path) => match tokio::fs::read_to_string(&path).await {
                Ok(text) => Trigger::Requirements(text),
                Err(e) => {
                    writeln!(out, "Cannot read {}: {}", path.display(), e)?;
                    continue;
                }
            },
            ReplCommand::Impact => Trigger::Impact,
            ReplCommand::Code => Trigger::Code,
        };

        let stage = trigger.stage();
        if !controller.is_enabled(stage) {
            if controller.status(stage) == StageStatus::Running {
                writeln!(out, "{} is already running", stage.title())?;
            } else {
                writeln!(out, "{} is not available yet", stage.title())?;
            }
            continue;
        }

        in_flight.push(controller.spawn(trigger));
    }

    for handle in in_flight {
        if let Err(e) = handle.await {
            writeln!(out, "Stage task ended abnormally: {}", e)?;
        }
    }

    Ok(())
}

fn write_status<S, D, W>(controller: &PipelineController<S, D>, out: &mut W) -> Result<()>
where
    S: RemoteStageService,
    D: DisplaySurface,
    W: Write,
{
    for snapshot in controller.snapshot() {
        writeln!(
            out,
            "  {:<22} {:<20} {}",
            snapshot.stage.title(),
            snapshot.status.label(snapshot.stage),
            if snapshot.enabled { "ready" } else { "locked" }
        )?;
    }
    Ok(())
}
