//! Plain-text display surface for terminals

use super::DisplaySurface;
use crate::pipeline::{Renderable, Stage, StageStatus};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

struct TerminalState<W> {
    writer: W,
    statuses: [StageStatus; 3],
    enabled: [bool; 3],
}

/// Writes status lines, rendered results and newly unlocked stages to a writer.
///
/// Placeholders are not echoed; the status line already says what is going on.
pub struct TerminalDisplay<W: Write + Send> {
    inner: Mutex<TerminalState<W>>,
}

impl TerminalDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(TerminalState {
                writer,
                statuses: [StageStatus::Idle; 3],
                enabled: [true, false, false],
            }),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }

    fn with_state(&self, f: impl FnOnce(&mut TerminalState<W>) -> io::Result<()>) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        // Write errors are ignored; the pipeline keeps running on a closed stdout
        let _ = f(&mut state).and_then(|_| state.writer.flush());
    }
}

impl<W: Write + Send> DisplaySurface for TerminalDisplay<W> {
    fn set_status(&self, stage: Stage, status: StageStatus, text: &str) {
        self.with_state(|state| {
            state.statuses[stage.index()] = status;
            writeln!(state.writer, "[{}] {}", stage, text)
        });
    }

    fn set_output(&self, stage: Stage, output: &Renderable) {
        if output.is_placeholder() {
            return;
        }
        self.with_state(|state| {
            writeln!(state.writer, "\u{2501}\u{2501} {} \u{2501}\u{2501}", stage.title())?;
            writeln!(state.writer, "{}", output.to_string().trim_end())
        });
    }

    fn set_enabled(&self, stage: Stage, enabled: bool) {
        self.with_state(|state| {
            let was_enabled = std::mem::replace(&mut state.enabled[stage.index()], enabled);
            if enabled && !was_enabled && state.statuses[stage.index()] == StageStatus::Idle {
                writeln!(
                    state.writer,
                    "\u{2192} {} is now available (type `{}`)",
                    stage.title(),
                    stage
                )?;
            }
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(display: TerminalDisplay<Vec<u8>>) -> String {
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_status_and_output() {
        let display = TerminalDisplay::new(Vec::new());
        display.set_status(Stage::Requirements, StageStatus::Running, "Analyzing...");
        display.set_output(
            Stage::Requirements,
            &Renderable::Placeholder("Processing...".to_string()),
        );
        display.set_output(Stage::Requirements, &Renderable::Json("{}".to_string()));

        let text = written(display);
        assert!(text.contains("[requirements] Analyzing..."));
        assert!(!text.contains("Processing..."));
        assert!(text.contains("Requirements Analysis"));
        assert!(text.contains("{}"));
    }

    #[test]
    fn test_announces_newly_unlocked_stage_once() {
        let display = TerminalDisplay::new(Vec::new());
        display.set_enabled(Stage::Impact, true);
        display.set_enabled(Stage::Impact, true);
        // Re-enabling its own trigger after a run is not an unlock
        display.set_status(Stage::Requirements, StageStatus::Succeeded, "done");
        display.set_enabled(Stage::Requirements, false);
        display.set_enabled(Stage::Requirements, true);

        let text = written(display);
        assert_eq!(text.matches("is now available").count(), 1);
        assert!(text.contains("Impact Assessment is now available (type `impact`)"));
    }

    #[test]
    fn test_error_output() {
        let display = TerminalDisplay::new(Vec::new());
        display.set_output(Stage::Impact, &Renderable::Error("timeout".to_string()));
        assert!(written(display).contains("Error: timeout"));
    }
}
