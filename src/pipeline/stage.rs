//! Stage identifiers and per-stage status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three sequential pipeline steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Requirements extraction from free text
    Requirements,
    /// Impact assessment of the extracted requirements
    Impact,
    /// Code generation from the impact assessment
    Code,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 3] = [Stage::Requirements, Stage::Impact, Stage::Code];

    /// Zero-based position in the pipeline
    pub fn index(self) -> usize {
        match self {
            Stage::Requirements => 0,
            Stage::Impact => 1,
            Stage::Code => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Stage> {
        Self::ALL.get(index).copied()
    }

    /// The stage whose result feeds this one
    pub fn upstream(self) -> Option<Stage> {
        self.index().checked_sub(1).and_then(Stage::from_index)
    }

    /// The stage this one unlocks on success
    pub fn next(self) -> Option<Stage> {
        Stage::from_index(self.index() + 1)
    }

    /// Every stage strictly after this one, in order
    pub fn downstream(self) -> impl Iterator<Item = Stage> {
        Self::ALL.into_iter().skip(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Requirements => "requirements",
            Stage::Impact => "impact",
            Stage::Code => "code",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Requirements => "Requirements Analysis",
            Stage::Impact => "Impact Assessment",
            Stage::Code => "Code Generation",
        }
    }

    /// Status text shown while the stage's call is in flight
    pub fn running_label(self) -> &'static str {
        match self {
            Stage::Requirements => "Analyzing...",
            Stage::Impact => "Assessing...",
            Stage::Code => "Generating...",
        }
    }

    /// Output placeholder shown while the stage's call is in flight
    pub fn processing_placeholder(self) -> &'static str {
        match self {
            Stage::Code => "Generating Code...",
            _ => "Processing...",
        }
    }

    /// Output placeholder shown while the stage waits for its upstream
    pub fn waiting_placeholder(self) -> &'static str {
        match self {
            Stage::Requirements => "Enter requirements text to begin.",
            Stage::Impact => "Waiting for requirements...",
            Stage::Code => "Code will appear here...",
        }
    }

    /// Reason reported when the remote service answers with a failure status
    pub fn failure_message(self) -> &'static str {
        match self {
            Stage::Requirements => "Analysis failed",
            Stage::Impact => "Impact analysis failed",
            Stage::Code => "Code generation failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "requirements" | "req" | "analyze" | "1" => Ok(Stage::Requirements),
            "impact" | "2" => Ok(Stage::Impact),
            "code" | "generate" | "3" => Ok(Stage::Code),
            other => Err(format!(
                "Unknown stage: {}. Valid options: requirements, impact, code",
                other
            )),
        }
    }
}

/// Observable lifecycle state of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl StageStatus {
    pub fn is_running(self) -> bool {
        matches!(self, StageStatus::Running)
    }

    /// Display text for this status on the given stage
    pub fn label(self, stage: Stage) -> &'static str {
        match self {
            StageStatus::Idle if stage == Stage::Requirements => "Ready",
            StageStatus::Idle => "Waiting on upstream",
            StageStatus::Running => stage.running_label(),
            StageStatus::Succeeded => "\u{2713} Done",
            StageStatus::Failed => "\u{26A0} Failed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageStatus::Idle => "idle",
            StageStatus::Running => "running",
            StageStatus::Succeeded => "succeeded",
            StageStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}
