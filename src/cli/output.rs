//! Output formatting for batch runs and health checks
//!
//! Reports can be printed as JSON, YAML, or human-readable text.
//!
//! # Example
//!
//! ```ignore
//! use stagegate::cli::output::{OutputFormat, OutputFormatter, RunReport};
//!
//! let report = RunReport::new("http://127.0.0.1:8000", outcomes);
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format_run(&report)?);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::pipeline::{render_result, Stage, StageOutcome, StageStatus};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// Result of one stage in a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a full batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub base_url: String,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Builds a report covering all three stages.
    ///
    /// Stages without an outcome were never reached and report `idle`.
    pub fn new(base_url: impl Into<String>, outcomes: Vec<(Stage, StageOutcome)>) -> Self {
        let stages: Vec<StageReport> = Stage::ALL
            .iter()
            .map(|&stage| {
                let outcome = outcomes
                    .iter()
                    .find(|(s, _)| *s == stage)
                    .map(|(_, outcome)| outcome);

                match outcome {
                    Some(StageOutcome::Succeeded(value)) => StageReport {
                        stage,
                        status: StageStatus::Succeeded,
                        result: Some(value.clone()),
                        error: None,
                    },
                    Some(StageOutcome::Failed(reason)) => StageReport {
                        stage,
                        status: StageStatus::Failed,
                        result: None,
                        error: Some(reason.clone()),
                    },
                    Some(StageOutcome::Skipped(reason)) => StageReport {
                        stage,
                        status: StageStatus::Idle,
                        result: None,
                        error: Some(reason.to_string()),
                    },
                    Some(StageOutcome::Superseded) => StageReport {
                        stage,
                        status: StageStatus::Idle,
                        result: None,
                        error: Some("run was superseded".to_string()),
                    },
                    None => StageReport {
                        stage,
                        status: StageStatus::Idle,
                        result: None,
                        error: None,
                    },
                }
            })
            .collect();

        let success = stages
            .iter()
            .all(|report| report.status == StageStatus::Succeeded);

        Self {
            success,
            base_url: base_url.into(),
            stages,
        }
    }
}

/// Result of a health probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub base_url: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_run(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize run report to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize run report to YAML")
            }
            OutputFormat::Human => Ok(self.format_run_human(report)),
        }
    }

    pub fn format_health(&self, report: &HealthReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize health report to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize health report to YAML")
            }
            OutputFormat::Human => Ok(self.format_health_human(report)),
        }
    }

    fn format_run_human(&self, report: &RunReport) -> String {
        let mut output = String::new();

        if report.success {
            output.push_str("\u{2713} Pipeline Complete\n");
        } else {
            output.push_str("\u{26A0} Pipeline Stopped\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Service: {}\n\n", report.base_url));

        for stage_report in &report.stages {
            let stage = stage_report.stage;
            output.push_str(&format!(
                "{}: {}\n",
                stage.title(),
                stage_report.status.label(stage)
            ));

            if let Some(value) = &stage_report.result {
                output.push_str(render_result(stage, value).to_string().trim_end());
                output.push('\n');
            } else if let Some(error) = &stage_report.error {
                output.push_str(&format!("\u{2514}\u{2500} {}\n", error));
            }
            output.push('\n');
        }

        output.trim_end().to_string() + "\n"
    }

    fn format_health_human(&self, report: &HealthReport) -> String {
        match (&report.error, report.healthy) {
            (Some(error), _) => format!(
                "\u{2717} Stage service at {} could not be checked: {}\n",
                report.base_url, error
            ),
            (None, true) => format!("\u{2713} Stage service is reachable at {}\n", report.base_url),
            (None, false) => format!(
                "\u{2717} Stage service is not reachable at {}\n",
                report.base_url
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SkipReason;
    use serde_json::json;

    fn full_success() -> RunReport {
        RunReport::new(
            "http://127.0.0.1:8000",
            vec![
                (Stage::Requirements, StageOutcome::Succeeded(json!({"id": "R1"}))),
                (Stage::Impact, StageOutcome::Succeeded(json!({"id": "I1"}))),
                (
                    Stage::Code,
                    StageOutcome::Succeeded(json!({"files": [
                        {"file_name": "a.py", "file_type": "python", "file_content": "print(1)"}
                    ]})),
                ),
            ],
        )
    }

    #[test]
    fn test_report_success() {
        let report = full_success();
        assert!(report.success);
        assert_eq!(report.stages.len(), 3);
    }

    #[test]
    fn test_report_stops_at_failure() {
        let report = RunReport::new(
            "http://x",
            vec![
                (Stage::Requirements, StageOutcome::Succeeded(json!("R1"))),
                (Stage::Impact, StageOutcome::Failed("boom".to_string())),
            ],
        );

        assert!(!report.success);
        assert_eq!(report.stages[1].status, StageStatus::Failed);
        assert_eq!(report.stages[1].error.as_deref(), Some("boom"));
        assert_eq!(report.stages[2].status, StageStatus::Idle);
        assert!(report.stages[2].result.is_none());
    }

    #[test]
    fn test_report_skipped() {
        let report = RunReport::new(
            "http://x",
            vec![(
                Stage::Requirements,
                StageOutcome::Skipped(SkipReason::EmptyInput),
            )],
        );
        assert!(!report.success);
        assert_eq!(
            report.stages[0].error.as_deref(),
            Some("input text is empty")
        );
    }

    #[test]
    fn test_format_json() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_run(&full_success())
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["stages"][0]["stage"], "requirements");
        assert_eq!(parsed["stages"][1]["result"]["id"], "I1");
    }

    #[test]
    fn test_format_yaml() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_run(&full_success())
            .unwrap();
        assert!(output.contains("success: true"));
        assert!(output.contains("stage: code"));
    }

    #[test]
    fn test_format_human() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_run(&full_success())
            .unwrap();

        assert!(output.contains("Pipeline Complete"));
        assert!(output.contains("Code Generation: \u{2713} Done"));
        assert!(output.contains("a.py (python)"));
        assert!(output.contains("print(1)"));
    }

    #[test]
    fn test_format_health() {
        let healthy = HealthReport {
            base_url: "http://x".to_string(),
            healthy: true,
            error: None,
        };
        let human = OutputFormatter::new(OutputFormat::Human)
            .format_health(&healthy)
            .unwrap();
        assert!(human.contains("reachable at http://x"));

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_health(&healthy)
            .unwrap();
        assert!(json.contains("\"healthy\": true"));
    }
}
