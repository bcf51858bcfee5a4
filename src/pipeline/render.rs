//! Result rendering
//!
//! Pure functions turning stage results into [`Renderable`] values that a
//! display surface can show. Requirements and impact results are printed as
//! pretty JSON; code results become one labeled block per generated file.

use super::stage::Stage;
use crate::service::types::GeneratedFile;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Literal shown when the code stage returns neither files nor a summary
pub const NO_CODE_GENERATED: &str = "No code generated.";

/// A labeled block for one generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileBlock {
    pub title: String,
    pub body: String,
}

/// Content of a stage's output region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Renderable {
    /// Transient text (processing, waiting on upstream)
    Placeholder(String),
    /// Pretty-printed structured result
    Json(String),
    /// Generated files in the order received
    Files(Vec<FileBlock>),
    /// Plain result text, such as a code summary
    Text(String),
    /// Failure reason of the last run
    Error(String),
}

impl Renderable {
    pub fn is_error(&self) -> bool {
        matches!(self, Renderable::Error(_))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Renderable::Placeholder(_))
    }
}

impl fmt::Display for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderable::Placeholder(text) | Renderable::Text(text) | Renderable::Json(text) => {
                f.write_str(text)
            }
            Renderable::Files(blocks) => {
                for (i, block) in blocks.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "\u{2501}\u{2501} {} \u{2501}\u{2501}", block.title)?;
                    write!(f, "{}", block.body)?;
                    if !block.body.ends_with('\n') {
                        writeln!(f)?;
                    }
                }
                Ok(())
            }
            Renderable::Error(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// Renders a successful result for the given stage
pub fn render_result(stage: Stage, value: &Value) -> Renderable {
    match stage {
        Stage::Requirements | Stage::Impact => render_structured(value),
        Stage::Code => render_code(value),
    }
}

/// Lossless pretty JSON of an opaque result
pub fn render_structured(value: &Value) -> Renderable {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    Renderable::Json(text)
}

/// File-by-file rendering of a code result, falling back to its summary.
///
/// `files` and `summary` are read independently, and each file entry is
/// converted on its own, so one malformed field never hides the others.
pub fn render_code(value: &Value) -> Renderable {
    let blocks: Vec<FileBlock> = value
        .get("files")
        .and_then(Value::as_array)
        .map(|files| files.iter().filter_map(file_block).collect())
        .unwrap_or_default();

    if !blocks.is_empty() {
        return Renderable::Files(blocks);
    }

    let summary = match value.get("summary") {
        Some(Value::String(text)) => text.clone(),
        Some(other @ (Value::Number(_) | Value::Object(_) | Value::Array(_))) => other.to_string(),
        _ => String::new(),
    };

    if summary.is_empty() {
        Renderable::Text(NO_CODE_GENERATED.to_string())
    } else {
        Renderable::Text(summary)
    }
}

fn file_block(entry: &Value) -> Option<FileBlock> {
    if !entry.is_object() {
        return None;
    }
    let file: GeneratedFile = serde_json::from_value(entry.clone()).ok()?;

    let name = if file.file_name.is_empty() {
        "unnamed file"
    } else {
        file.file_name.as_str()
    };
    let title = if file.file_type.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, file.file_type)
    };

    Some(FileBlock {
        title,
        body: file.file_content,
    })
}
