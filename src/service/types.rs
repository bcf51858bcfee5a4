//! Wire shapes exchanged with the remote stage service
//!
//! Requirements and impact results are opaque and travel as
//! [`serde_json::Value`]. Only the request for stage 1 and the file entries
//! of a code result have a shape the client relies on.

use serde::{Deserialize, Serialize};

/// Payload for the requirements stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsRequest {
    pub text: String,
}

impl RequirementsRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One entry of a code result's `files` array. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_content: String,
}
