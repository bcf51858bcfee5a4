//! Remote stage service errors

use crate::pipeline::Stage;
use thiserror::Error;

/// Errors that can occur while calling the remote stage service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status
    #[error("{} (HTTP {}): {}", .stage.failure_message(), .status, .detail)]
    Status {
        stage: Stage,
        status: u16,
        detail: String,
    },

    /// The request never produced a response
    #[error("Network error: {message}")]
    Network { message: String },

    /// The transport gave up waiting
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// A success status arrived with a body that is not JSON
    #[error("Invalid response from {stage} service: {message}")]
    InvalidResponse { stage: Stage, message: String },

    /// The HTTP client could not be constructed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl ServiceError {
    pub fn other(message: impl Into<String>) -> Self {
        ServiceError::Other {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_names_the_stage() {
        let err = ServiceError::Status {
            stage: Stage::Impact,
            status: 500,
            detail: "LLM unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Impact analysis failed (HTTP 500): LLM unavailable"
        );
    }

    #[test]
    fn test_other_message_is_verbatim() {
        assert_eq!(ServiceError::other("boom").to_string(), "boom");
    }

    #[test]
    fn test_timeout_message() {
        let err = ServiceError::Timeout { seconds: 30 };
        assert!(err.to_string().contains("30 seconds"));
    }
}
