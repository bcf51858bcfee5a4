//! HTTP client for the remote stage service
//!
//! Each stage is a JSON `POST` against a fixed path under a base URL:
//!
//! | Stage        | Path                          |
//! |--------------|-------------------------------|
//! | requirements | `/api/analyze/requirements`   |
//! | impact       | `/api/analyze/impact`         |
//! | code         | `/api/generate/code`          |
//!
//! Any non-2xx status, transport error, or non-JSON body is reported as a
//! [`ServiceError`]. For error statuses the server's `detail` field is used
//! as the reason when present.
//!
//! # Example
//!
//! ```no_run
//! use stagegate::pipeline::Stage;
//! use stagegate::service::{HttpStageService, RemoteStageService};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = HttpStageService::with_timeout("http://127.0.0.1:8000", Duration::from_secs(120))?;
//!
//! if service.health_check().await? {
//!     let result = service
//!         .call(Stage::Requirements, &serde_json::json!({ "text": "Users can log in" }))
//!         .await?;
//!     println!("{}", result);
//! }
//! # Ok(())
//! # }
//! ```

use super::client::RemoteStageService;
use super::error::ServiceError;
use crate::config::StagegateConfig;
use crate::pipeline::Stage;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Remote stage service reached over HTTP
pub struct HttpStageService {
    base_url: String,
    http_client: Client,
    timeout: Duration,
}

impl HttpStageService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            http_client,
            timeout,
        })
    }

    pub fn from_config(config: &StagegateConfig) -> Result<Self, ServiceError> {
        Self::with_timeout(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_path(stage: Stage) -> &'static str {
        match stage {
            Stage::Requirements => "/api/analyze/requirements",
            Stage::Impact => "/api/analyze/impact",
            Stage::Code => "/api/generate/code",
        }
    }

    pub fn endpoint(&self, stage: Stage) -> String {
        format!("{}{}", self.base_url, Self::endpoint_path(stage))
    }

    /// Checks whether the service answers at its base URL.
    ///
    /// Unreachable or timed-out services report `Ok(false)`; other transport
    /// errors are returned.
    pub async fn health_check(&self) -> Result<bool, ServiceError> {
        let url = format!("{}/", self.base_url);
        debug!("Checking stage service health at {}", url);

        match self.http_client.get(&url).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                if healthy {
                    info!("Stage service health check successful");
                } else {
                    warn!(
                        "Stage service health check failed with status: {}",
                        response.status()
                    );
                }
                Ok(healthy)
            }
            Err(e) => {
                if e.is_timeout() {
                    warn!("Stage service health check timed out");
                    Ok(false)
                } else if e.is_connect() {
                    warn!("Cannot connect to stage service at {}", self.base_url);
                    Ok(false)
                } else {
                    error!("Stage service health check error: {}", e);
                    Err(ServiceError::Network {
                        message: format!("Health check failed: {}", e),
                    })
                }
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ServiceError::Network {
                message: e.to_string(),
            }
        }
    }
}

/// Pulls a human-readable reason out of an error body.
///
/// Prefers a `detail` field (string or structured), then the raw body, then
/// the canonical reason phrase of the status.
fn error_detail(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned())
        .map(|detail| match detail {
            Value::String(s) => s,
            other => other.to_string(),
        });

    from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

#[async_trait]
impl RemoteStageService for HttpStageService {
    async fn call(&self, stage: Stage, payload: &Value) -> Result<Value, ServiceError> {
        let url = self.endpoint(stage);
        let start = Instant::now();

        debug!(stage = %stage, url = %url, "Sending stage request");

        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(status, &body);
            warn!(stage = %stage, status = status.as_u16(), detail = %detail, "Stage request failed");
            return Err(ServiceError::Status {
                stage,
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse {
                stage,
                message: e.to_string(),
            })?;

        debug!(
            stage = %stage,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Stage response received"
        );

        Ok(value)
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl std::fmt::Debug for HttpStageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStageService")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
