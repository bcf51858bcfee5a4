use super::error::ServiceError;
use crate::pipeline::Stage;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One opaque call-and-result endpoint per pipeline stage
#[async_trait]
pub trait RemoteStageService: Send + Sync {
    /// Sends `payload` to the endpoint for `stage` and returns its result.
    async fn call(&self, stage: Stage, payload: &Value) -> Result<Value, ServiceError>;

    fn name(&self) -> &str;
}

#[async_trait]
impl<T: RemoteStageService + ?Sized> RemoteStageService for Arc<T> {
    async fn call(&self, stage: Stage, payload: &Value) -> Result<Value, ServiceError> {
        (**self).call(stage, payload).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
