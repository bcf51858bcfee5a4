use super::client::RemoteStageService;
use super::error::ServiceError;
use crate::pipeline::Stage;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Scripted reply for one call
#[derive(Debug)]
pub enum MockReply {
    Ok(Value),
    Err(ServiceError),
    /// Resolves when the paired [`oneshot::Sender`] fires
    Deferred(oneshot::Receiver<Result<Value, ServiceError>>),
}

/// A call the mock received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub stage: Stage,
    pub payload: Value,
}

/// In-memory stage service with per-stage reply queues
pub struct MockStageService {
    replies: Mutex<HashMap<Stage, VecDeque<MockReply>>>,
    calls: Mutex<Vec<RecordedCall>>,
    name: String,
}

impl MockStageService {
    pub fn new() -> Self {
        Self::with_name("MockStageService")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    fn replies(&self) -> MutexGuard<'_, HashMap<Stage, VecDeque<MockReply>>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_reply(&self, stage: Stage, reply: MockReply) {
        self.replies().entry(stage).or_default().push_back(reply);
    }

    pub fn push_ok(&self, stage: Stage, value: Value) {
        self.push_reply(stage, MockReply::Ok(value));
    }

    pub fn push_err(&self, stage: Stage, error: ServiceError) {
        self.push_reply(stage, MockReply::Err(error));
    }

    /// Queues a reply that stays pending until the returned sender fires.
    ///
    /// Dropping the sender resolves the call with an error.
    pub fn push_deferred(&self, stage: Stage) -> oneshot::Sender<Result<Value, ServiceError>> {
        let (tx, rx) = oneshot::channel();
        self.push_reply(stage, MockReply::Deferred(rx));
        tx
    }

    pub fn remaining_replies(&self, stage: Stage) -> usize {
        self.replies().get(&stage).map_or(0, VecDeque::len)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.recorded().clone()
    }

    pub fn call_count(&self) -> usize {
        self.recorded().len()
    }

    pub fn calls_for(&self, stage: Stage) -> Vec<Value> {
        self.recorded()
            .iter()
            .filter(|call| call.stage == stage)
            .map(|call| call.payload.clone())
            .collect()
    }

    /// Yields to the runtime until at least `count` calls have arrived.
    ///
    /// Returns `false` if they have not arrived within five seconds.
    #[must_use]
    pub async fn wait_for_calls(&self, count: usize) -> bool {
        self.wait_for_calls_within(count, DEFAULT_WAIT).await
    }

    #[must_use]
    pub async fn wait_for_calls_within(&self, count: usize, limit: Duration) -> bool {
        let arrived = async {
            while self.call_count() < count {
                tokio::task::yield_now().await;
            }
        };
        tokio::time::timeout(limit, arrived).await.is_ok()
    }
}

impl Default for MockStageService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStageService for MockStageService {
    async fn call(&self, stage: Stage, payload: &Value) -> Result<Value, ServiceError> {
        self.recorded().push(RecordedCall {
            stage,
            payload: payload.clone(),
        });

        let reply = self
            .replies()
            .get_mut(&stage)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| {
                ServiceError::other(format!(
                    "MockStageService: No more {} replies in queue",
                    stage
                ))
            })?;

        match reply {
            MockReply::Ok(value) => Ok(value),
            MockReply::Err(error) => Err(error),
            MockReply::Deferred(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ServiceError::other("MockStageService: deferred reply dropped"))),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockStageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStageService")
            .field("name", &self.name)
            .field("calls", &self.call_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_replies_per_stage() {
        let service = MockStageService::new();
        service.push_ok(Stage::Requirements, json!("r1"));
        service.push_ok(Stage::Impact, json!("i1"));

        let impact = service.call(Stage::Impact, &json!("r1")).await.unwrap();
        let requirements = service
            .call(Stage::Requirements, &json!({"text": "x"}))
            .await
            .unwrap();

        assert_eq!(impact, json!("i1"));
        assert_eq!(requirements, json!("r1"));
        assert_eq!(service.calls_for(Stage::Impact), vec![json!("r1")]);
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_error() {
        let service = MockStageService::new();
        service.push_err(Stage::Code, ServiceError::Timeout { seconds: 30 });

        let result = service.call(Stage::Code, &json!({})).await;
        assert_eq!(result, Err(ServiceError::Timeout { seconds: 30 }));
    }

    #[tokio::test]
    async fn test_mock_empty_queue() {
        let service = MockStageService::new();
        let result = service.call(Stage::Requirements, &json!({})).await;

        assert!(result.is_err());
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_deferred() {
        let service = std::sync::Arc::new(MockStageService::new());
        let tx = service.push_deferred(Stage::Impact);

        let task = {
            let service = service.clone();
            tokio::spawn(async move { service.call(Stage::Impact, &json!(1)).await })
        };

        assert!(service.wait_for_calls(1).await);
        assert_eq!(service.remaining_replies(Stage::Impact), 0);
        tx.send(Ok(json!("done"))).unwrap();

        assert_eq!(task.await.unwrap(), Ok(json!("done")));
    }

    #[tokio::test]
    async fn test_wait_for_calls_gives_up() {
        let service = MockStageService::new();
        assert!(
            !service
                .wait_for_calls_within(1, Duration::from_millis(50))
                .await
        );

        service.push_ok(Stage::Code, json!("c1"));
        service.call(Stage::Code, &json!({})).await.unwrap();
        assert!(service.wait_for_calls_within(1, Duration::ZERO).await);
    }

    #[test]
    fn test_custom_name() {
        let service = MockStageService::with_name("Scripted");
        assert_eq!(service.name(), "Scripted");
    }
}
