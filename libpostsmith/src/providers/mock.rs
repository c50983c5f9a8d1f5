//! Mock generation provider for testing
//!
//! Replies are scripted per model id, so fallback behaviour can be exercised
//! without network access: the primary model can fail while the fallback
//! model answers.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::error::ProviderError;
use crate::providers::{CompletionRequest, GenerationProvider};

type Reply = Result<String, ProviderError>;

#[derive(Debug, Default)]
struct Script {
    /// Queued replies per model, consumed front to back
    per_model: HashMap<String, VecDeque<Reply>>,
    /// Used when a model has no queued reply left
    fallback: Option<Reply>,
}

/// Mock provider for testing
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    script: Arc<Mutex<Script>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call answers with `text`
    pub fn replying(text: &str) -> Self {
        let provider = Self::new();
        lock(&provider.script).fallback = Some(Ok(text.to_string()));
        provider
    }

    /// Every call fails with `error`
    pub fn failing(error: ProviderError) -> Self {
        let provider = Self::new();
        lock(&provider.script).fallback = Some(Err(error));
        provider
    }

    /// Queue a reply for one call to `model`
    pub fn with_reply(self, model: &str, reply: Reply) -> Self {
        lock(&self.script)
            .per_model
            .entry(model.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Wait before answering (simulates network latency)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of times complete was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    /// Model ids requested, in order
    pub fn requested_models(&self) -> Vec<String> {
        lock(&self.requests)
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Reply {
        lock(&self.requests).push(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let mut script = lock(&self.script);
        if let Some(reply) = script
            .per_model
            .get_mut(&request.model)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }

        script.fallback.clone().unwrap_or_else(|| {
            Err(ProviderError::InvalidResponse(format!(
                "no scripted reply for model {}",
                request.model
            )))
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest::new(&GenerationConfig::default(), model, "sys", "user")
    }

    #[tokio::test]
    async fn test_replying_answers_every_call() {
        let provider = MockProvider::replying("Hello");
        assert_eq!(provider.complete(&request("a")).await.unwrap(), "Hello");
        assert_eq!(provider.complete(&request("b")).await.unwrap(), "Hello");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requested_models(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_per_model_replies_take_precedence() {
        let provider = MockProvider::replying("default").with_reply(
            "old-model",
            Err(ProviderError::Api {
                status: 400,
                message: "model decommissioned".to_string(),
            }),
        );

        assert!(provider.complete(&request("old-model")).await.is_err());
        // Queue drained, default applies
        assert_eq!(provider.complete(&request("old-model")).await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_unscripted_call_fails() {
        let provider = MockProvider::new();
        let err = provider.complete(&request("x")).await.unwrap_err();
        assert!(err.to_string().contains("no scripted reply"));
    }

    #[tokio::test]
    async fn test_clones_share_recordings() {
        let provider = MockProvider::replying("ok");
        let handle = provider.clone();
        provider.complete(&request("m")).await.unwrap();
        assert_eq!(handle.call_count(), 1);
        assert_eq!(handle.requests()[0].user_prompt, "user");
    }
}
