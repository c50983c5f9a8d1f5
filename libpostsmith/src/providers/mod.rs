//! Text generation providers
//!
//! A provider turns one system prompt plus one user prompt into draft text.
//! [`GroqClient`](groq::GroqClient) talks to an OpenAI-compatible chat
//! completions endpoint; [`MockProvider`](mock::MockProvider) scripts replies
//! for tests.

use async_trait::async_trait;

use crate::config::GenerationConfig;
use crate::error::ProviderError;
use crate::models::COMPOUND_MODEL;

pub mod groq;

// Mock provider is available for all builds (not just tests) to support integration tests
pub mod mock;

/// A single completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Not sent when `None`
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    /// Build a request with sampling settings from `config`.
    ///
    /// `top_p` is left out for the compound model, which rejects it.
    pub fn new(
        config: &GenerationConfig,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let top_p = (model != COMPOUND_MODEL).then_some(config.top_p);

        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p,
        }
    }
}

/// Generation provider trait
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run one completion and return the raw text of the first choice
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Timeout` when the request exceeded the client
    /// timeout, `ProviderError::Api` for non-success HTTP statuses, and
    /// `ProviderError::InvalidResponse` when the body has no choice text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Provider name for logs (e.g. "groq")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_config_sampling() {
        let config = GenerationConfig::default();
        let request = CompletionRequest::new(&config, "llama-3.3-70b-versatile", "sys", "user");
        assert_eq!(request.max_tokens, 800);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.top_p, Some(0.9));
    }

    #[test]
    fn test_compound_model_omits_top_p() {
        let config = GenerationConfig::default();
        let request = CompletionRequest::new(&config, COMPOUND_MODEL, "sys", "user");
        assert_eq!(request.top_p, None);
        assert_eq!(request.model, COMPOUND_MODEL);
    }
}
