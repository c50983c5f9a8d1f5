//! OpenAI-compatible chat completions client
//!
//! Defaults to the Groq endpoint; any server speaking the same
//! `/chat/completions` dialect works through `generation.base_url`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{GenerationError, ProviderError, Result};
use crate::providers::{CompletionRequest, GenerationProvider};

pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl<'a> ChatRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl GroqClient {
    /// Create a client for `base_url` (without the `/chat/completions` suffix)
    pub fn new(base_url: impl Into<String>, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    /// Create a client from the `[generation]` section and `GROQ_API_KEY`
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.generation.base_url.clone(),
            config.generation_api_key()?,
            config.generation_timeout()?,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_request_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(format!(
                "no response within {}",
                humantime::format_duration(self.timeout)
            ))
        } else {
            ProviderError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl GenerationProvider for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, ProviderError> {
        let body = ChatRequest::from_request(request);

        tracing::debug!(model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| match self.map_request_error(e) {
                ProviderError::Network(msg) => ProviderError::InvalidResponse(msg),
                timeout => timeout,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))
    }

    fn name(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: &str, timeout: Duration) -> GroqClient {
        GroqClient::new(url, SecretString::from("test-key".to_string()), timeout).unwrap()
    }

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest::new(&GenerationConfig::default(), model, "system text", "user text")
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama-3.3-70b-versatile",
                "max_tokens": 800,
                "messages": [
                    {"role": "system", "content": "system text"},
                    {"role": "user", "content": "user text"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Draft post"}}]}"#)
            .create_async()
            .await;

        let text = client(&server.url(), Duration::from_secs(5))
            .complete(&request("llama-3.3-70b-versatile"))
            .await
            .unwrap();

        assert_eq!(text, "Draft post");
        mock.assert_async().await;
    }

    #[test]
    fn test_compound_request_has_no_top_p() {
        let compound = request("compound-beta");
        let body = serde_json::to_value(ChatRequest::from_request(&compound)).unwrap();
        assert!(body.get("top_p").is_none());

        let llama = request("llama-3.1-8b-instant");
        let body = serde_json::to_value(ChatRequest::from_request(&llama)).unwrap();
        assert!(body.get("top_p").is_some());
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("Rate limit reached for model llama-3.3-70b-versatile")
            .create_async()
            .await;

        let err = client(&server.url(), Duration::from_secs(5))
            .complete(&request("llama-3.3-70b-versatile"))
            .await
            .unwrap_err();

        match &err {
            ProviderError::Api { status, message } => {
                assert_eq!(*status, 429);
                assert!(message.contains("Rate limit reached"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
        assert!(err.message().starts_with("HTTP 429"));
    }

    #[tokio::test]
    async fn test_missing_choices_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(&server.url(), Duration::from_secs(5))
            .complete(&request("llama-3.1-8b-instant"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let err = client("http://127.0.0.1:9", Duration::from_secs(2))
            .complete(&request("llama-3.1-8b-instant"))
            .await
            .unwrap_err();
        assert!(!matches!(err, ProviderError::Api { .. }));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = client("https://api.groq.com/openai/v1/", Duration::from_secs(1));
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(client.name(), "groq");
    }
}
