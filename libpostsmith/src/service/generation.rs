//! Generation service
//!
//! Turns a post request into publishable text: prompt rendering, the provider
//! call with model fallback, sanitizing, length enforcement and hashtag
//! extraction.

use std::sync::{Arc, Mutex, RwLock};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{Config, GenerationConfig};
use crate::error::{GenerationError, PostsmithError, ProviderError, Result};
use crate::hashtags::{extract_hashtags, parse_hashtag_reply, MAX_HASHTAGS};
use crate::limits::LengthPolicy;
use crate::models::{classify_failure, rate_limit_advisory, FailureClass, ModelCatalog};
use crate::prompt::{build_prompt, enhance_prompt, hashtag_prompt, PromptParams, SYSTEM_PROMPT};
use crate::providers::{CompletionRequest, GenerationProvider};
use crate::sanitize::sanitize;
use crate::types::{GeneratedPost, PostRequest};

/// Result of one provider round, after fallback handling
enum Completion {
    Text { raw: String, model: String },
    RateLimited { model: String, message: String },
}

/// Generation service
///
/// Cheap to clone: clones share the provider, the active model and the
/// random source.
#[derive(Clone)]
pub struct GenerationService {
    provider: Arc<dyn GenerationProvider>,
    settings: Arc<GenerationConfig>,
    catalog: Arc<ModelCatalog>,
    policy: LengthPolicy,
    active_model: Arc<RwLock<String>>,
    rng: Arc<Mutex<StdRng>>,
}

impl GenerationService {
    /// Create a generation service around `provider`
    ///
    /// The active model starts as `config.generation.model` resolved against
    /// the catalog (the quality tier when unset or unknown).
    pub fn new(provider: Arc<dyn GenerationProvider>, config: &Config) -> Self {
        let catalog = config.model_catalog();
        let active = catalog.resolve(config.generation.model.as_deref());

        Self {
            provider,
            settings: Arc::new(config.generation.clone()),
            catalog: Arc::new(catalog),
            policy: config.limits,
            active_model: Arc::new(RwLock::new(active)),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Create a generation service backed by the configured HTTP provider
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = crate::providers::groq::GroqClient::from_config(config)?;
        Ok(Self::new(Arc::new(provider), config))
    }

    /// Use a seeded random source (closing-question choice becomes reproducible)
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            ..self
        }
    }

    /// Generate a post for `request.topic`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the topic is missing or blank
    /// - `GenerationError::Timeout` when the provider timed out
    /// - `GenerationError::FallbackExhausted` when the model was retired and
    ///   the fallback model failed too
    /// - `GenerationError::EmptyResponse` when nothing usable came back
    ///
    /// A rate-limited provider is not an error: the result carries the
    /// advisory text with `rate_limited` set.
    pub async fn generate_post(&self, request: &PostRequest) -> Result<GeneratedPost> {
        let topic = request
            .topic_text()
            .ok_or_else(|| PostsmithError::InvalidInput("Topic is required".to_string()))?;

        let params = PromptParams {
            topic,
            tone: request.tone,
            length: request.length,
            include_hashtags: request.include_hashtags,
            target_audience: request.target_audience.as_deref(),
            call_to_action: request.call_to_action.as_deref(),
        };
        let prompt = {
            let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
            build_prompt(&params, &mut *rng)
        };

        info!(topic, tone = %request.tone, length = %request.length, "Generating post");

        match self.complete(SYSTEM_PROMPT, &prompt).await? {
            Completion::Text { raw, model } => {
                let text = self.finish(&raw)?;
                let hashtags = if request.include_hashtags {
                    extract_hashtags(&text, MAX_HASHTAGS)
                } else {
                    Vec::new()
                };

                info!(model = %model, length = text.chars().count(), "Post generated");

                Ok(GeneratedPost {
                    text,
                    hashtags,
                    model,
                    rate_limited: false,
                })
            }
            Completion::RateLimited { model, message } => {
                warn!(model = %model, error = %message, "Rate limited, returning advisory");
                Ok(GeneratedPost {
                    text: rate_limit_advisory(topic, &model),
                    hashtags: Vec::new(),
                    model,
                    rate_limited: true,
                })
            }
        }
    }

    /// Rewrite existing post text to be more engaging, within the budget
    pub async fn enhance(&self, content: &str) -> Result<String> {
        let content = non_blank(content, "Content is required")?;

        match self.complete(SYSTEM_PROMPT, &enhance_prompt(content)).await? {
            Completion::Text { raw, .. } => self.finish(&raw),
            Completion::RateLimited { message, .. } => {
                Err(GenerationError::Provider(message).into())
            }
        }
    }

    /// Ask the provider for up to `count` hashtags for `content`
    pub async fn suggest_hashtags(&self, content: &str, count: usize) -> Result<Vec<String>> {
        let content = non_blank(content, "Content is required")?;
        if count == 0 {
            return Ok(Vec::new());
        }

        match self.complete(SYSTEM_PROMPT, &hashtag_prompt(content, count)).await? {
            Completion::Text { raw, .. } => Ok(parse_hashtag_reply(&raw, count)),
            Completion::RateLimited { message, .. } => {
                Err(GenerationError::Provider(message).into())
            }
        }
    }

    /// Catalog entries as `(key, model_id)` in catalog order
    pub fn available_models(&self) -> Vec<(String, String)> {
        self.catalog.entries().to_vec()
    }

    /// Model id used for the next request
    pub fn current_model(&self) -> String {
        self.active_model
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Switch the active model by tier key or model id
    ///
    /// Returns the new model id. Unknown values are rejected.
    pub fn switch_model(&self, key: &str) -> Result<String> {
        let key = key.trim();
        let model = self
            .catalog
            .get(key)
            .map(str::to_string)
            .or_else(|| self.catalog.contains_id(key).then(|| key.to_string()))
            .ok_or_else(|| {
                PostsmithError::InvalidInput(format!(
                    "Unknown model '{}'. Available: {}",
                    key,
                    self.catalog.keys().join(", ")
                ))
            })?;

        self.set_active(&model);
        info!(model = %model, "Switched active model");
        Ok(model)
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    fn set_active(&self, model: &str) {
        *self.active_model.write().unwrap_or_else(|p| p.into_inner()) = model.to_string();
    }

    fn request(&self, model: &str, system_prompt: &str, user_prompt: &str) -> CompletionRequest {
        CompletionRequest::new(&self.settings, model, system_prompt, user_prompt)
    }

    /// Call the provider with the active model, applying the fallback policy
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<Completion> {
        let primary = self.current_model();
        debug!(provider = self.provider.name(), model = %primary, "Requesting completion");

        let error = match self
            .provider
            .complete(&self.request(&primary, system_prompt, user_prompt))
            .await
        {
            Ok(raw) => return Ok(Completion::Text { raw, model: primary }),
            Err(error) => error,
        };

        if error.is_timeout() {
            return Err(GenerationError::Timeout(error.message()).into());
        }

        match classify_failure(&error.message()) {
            FailureClass::ModelRetired => {
                self.fall_back(&primary, error, system_prompt, user_prompt)
                    .await
            }
            FailureClass::RateLimited => Ok(Completion::RateLimited {
                model: primary,
                message: error.message(),
            }),
            FailureClass::Other => Err(GenerationError::Provider(error.message()).into()),
        }
    }

    /// Retry exactly once on the fallback tier
    async fn fall_back(
        &self,
        primary: &str,
        primary_error: ProviderError,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Completion> {
        let Some(fallback) = self.catalog.fallback_model().map(str::to_string) else {
            return Err(GenerationError::Provider(primary_error.message()).into());
        };

        warn!(
            primary = %primary,
            fallback = %fallback,
            error = %primary_error,
            "Model unavailable, retrying once with the fallback model"
        );

        self.set_active(&fallback);

        match self
            .provider
            .complete(&self.request(&fallback, system_prompt, user_prompt))
            .await
        {
            Ok(raw) => {
                info!(model = %fallback, "Fallback model succeeded and is now active");
                Ok(Completion::Text {
                    raw,
                    model: fallback,
                })
            }
            Err(fallback_error) => {
                self.set_active(primary);
                Err(GenerationError::FallbackExhausted {
                    primary: primary_error.message(),
                    fallback: fallback_error.message(),
                }
                .into())
            }
        }
    }

    /// Sanitize and enforce the budget on raw provider output
    fn finish(&self, raw: &str) -> Result<String> {
        let sanitized = sanitize(raw);
        if sanitized.text.is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }
        Ok(self.policy.enforce(&sanitized.text))
    }
}

fn non_blank<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(PostsmithError::InvalidInput(message.to_string()))
    } else {
        Ok(value)
    }
}
