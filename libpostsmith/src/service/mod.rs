//! Service layer for Postsmith
//!
//! This module provides the API the command-line tools are built on, so the
//! draft and post workflows share one implementation.
//!
//! # Architecture
//!
//! `PostsmithService` is the facade, coordinating specialized sub-services:
//!
//! - `GenerationService`: prompt, provider call, model fallback, cleanup
//! - `PublishingService`: platform limit, author URN, platform calls
//! - `ValidationService`: request checks before anything is sent
//!
//! # Example
//!
//! ```no_run
//! use libpostsmith::service::PostsmithService;
//! use libpostsmith::PostRequest;
//!
//! # async fn example() -> libpostsmith::Result<()> {
//! let service = PostsmithService::new()?;
//!
//! let result = service
//!     .create_post(&PostRequest::for_topic("remote work tips"), None)
//!     .await?;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod generation;
pub mod publishing;
pub mod validation;

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use self::generation::GenerationService;
use self::publishing::PublishingService;
use self::validation::ValidationService;
use crate::platforms::Platform;
use crate::providers::GenerationProvider;
use crate::types::{PostRequest, PublishResult};
use crate::{Config, Result};

/// Main service facade that coordinates all sub-services
#[derive(Clone)]
pub struct PostsmithService {
    generation: GenerationService,
    publishing: PublishingService,
    validation: ValidationService,
}

impl PostsmithService {
    /// Create a service from the default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or either
    /// credential is missing.
    pub fn new() -> Result<Self> {
        Self::from_config(Config::load()?)
    }

    /// Create a service backed by the HTTP provider and platform
    pub fn from_config(config: Config) -> Result<Self> {
        Ok(Self {
            generation: GenerationService::from_config(&config)?,
            publishing: PublishingService::from_config(&config)?,
            validation: ValidationService::new(config.limits),
        })
    }

    /// Create a service from explicit components, useful for testing
    pub fn with_components(
        provider: Arc<dyn GenerationProvider>,
        platform: Arc<dyn Platform>,
        config: &Config,
    ) -> Self {
        Self {
            generation: GenerationService::new(provider, config),
            publishing: PublishingService::new(platform, config),
            validation: ValidationService::new(config.limits),
        }
    }

    pub fn generation(&self) -> &GenerationService {
        &self.generation
    }

    pub fn publishing(&self) -> &PublishingService {
        &self.publishing
    }

    pub fn validation(&self) -> &ValidationService {
        &self.validation
    }

    /// Validate, generate when no content is given, then publish
    ///
    /// A rate-limited generation publishes nothing: the result has
    /// `success == false` and carries the advisory as its message.
    pub async fn create_post(
        &self,
        request: &PostRequest,
        author_id: Option<&str>,
    ) -> Result<PublishResult> {
        let author = self.prepare(request, author_id)?;

        match self.draft(request).await? {
            Draft::Ready(text) => self.publishing.publish_post(&text, &author).await,
            Draft::Advisory(result) => Ok(result),
        }
    }

    /// Like [`create_post`](Self::create_post), but publishes an article
    /// share headed by `title`
    pub async fn create_article(
        &self,
        request: &PostRequest,
        title: &str,
        author_id: Option<&str>,
    ) -> Result<PublishResult> {
        let author = self.prepare(request, author_id)?;

        match self.draft(request).await? {
            Draft::Ready(text) => {
                self.publishing
                    .publish_article(title, &text, &author)
                    .await
            }
            Draft::Advisory(result) => Ok(result),
        }
    }

    /// Validate the request and resolve the author
    fn prepare(&self, request: &PostRequest, author_id: Option<&str>) -> Result<String> {
        let report = self.validation.ensure_valid(request)?;
        for warning in &report.warnings {
            warn!("{}", warning);
        }

        self.publishing.resolve_author(author_id)
    }

    /// The given content, else a generated draft
    async fn draft(&self, request: &PostRequest) -> Result<Draft> {
        if let Some(content) = request.content_text() {
            return Ok(Draft::Ready(content.to_string()));
        }

        let generated = self.generation.generate_post(request).await?;
        if !generated.rate_limited {
            return Ok(Draft::Ready(generated.text));
        }

        Ok(Draft::Advisory(PublishResult {
            success: false,
            external_post_id: None,
            final_text: String::new(),
            message: generated.text,
            created_at: Utc::now(),
            url: None,
        }))
    }
}

enum Draft {
    Ready(String),
    /// Rate limited; nothing may be published
    Advisory(PublishResult),
}
