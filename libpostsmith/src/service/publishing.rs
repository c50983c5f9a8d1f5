//! Publishing service
//!
//! The publish boundary: every text goes through the platform-limit check
//! and author normalization before it reaches the platform.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ConfigError, PostsmithError, Result};
use crate::limits::{fit_platform_limit, LengthPolicy};
use crate::platforms::linkedin::{post_url, LinkedInClient};
use crate::platforms::{article_text, normalize_author_urn, Platform};
use crate::types::{PostAnalytics, Profile, PublishResult, RecentPost};

/// Article body fitted so that title, blank line and body stay in budget
///
/// # Errors
///
/// `InvalidInput` for an empty title or body, or a title that leaves no
/// room for the body.
pub fn fit_article(policy: &LengthPolicy, title: &str, content: &str) -> Result<String> {
    let (title, content) = (title.trim(), content.trim());
    if title.is_empty() {
        return Err(PostsmithError::InvalidInput(
            "Article title cannot be empty".to_string(),
        ));
    }
    if content.is_empty() {
        return Err(PostsmithError::InvalidInput(
            "Post content cannot be empty".to_string(),
        ));
    }

    // Title plus the blank line separating it from the body
    let overhead = title.chars().count() + 2;
    if overhead >= policy.max_chars {
        return Err(PostsmithError::InvalidInput(format!(
            "Article title is too long ({} characters, budget is {})",
            overhead - 2,
            policy.max_chars
        )));
    }

    let fitted = fit_platform_limit(
        content,
        policy.platform_max_chars.saturating_sub(overhead),
        policy.max_chars - overhead,
    );
    if fitted.len() != content.len() {
        warn!(
            length = overhead + content.chars().count(),
            limit = policy.platform_max_chars,
            "Article exceeds the platform limit, body trimmed"
        );
    }
    Ok(fitted)
}

/// Publishing service
#[derive(Clone)]
pub struct PublishingService {
    platform: Arc<dyn Platform>,
    policy: LengthPolicy,
    default_author: Option<String>,
}

impl PublishingService {
    /// Create a publishing service around `platform`
    ///
    /// The default author comes from `LINKEDIN_PERSON_ID` or
    /// `publishing.author_id`.
    pub fn new(platform: Arc<dyn Platform>, config: &Config) -> Self {
        Self {
            platform,
            policy: config.limits,
            default_author: config.author_id(),
        }
    }

    /// Create a publishing service backed by the LinkedIn API
    pub fn from_config(config: &Config) -> Result<Self> {
        let platform = LinkedInClient::from_config(config)?;
        Ok(Self::new(Arc::new(platform), config))
    }

    /// Text exactly as it would be published
    pub fn prepare(&self, text: &str) -> String {
        self.policy.fit_platform(text.trim())
    }

    /// Article body as it would be published under `title`
    pub fn prepare_article(&self, title: &str, content: &str) -> Result<String> {
        fit_article(&self.policy, title, content)
    }

    /// The explicit author, else the configured default
    pub fn resolve_author(&self, author_id: Option<&str>) -> Result<String> {
        author_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_author.clone())
            .ok_or_else(|| {
                ConfigError::MissingField(
                    "publishing.author_id (or set LINKEDIN_PERSON_ID)".to_string(),
                )
                .into()
            })
    }

    /// Publish `text` as `author_id`
    ///
    /// Text over the platform ceiling is trimmed to the policy budget first.
    /// The author id gains the `urn:li:person:` prefix when it lacks one.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for empty text or author; platform refusals propagate
    /// as `PublishError`.
    pub async fn publish_post(&self, text: &str, author_id: &str) -> Result<PublishResult> {
        if text.trim().is_empty() {
            return Err(PostsmithError::InvalidInput(
                "Post content cannot be empty".to_string(),
            ));
        }
        if author_id.trim().is_empty() {
            return Err(PostsmithError::InvalidInput(
                "Author id cannot be empty".to_string(),
            ));
        }

        let final_text = self.prepare(text);
        let author_urn = normalize_author_urn(author_id);

        info!(
            platform = self.platform.name(),
            author = %author_urn,
            length = final_text.chars().count(),
            "Publishing post"
        );

        let published = self.platform.publish(&final_text, &author_urn).await?;

        Ok(PublishResult {
            success: true,
            url: published.id.as_deref().map(post_url),
            message: format!("Post published to {}", self.platform.name()),
            external_post_id: published.id,
            final_text,
            created_at: Utc::now(),
        })
    }

    /// Publish an article share with `title` and `content` as `author_id`
    ///
    /// The body is fitted with [`prepare_article`](Self::prepare_article);
    /// `final_text` in the result is the combined commentary.
    pub async fn publish_article(
        &self,
        title: &str,
        content: &str,
        author_id: &str,
    ) -> Result<PublishResult> {
        let body = self.prepare_article(title, content)?;
        if author_id.trim().is_empty() {
            return Err(PostsmithError::InvalidInput(
                "Author id cannot be empty".to_string(),
            ));
        }

        let author_urn = normalize_author_urn(author_id);
        let title = title.trim();

        info!(
            platform = self.platform.name(),
            author = %author_urn,
            title,
            "Publishing article"
        );

        let published = self
            .platform
            .publish_article(title, &body, &author_urn)
            .await?;

        Ok(PublishResult {
            success: true,
            url: published.id.as_deref().map(post_url),
            message: format!("Article published to {}", self.platform.name()),
            external_post_id: published.id,
            final_text: article_text(title, &body),
            created_at: Utc::now(),
        })
    }

    /// Likes and comments on a published post
    pub async fn post_analytics(&self, post_id: &str) -> Result<PostAnalytics> {
        let post_id = post_id.trim();
        if post_id.is_empty() {
            return Err(PostsmithError::InvalidInput(
                "Post id cannot be empty".to_string(),
            ));
        }
        self.platform.post_analytics(post_id).await
    }

    /// Profile of the account behind the access token
    pub async fn profile(&self) -> Result<Profile> {
        self.platform.fetch_profile().await
    }

    /// True if the platform accepts the credentials
    pub async fn test_connection(&self) -> bool {
        match self.platform.fetch_profile().await {
            Ok(profile) => {
                info!(id = %profile.id, "Connection test succeeded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Connection test failed");
                false
            }
        }
    }

    /// Most recent posts by `author_id`
    pub async fn recent_posts(&self, author_id: &str, count: usize) -> Result<Vec<RecentPost>> {
        self.platform
            .recent_posts(&normalize_author_urn(author_id), count)
            .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        let post_id = post_id.trim();
        if post_id.is_empty() {
            return Err(PostsmithError::InvalidInput(
                "Post id cannot be empty".to_string(),
            ));
        }
        self.platform.delete_post(post_id).await
    }

    pub fn policy(&self) -> LengthPolicy {
        self.policy
    }
}
