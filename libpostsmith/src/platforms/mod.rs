//! Publishing platform abstraction and implementations
//!
//! A platform takes finished post text and an author URN and creates the
//! post. Length policy is applied by the publishing service before the
//! platform is called; `validate_content` is the last-line check.
//!
//! # Examples
//!
//! ```no_run
//! use libpostsmith::platforms::{normalize_author_urn, Platform, linkedin::LinkedInClient};
//! use libpostsmith::Config;
//!
//! # async fn example() -> libpostsmith::Result<()> {
//! let config = Config::load()?;
//! let platform = LinkedInClient::from_config(&config)?;
//!
//! let author = normalize_author_urn("abc123");
//! platform.validate_content("Hello, network!")?;
//! let post = platform.publish("Hello, network!", &author).await?;
//! println!("Posted: {:?}", post.id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::{PublishError, Result};
use crate::types::{PostAnalytics, Profile, PublishedPost, RecentPost};

pub mod linkedin;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// URN prefix for person authors
pub const PERSON_URN_PREFIX: &str = "urn:li:person:";

/// Prefix `author_id` with `urn:li:person:` unless it already carries it
pub fn normalize_author_urn(author_id: &str) -> String {
    let author_id = author_id.trim();
    if author_id.starts_with(PERSON_URN_PREFIX) {
        author_id.to_string()
    } else {
        format!("{}{}", PERSON_URN_PREFIX, author_id)
    }
}

/// Commentary for an article share: the title, a blank line, then the body
pub fn article_text(title: &str, description: &str) -> String {
    format!("{}\n\n{}", title.trim(), description.trim())
}

/// Platform trait for publishing posts
#[async_trait]
pub trait Platform: Send + Sync {
    /// Create a public text post
    ///
    /// # Arguments
    ///
    /// * `text` - Final post text, already within the platform limit
    /// * `author_urn` - Author in URN form (see [`normalize_author_urn`])
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Authentication` for rejected credentials,
    /// `PublishError::ContentTooLong` when the platform reports the text
    /// length was exceeded, and `PublishError::Rejected` for other refusals.
    async fn publish(&self, text: &str, author_urn: &str) -> Result<PublishedPost>;

    /// Create a public article share with `title` and `description`
    ///
    /// The commentary is [`article_text`], so the combined length is what
    /// counts against the character limit.
    async fn publish_article(
        &self,
        title: &str,
        description: &str,
        author_urn: &str,
    ) -> Result<PublishedPost>;

    /// Engagement counts for a published post
    async fn post_analytics(&self, post_id: &str) -> Result<PostAnalytics>;

    /// Profile of the account that owns the access token
    async fn fetch_profile(&self) -> Result<Profile>;

    /// Most recently modified posts by `author_urn`, at most `count`
    async fn recent_posts(&self, author_urn: &str, count: usize) -> Result<Vec<RecentPost>>;

    /// Delete a post by its platform id
    async fn delete_post(&self, post_id: &str) -> Result<()>;

    /// Lowercase platform identifier (e.g. "linkedin")
    fn name(&self) -> &str;

    /// Maximum characters per post, or `None` if there is no hard limit
    fn character_limit(&self) -> Option<usize>;

    /// Reject empty text and text over [`character_limit`](Self::character_limit)
    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PublishError::Validation("Content cannot be empty".to_string()).into());
        }

        if let Some(limit) = self.character_limit() {
            let length = content.chars().count();
            if length > limit {
                return Err(PublishError::ContentTooLong { length, limit }.into());
            }
        }

        Ok(())
    }
}
