//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that can simulate
//! successes, failures, and delays. It records every published text and
//! author so tests can check what actually reached the platform boundary.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PublishError, Result};
use crate::limits::PLATFORM_MAX_CHARS;
use crate::platforms::{article_text, Platform};
use crate::types::{PostAnalytics, Profile, PublishedPost, RecentPost};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock-linkedin")
    pub name: String,

    /// Error returned by every publish call, if set
    pub publish_error: Option<PublishError>,

    /// Error returned by profile and listing calls, if set
    pub read_error: Option<PublishError>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Character limit for validation
    pub character_limit: Option<usize>,

    /// Posts that have been made, as `(text, author_urn)`
    pub published: Arc<Mutex<Vec<(String, String)>>>,

    /// Ids passed to delete_post
    pub deleted: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            publish_error: None,
            read_error: None,
            delay: Duration::from_millis(0),
            character_limit: Some(PLATFORM_MAX_CHARS),
            published: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform whose publish calls fail with `error`
    pub fn publish_failure(name: &str, error: PublishError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            publish_error: Some(error),
            ..Default::default()
        })
    }

    /// Create a mock platform whose profile and listing calls fail with `error`
    pub fn read_failure(name: &str, error: PublishError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            read_error: Some(error),
            ..Default::default()
        })
    }

    /// Create a mock platform with a delay
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// Create a mock platform with a character limit
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    /// Get the number of times publish reached the platform
    pub fn publish_call_count(&self) -> usize {
        lock(&self.config.published).len()
    }

    /// Get all `(text, author_urn)` pairs that were published
    pub fn published(&self) -> Vec<(String, String)> {
        lock(&self.config.published).clone()
    }

    /// Get all ids that were deleted
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.config.deleted).clone()
    }

    async fn simulate_latency(&self) {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
    }

    fn check_read(&self) -> Result<()> {
        match &self.config.read_error {
            Some(error) => Err(error.clone().into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn publish(&self, text: &str, author_urn: &str) -> Result<PublishedPost> {
        self.simulate_latency().await;

        if let Some(error) = &self.config.publish_error {
            return Err(error.clone().into());
        }

        self.validate_content(text)?;

        let mut published = lock(&self.config.published);
        published.push((text.to_string(), author_urn.to_string()));

        Ok(PublishedPost {
            id: Some(format!("urn:li:share:mock-{}", uuid::Uuid::new_v4())),
        })
    }

    async fn publish_article(
        &self,
        title: &str,
        description: &str,
        author_urn: &str,
    ) -> Result<PublishedPost> {
        self.publish(&article_text(title, description), author_urn)
            .await
    }

    async fn post_analytics(&self, post_id: &str) -> Result<PostAnalytics> {
        self.simulate_latency().await;
        self.check_read()?;

        Ok(PostAnalytics {
            post_id: post_id.to_string(),
            likes: Some(0),
            comments: Some(0),
        })
    }

    async fn fetch_profile(&self) -> Result<Profile> {
        self.simulate_latency().await;
        self.check_read()?;

        Ok(Profile {
            id: "mock-person".to_string(),
            given_name: "Mock".to_string(),
            family_name: "Author".to_string(),
            display_name: "Mock Author".to_string(),
            picture_url: None,
        })
    }

    async fn recent_posts(&self, author_urn: &str, count: usize) -> Result<Vec<RecentPost>> {
        self.simulate_latency().await;
        self.check_read()?;

        // Newest first, like the real listing
        Ok(lock(&self.config.published)
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, (_, author))| author == author_urn)
            .take(count)
            .map(|(i, (text, _))| RecentPost {
                id: format!("urn:li:share:mock-{}", i),
                text: Some(text.clone()),
                created_at: None,
            })
            .collect())
    }

    async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.simulate_latency().await;
        self.check_read()?;
        lock(&self.config.deleted).push(post_id.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }
}
