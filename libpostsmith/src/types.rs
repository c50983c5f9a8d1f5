//! Core types for Postsmith

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Voice the generated post should take
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostTone {
    #[default]
    Professional,
    Casual,
    Inspirational,
    Educational,
    Promotional,
}

impl PostTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Inspirational => "inspirational",
            Self::Educational => "educational",
            Self::Promotional => "promotional",
        }
    }
}

impl std::str::FromStr for PostTone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "professional" => Ok(Self::Professional),
            "casual" => Ok(Self::Casual),
            "inspirational" => Ok(Self::Inspirational),
            "educational" => Ok(Self::Educational),
            "promotional" => Ok(Self::Promotional),
            other => Err(format!(
                "Invalid tone: '{}'. Valid options: professional, casual, inspirational, educational, promotional",
                other
            )),
        }
    }
}

impl std::fmt::Display for PostTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target size of the generated post
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl PostLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl std::str::FromStr for PostLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(format!(
                "Invalid length: '{}'. Valid options: short, medium, long",
                other
            )),
        }
    }
}

impl std::fmt::Display for PostLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to draft and/or publish a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostRequest {
    pub topic: Option<String>,
    /// Pre-written text; when present no generation is needed
    pub content: Option<String>,
    #[serde(default)]
    pub tone: PostTone,
    #[serde(default)]
    pub length: PostLength,
    #[serde(default = "default_include_hashtags")]
    pub include_hashtags: bool,
    pub target_audience: Option<String>,
    pub call_to_action: Option<String>,
    pub schedule_time: Option<String>,
}

fn default_include_hashtags() -> bool {
    true
}

impl Default for PostRequest {
    fn default() -> Self {
        Self {
            topic: None,
            content: None,
            tone: PostTone::default(),
            length: PostLength::default(),
            include_hashtags: true,
            target_audience: None,
            call_to_action: None,
            schedule_time: None,
        }
    }
}

impl PostRequest {
    /// Request generation for a topic with default tone and length
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Default::default()
        }
    }

    /// Trimmed topic, if it is non-blank
    pub fn topic_text(&self) -> Option<&str> {
        non_blank(self.topic.as_deref())
    }

    /// Trimmed pre-written content, if it is non-blank
    pub fn content_text(&self) -> Option<&str> {
        non_blank(self.content.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Output of the generation pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedPost {
    pub text: String,
    pub hashtags: Vec<String>,
    /// Model id that produced (or would have produced) the text
    pub model: String,
    /// True when `text` is the rate-limit advisory instead of model output
    pub rate_limited: bool,
}

/// Outcome of handing a post to the publishing platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishResult {
    pub success: bool,
    pub external_post_id: Option<String>,
    pub final_text: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub url: Option<String>,
}

/// What a platform reports for a freshly created post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedPost {
    /// Platform post id; `None` if the platform accepted the post without echoing one
    pub id: Option<String>,
}

/// Account profile as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub display_name: String,
    pub picture_url: Option<String>,
}

/// A post previously published by the author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentPost {
    pub id: String,
    pub text: Option<String>,
    /// Milliseconds since the Unix epoch
    pub created_at: Option<i64>,
}

/// Engagement counts for a published post
///
/// A count is `None` when the platform omitted its summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostAnalytics {
    pub post_id: String,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
}
