//! Error types for Postsmith

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostsmithError>;

#[derive(Error, Debug)]
pub enum PostsmithError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PostsmithError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PostsmithError::InvalidInput(_) => 3,
            PostsmithError::Publish(PublishError::Authentication(_)) => 2,
            PostsmithError::Publish(_) => 1,
            PostsmithError::Generation(_) => 1,
            PostsmithError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Failure reported by a generation provider.
///
/// The rendered message is what the model fallback policy inspects, so the
/// API variant keeps the HTTP status in front of the provider's own body.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Text inspected by the fallback policy
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }
}

#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Model fallback exhausted (primary: {primary}; fallback: {fallback})")]
    FallbackExhausted { primary: String, fallback: String },

    #[error("Provider request timed out: {0}")]
    Timeout(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,
}

#[derive(Error, Debug, Clone)]
pub enum PublishError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Post rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Content too long ({length} characters, limit is {limit})")]
    ContentTooLong { length: usize, limit: usize },

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Content validation failed: {0}")]
    Validation(String),
}
