//! Configuration management for Postsmith
//!
//! Settings come from a TOML file; credentials come from the environment or
//! from token files referenced by the config. A missing default config file
//! is not an error: every setting has a default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::limits::LengthPolicy;
use crate::models::ModelCatalog;

pub const CONFIG_ENV: &str = "POSTSMITH_CONFIG";
pub const GENERATION_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const PUBLISHING_TOKEN_ENV: &str = "LINKEDIN_ACCESS_TOKEN";
pub const AUTHOR_ID_ENV: &str = "LINKEDIN_PERSON_ID";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub limits: LengthPolicy,
    /// Extra or replacement model tiers, keyed by tier name
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// OpenAI-compatible API root, without `/chat/completions`
    pub base_url: String,
    /// Tier key or model id; the quality tier when unset
    pub model: Option<String>,
    pub api_key_file: Option<String>,
    /// humantime duration, e.g. "60s"
    pub timeout: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: None,
            api_key_file: None,
            timeout: "60s".to_string(),
            max_tokens: 800,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    pub base_url: String,
    pub token_file: Option<String>,
    /// Person id or `urn:li:person:` URN of the posting account
    pub author_id: Option<String>,
    pub timeout: String,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.linkedin.com/v2".to_string(),
            token_file: None,
            author_id: None,
            timeout: "30s".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// An explicit `POSTSMITH_CONFIG` path must exist; the XDG default may be
    /// absent, in which case defaults are used.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_ENV).is_ok();
        let config_path = resolve_config_path()?;

        if !explicit && !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_chars == 0 {
            return Err(invalid("limits.max_chars", "must be greater than zero"));
        }
        if self.limits.max_chars > self.limits.platform_max_chars {
            return Err(invalid(
                "limits.max_chars",
                &format!(
                    "{} exceeds limits.platform_max_chars ({})",
                    self.limits.max_chars, self.limits.platform_max_chars
                ),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(invalid("generation.temperature", "must be between 0 and 2"));
        }
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(invalid("generation.top_p", "must be between 0 and 1"));
        }
        self.generation_timeout()?;
        self.publishing_timeout()?;
        Ok(())
    }

    pub fn generation_timeout(&self) -> Result<Duration> {
        parse_timeout("generation.timeout", &self.generation.timeout)
    }

    pub fn publishing_timeout(&self) -> Result<Duration> {
        parse_timeout("publishing.timeout", &self.publishing.timeout)
    }

    pub fn model_catalog(&self) -> ModelCatalog {
        ModelCatalog::with_overrides(&self.models)
    }

    /// Generation API key: `GROQ_API_KEY`, else `generation.api_key_file`
    pub fn generation_api_key(&self) -> Result<SecretString> {
        read_secret(
            GENERATION_API_KEY_ENV,
            self.generation.api_key_file.as_deref(),
            "generation.api_key_file",
        )
    }

    /// Publishing access token: `LINKEDIN_ACCESS_TOKEN`, else `publishing.token_file`
    pub fn publishing_token(&self) -> Result<SecretString> {
        read_secret(
            PUBLISHING_TOKEN_ENV,
            self.publishing.token_file.as_deref(),
            "publishing.token_file",
        )
    }

    /// Author id: `LINKEDIN_PERSON_ID`, else `publishing.author_id`
    pub fn author_id(&self) -> Option<String> {
        std::env::var(AUTHOR_ID_ENV)
            .ok()
            .or_else(|| self.publishing.author_id.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

fn invalid(field: &str, message: &str) -> crate::error::PostsmithError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}

fn parse_timeout(field: &str, value: &str) -> Result<Duration> {
    let duration = humantime::parse_duration(value.trim())
        .map_err(|e| invalid(field, &format!("'{}': {}", value, e)))?;
    if duration.is_zero() {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(duration)
}

fn read_secret(env_var: &str, file: Option<&str>, field: &str) -> Result<SecretString> {
    if let Ok(value) = std::env::var(env_var) {
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }

    let Some(file) = file else {
        return Err(ConfigError::MissingField(format!("{} (or set {})", field, env_var)).into());
    };

    let path = shellexpand::full(file)
        .map_err(|e| invalid(field, &format!("cannot expand path: {}", e)))?;
    let value = std::fs::read_to_string(path.as_ref())
        .map_err(ConfigError::ReadError)?
        .trim()
        .to_string();

    if value.is_empty() {
        return Err(invalid(field, "file is empty"));
    }

    Ok(SecretString::from(value))
}

/// Resolve the configuration file path following the XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postsmith").join("config.toml"))
}
