//! Model catalog and fallback classification
//!
//! The catalog maps short tier keys ("fast", "quality", ...) to provider model
//! ids. It is built once from configuration and never mutated; the active
//! model lives in the generation service.

use tracing::warn;

/// Tier used when nothing (or something unknown) is requested
pub const DEFAULT_TIER: &str = "quality";

/// Tier used after the primary model reports that it is gone
pub const FALLBACK_TIER: &str = "fast";

/// The compound system rejects `top_p`
pub const COMPOUND_MODEL: &str = "compound-beta";

const DEFAULT_MODELS: &[(&str, &str)] = &[
    ("fast", "llama-3.1-8b-instant"),
    ("balanced", "gemma2-9b-it"),
    ("quality", "llama-3.3-70b-versatile"),
    ("compound", COMPOUND_MODEL),
];

/// Ordered `(key, model_id)` pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<(String, String)>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_MODELS
                .iter()
                .map(|(key, id)| (key.to_string(), id.to_string())),
        )
    }
}

impl ModelCatalog {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Default catalog with `overrides` replacing or extending entries by key
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut catalog = Self::default();
        for (key, id) in overrides {
            match catalog.entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = id.clone(),
                None => catalog.entries.push((key.clone(), id.clone())),
            }
        }
        catalog
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Model id for a tier key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, id)| id.as_str())
    }

    pub fn contains_id(&self, model_id: &str) -> bool {
        self.entries.iter().any(|(_, id)| id == model_id)
    }

    pub fn default_model(&self) -> String {
        self.get(DEFAULT_TIER)
            .or_else(|| self.entries.first().map(|(_, id)| id.as_str()))
            .unwrap_or_default()
            .to_string()
    }

    pub fn fallback_model(&self) -> Option<&str> {
        self.get(FALLBACK_TIER)
    }

    /// Resolve a tier key or model id.
    ///
    /// A known model id is taken as-is, a known key maps to its id, and
    /// anything else (including `None`) gives the default tier.
    pub fn resolve(&self, requested: Option<&str>) -> String {
        let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.default_model();
        };

        if self.contains_id(requested) {
            return requested.to_string();
        }

        if let Some(id) = self.get(requested) {
            return id.to_string();
        }

        warn!(
            requested,
            available = ?self.keys(),
            "Unknown model, using the default tier"
        );
        self.default_model()
    }
}

/// How a failed completion should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The model is gone: retry once on the fallback tier
    ModelRetired,
    /// Answer with the rate-limit advisory instead of failing
    RateLimited,
    /// Propagate unchanged
    Other,
}

/// Classify a provider error message.
///
/// Plain substring checks; "rate" also matches words like "accurate", which
/// is accepted as part of the heuristic.
pub fn classify_failure(message: &str) -> FailureClass {
    let lower = message.to_lowercase();

    if lower.contains("model") && (lower.contains("decommissioned") || lower.contains("deprecated"))
    {
        FailureClass::ModelRetired
    } else if lower.contains("rate") || lower.contains("quota") || lower.contains("429") {
        FailureClass::RateLimited
    } else {
        FailureClass::Other
    }
}

/// Canned text returned in place of a post while the provider is throttling
pub fn rate_limit_advisory(topic: &str, model: &str) -> String {
    format!(
        "⚠️ Rate limit reached for the generation API.\n\
         Please wait a moment before generating more content.\n\
         \n\
         Topic requested: {topic}\n\
         \n\
         Current model: {model}\n\
         Try switching to a faster model like 'fast' for higher rate limits.\n\
         \n\
         Visit: https://console.groq.com/docs/rate-limits for more info."
    )
}
