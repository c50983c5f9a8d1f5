//! Request validation service
//!
//! Checks a post request before any provider is called: something to post
//! must be present, the schedule time must parse, and over-long supplied
//! content is flagged because it will be truncated at the publish boundary.

use crate::error::{PostsmithError, Result};
use crate::limits::LengthPolicy;
use crate::types::PostRequest;
use chrono::{DateTime, NaiveDateTime};

/// Maximum request content size in bytes (100KB)
const MAX_CONTENT_LENGTH: usize = 100 * 1024;

/// Accepted non-RFC 3339 schedule format
const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Service for validating post requests
///
/// # Example
///
/// ```
/// use libpostsmith::limits::LengthPolicy;
/// use libpostsmith::service::validation::ValidationService;
/// use libpostsmith::PostRequest;
///
/// let service = ValidationService::new(LengthPolicy::default());
/// let report = service.validate(&PostRequest::for_topic("remote work tips"));
/// assert!(report.valid);
/// ```
#[derive(Debug, Clone)]
pub struct ValidationService {
    policy: LengthPolicy,
}

/// Validation outcome for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// True when there are no errors
    pub valid: bool,
    /// Blocking problems
    pub errors: Vec<String>,
    /// Non-blocking notes
    pub warnings: Vec<String>,
}

impl ValidationService {
    pub fn new(policy: LengthPolicy) -> Self {
        Self { policy }
    }

    /// Validate a request
    ///
    /// Errors: neither topic nor content present, unparsable schedule time,
    /// content over 100KB. Warnings: content over the platform ceiling,
    /// schedule time set at all.
    pub fn validate(&self, request: &PostRequest) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if request.topic_text().is_none() && request.content_text().is_none() {
            errors.push("Either a topic or post content is required".to_string());
        }

        if let Some(content) = request.content_text() {
            if content.len() > MAX_CONTENT_LENGTH {
                errors.push(format!(
                    "Content size ({} bytes) exceeds maximum allowed size ({} bytes)",
                    content.len(),
                    MAX_CONTENT_LENGTH
                ));
            }

            let char_count = content.chars().count();
            if char_count > self.policy.platform_max_chars {
                warnings.push(format!(
                    "Content length ({} characters) exceeds the platform limit of {} characters and will be truncated",
                    char_count, self.policy.platform_max_chars
                ));
            }
        }

        if let Some(schedule) = request
            .schedule_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            if parse_schedule_time(schedule) {
                warnings.push(
                    "Scheduling is not supported; the post will be handled immediately".to_string(),
                );
            } else {
                errors.push(format!(
                    "Invalid schedule time '{}'. Use RFC 3339 or 'YYYY-MM-DD HH:MM'",
                    schedule
                ));
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// The trimmed topic, or `InvalidInput("Topic is required")`
    pub fn require_topic<'a>(&self, request: &'a PostRequest) -> Result<&'a str> {
        request
            .topic_text()
            .ok_or_else(|| PostsmithError::InvalidInput("Topic is required".to_string()))
    }

    /// Fail with `InvalidInput` carrying every error in the report
    pub fn ensure_valid(&self, request: &PostRequest) -> Result<ValidationReport> {
        let report = self.validate(request);
        if report.valid {
            Ok(report)
        } else {
            Err(PostsmithError::InvalidInput(report.errors.join("; ")))
        }
    }
}

fn parse_schedule_time(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, SCHEDULE_FORMAT).is_ok()
}
