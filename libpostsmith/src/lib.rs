//! Postsmith - LinkedIn post drafting and publishing
//!
//! This library turns a topic into a LinkedIn-ready post with an
//! OpenAI-compatible generation API, cleans and length-checks the result,
//! and publishes it through the LinkedIn UGC posts API.

pub mod config;
pub mod error;
pub mod hashtags;
pub mod limits;
pub mod logging;
pub mod models;
pub mod platforms;
pub mod prompt;
pub mod providers;
pub mod sanitize;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{PostsmithError, Result};
pub use service::PostsmithService;
pub use types::{
    GeneratedPost, PostAnalytics, PostLength, PostRequest, PostTone, PublishResult,
};
