//! LinkedIn platform implementation
//!
//! Posts through the UGC posts API, reads engagement through `socialActions`
//! and reads the account through the OpenID Connect userinfo endpoint. All
//! requests carry the `X-Restli-Protocol-Version: 2.0.0` header.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{PublishError, Result};
use crate::limits::PLATFORM_MAX_CHARS;
use crate::platforms::{article_text, Platform};
use crate::types::{PostAnalytics, Profile, PublishedPost, RecentPost};

const RESTLI_HEADER: &str = "X-Restli-Protocol-Version";
const RESTLI_VERSION: &str = "2.0.0";
const SHARE_CONTENT: &str = "com.linkedin.ugc.ShareContent";

/// Public feed URL for a post id
pub fn post_url(post_id: &str) -> String {
    format!("https://www.linkedin.com/feed/update/{}", post_id)
}

/// Map an unsuccessful LinkedIn response to a publish error
fn map_linkedin_error(status: u16, body: &str, context: &str) -> PublishError {
    let body = if body.trim().is_empty() {
        "empty response body"
    } else {
        body
    };

    match status {
        401 | 403 => PublishError::Authentication(format!(
            "LinkedIn rejected the access token ({}): HTTP {} {}. \
                Suggestion: Generate a new token with the w_member_social scope.",
            context, status, body
        )),
        429 => PublishError::RateLimit(format!(
            "LinkedIn rate limit exceeded ({}): {}",
            context, body
        )),
        _ => PublishError::Rejected {
            status,
            message: format!("{}: {}", context, body),
        },
    }
}

/// True when a rejection body says the text was too long
fn is_length_rejection(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("text length") && lower.contains("exceeded")
}

fn map_request_error(error: reqwest::Error, context: &str) -> PublishError {
    if error.is_timeout() {
        PublishError::Timeout(format!("LinkedIn request timed out ({})", context))
    } else {
        PublishError::Network(format!("LinkedIn request failed ({}): {}", context, error))
    }
}

/// LinkedIn platform client
pub struct LinkedInClient {
    client: reqwest::Client,
    base_url: String,
    access_token: SecretString,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
    #[serde(default)]
    name: String,
    picture: Option<String>,
}

impl LinkedInClient {
    /// Create a new LinkedIn client
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, normally `https://api.linkedin.com/v2`
    /// * `access_token` - OAuth bearer token with posting rights
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, access_token: SecretString, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PublishError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Create a LinkedIn client from the `[publishing]` section
    ///
    /// The token comes from `LINKEDIN_ACCESS_TOKEN` or `publishing.token_file`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.publishing.base_url.clone(),
            config.publishing_token()?,
            config.publishing_timeout()?,
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, path))
            .bearer_auth(self.access_token.expose_secret())
            .header(RESTLI_HEADER, RESTLI_VERSION)
    }

    /// Send a request and turn a non-success status into a `PublishError`
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        context: &str,
    ) -> std::result::Result<reqwest::Response, PublishError> {
        let response = builder
            .send()
            .await
            .map_err(|e| map_request_error(e, context))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_linkedin_error(status.as_u16(), &body, context))
    }

    /// POST a UGC share and read the new post id from the body or `x-restli-id`
    async fn create_share(&self, body: &Value, text: &str, context: &str) -> Result<PublishedPost> {
        let length = text.chars().count();
        let builder = self.request(reqwest::Method::POST, "ugcPosts").json(body);

        let response = match self.send(builder, context).await {
            Ok(response) => response,
            Err(PublishError::Rejected { message, .. }) if is_length_rejection(&message) => {
                tracing::error!(length, "LinkedIn reported the text length was exceeded");
                return Err(PublishError::ContentTooLong {
                    length,
                    limit: PLATFORM_MAX_CHARS,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(header_id);

        tracing::info!(post_id = ?id, length, "LinkedIn post created");

        Ok(PublishedPost { id })
    }
}

/// UGC share body for a public post
///
/// With `article`, the share carries a `(title, description)` media entry and
/// the `ARTICLE` media category.
fn share_body(text: &str, author_urn: &str, article: Option<(&str, &str)>) -> Value {
    let mut content = json!({
        "shareCommentary": { "text": text },
        "shareMediaCategory": "NONE"
    });

    if let Some((title, description)) = article {
        content["shareMediaCategory"] = json!("ARTICLE");
        content["media"] = json!([{
            "status": "READY",
            "title": { "text": title },
            "description": { "text": description }
        }]);
    }

    json!({
        "author": author_urn,
        "lifecycleState": "PUBLISHED",
        "specificContent": { SHARE_CONTENT: content },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
        }
    })
}

/// Engagement counts from a `socialActions` response
fn parse_analytics(post_id: &str, body: &Value) -> PostAnalytics {
    let count = |pointer: &str| body.pointer(pointer).and_then(Value::as_u64);

    PostAnalytics {
        post_id: post_id.to_string(),
        likes: count("/likesSummary/totalLikes"),
        comments: count("/commentsSummary/aggregatedTotalComments")
            .or_else(|| count("/commentsSummary/totalFirstLevelComments")),
    }
}

fn parse_recent_post(element: &Value) -> Option<RecentPost> {
    let id = element.get("id")?.as_str()?.to_string();
    let text = element
        .pointer(&format!("/specificContent/{}/shareCommentary/text", SHARE_CONTENT))
        .and_then(Value::as_str)
        .map(str::to_string);
    let created_at = element.pointer("/created/time").and_then(Value::as_i64);

    Some(RecentPost {
        id,
        text,
        created_at,
    })
}

#[async_trait]
impl Platform for LinkedInClient {
    async fn publish(&self, text: &str, author_urn: &str) -> Result<PublishedPost> {
        self.validate_content(text)?;
        self.create_share(&share_body(text, author_urn, None), text, "create post")
            .await
    }

    async fn publish_article(
        &self,
        title: &str,
        description: &str,
        author_urn: &str,
    ) -> Result<PublishedPost> {
        let text = article_text(title, description);
        self.validate_content(&text)?;
        self.create_share(
            &share_body(&text, author_urn, Some((title.trim(), description.trim()))),
            &text,
            "create article",
        )
        .await
    }

    async fn fetch_profile(&self) -> Result<Profile> {
        let response = self
            .send(self.request(reqwest::Method::GET, "userinfo"), "fetch profile")
            .await?;

        let info: UserInfo = response.json().await.map_err(|e| PublishError::Rejected {
            status: 200,
            message: format!("fetch profile: unexpected userinfo response: {}", e),
        })?;

        Ok(Profile {
            id: info.sub,
            given_name: info.given_name,
            family_name: info.family_name,
            display_name: info.name,
            picture_url: info.picture,
        })
    }

    async fn recent_posts(&self, author_urn: &str, count: usize) -> Result<Vec<RecentPost>> {
        let count = count.to_string();
        let builder = self.request(reqwest::Method::GET, "ugcPosts").query(&[
            ("q", "authors"),
            ("authors", author_urn),
            ("count", count.as_str()),
            ("sortBy", "LAST_MODIFIED"),
        ]);

        let response = self.send(builder, "list posts").await?;
        let body: Value = response.json().await.map_err(|e| PublishError::Rejected {
            status: 200,
            message: format!("list posts: unexpected response: {}", e),
        })?;

        Ok(body
            .get("elements")
            .and_then(Value::as_array)
            .map(|elements| elements.iter().filter_map(parse_recent_post).collect())
            .unwrap_or_default())
    }

    async fn delete_post(&self, post_id: &str) -> Result<()> {
        let response = self
            .send(
                self.request(reqwest::Method::DELETE, &format!("ugcPosts/{}", post_id)),
                "delete post",
            )
            .await?;

        let status = response.status().as_u16();
        if status != 204 {
            return Err(PublishError::Rejected {
                status,
                message: format!("delete post: expected 204 No Content, got {}", status),
            }
            .into());
        }

        tracing::info!(post_id, "LinkedIn post deleted");
        Ok(())
    }

    async fn post_analytics(&self, post_id: &str) -> Result<PostAnalytics> {
        let response = self
            .send(
                self.request(reqwest::Method::GET, &format!("socialActions/{}", post_id)),
                "post analytics",
            )
            .await?;

        let body: Value = response.json().await.map_err(|e| PublishError::Rejected {
            status: 200,
            message: format!("post analytics: unexpected response: {}", e),
        })?;

        Ok(parse_analytics(post_id, &body))
    }

    fn name(&self) -> &str {
        "linkedin"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(PLATFORM_MAX_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostsmithError;
    use mockito::Matcher;

    fn client(url: &str) -> LinkedInClient {
        LinkedInClient::new(
            url,
            SecretString::from("li-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_publish_sends_ugc_share() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ugcPosts")
            .match_header("authorization", "Bearer li-token")
            .match_header("x-restli-protocol-version", "2.0.0")
            .match_body(Matcher::PartialJson(json!({
                "author": "urn:li:person:abc123",
                "lifecycleState": "PUBLISHED",
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareCommentary": { "text": "Hello network" },
                        "shareMediaCategory": "NONE"
                    }
                },
                "visibility": { "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC" }
            })))
            .with_status(201)
            .with_body(r#"{"id":"urn:li:share:42"}"#)
            .create_async()
            .await;

        let post = client(&server.url())
            .publish("Hello network", "urn:li:person:abc123")
            .await
            .unwrap();

        assert_eq!(post.id.as_deref(), Some("urn:li:share:42"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_publish_reads_id_from_header() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/ugcPosts")
            .with_status(201)
            .with_header("x-restli-id", "urn:li:share:7")
            .create_async()
            .await;

        let post = client(&server.url())
            .publish("Hello", "urn:li:person:abc123")
            .await
            .unwrap();
        assert_eq!(post.id.as_deref(), Some("urn:li:share:7"));
    }

    #[tokio::test]
    async fn test_publish_length_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/ugcPosts")
            .with_status(422)
            .with_body(r#"{"message":"ShareCommentary text length exceeded the maximum allowed"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .publish("Hello", "urn:li:person:abc123")
            .await
            .unwrap_err();

        match err {
            PostsmithError::Publish(PublishError::ContentTooLong { length, limit }) => {
                assert_eq!(length, 5);
                assert_eq!(limit, 3000);
            }
            other => panic!("Expected ContentTooLong, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/ugcPosts")
            .with_status(401)
            .with_body("Invalid access token")
            .create_async()
            .await;

        let err = client(&server.url())
            .publish("Hello", "urn:li:person:abc123")
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Invalid access token"));
    }

    #[tokio::test]
    async fn test_publish_rejects_over_limit_before_sending() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ugcPosts")
            .expect(0)
            .create_async()
            .await;

        let err = client(&server.url())
            .publish(&"a".repeat(3001), "urn:li:person:abc123")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PostsmithError::Publish(PublishError::ContentTooLong { .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_profile_maps_userinfo() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/userinfo")
            .with_status(200)
            .with_body(
                r#"{"sub":"abc123","given_name":"Ada","family_name":"Lovelace","name":"Ada Lovelace","picture":"https://example.com/a.png"}"#,
            )
            .create_async()
            .await;

        let profile = client(&server.url()).fetch_profile().await.unwrap();
        assert_eq!(profile.id, "abc123");
        assert_eq!(profile.display_name, "Ada Lovelace");
        assert_eq!(profile.picture_url.as_deref(), Some("https://example.com/a.png"));
    }

    #[tokio::test]
    async fn test_recent_posts_query_and_parsing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ugcPosts")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "authors".into()),
                Matcher::UrlEncoded("authors".into(), "urn:li:person:abc123".into()),
                Matcher::UrlEncoded("count".into(), "2".into()),
                Matcher::UrlEncoded("sortBy".into(), "LAST_MODIFIED".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"elements":[
                    {"id":"urn:li:share:1","created":{"time":1700000000000},
                     "specificContent":{"com.linkedin.ugc.ShareContent":{"shareCommentary":{"text":"First"}}}},
                    {"id":"urn:li:share:2"}
                ]}"#,
            )
            .create_async()
            .await;

        let posts = client(&server.url())
            .recent_posts("urn:li:person:abc123", 2)
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text.as_deref(), Some("First"));
        assert_eq!(posts[0].created_at, Some(1_700_000_000_000));
        assert_eq!(posts[1].text, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_post_expects_no_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/ugcPosts/urn:li:share:1")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("DELETE", "/ugcPosts/urn:li:share:2")
            .with_status(200)
            .create_async()
            .await;

        let client = client(&server.url());
        assert!(client.delete_post("urn:li:share:1").await.is_ok());

        let err = client.delete_post("urn:li:share:2").await.unwrap_err();
        assert!(err.to_string().contains("expected 204"));
    }

    #[tokio::test]
    async fn test_publish_article_sends_article_media() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ugcPosts")
            .match_body(Matcher::PartialJson(json!({
                "author": "urn:li:person:abc123",
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareCommentary": { "text": "Async by default\n\nWrite it down first." },
                        "shareMediaCategory": "ARTICLE",
                        "media": [{
                            "status": "READY",
                            "title": { "text": "Async by default" },
                            "description": { "text": "Write it down first." }
                        }]
                    }
                }
            })))
            .with_status(201)
            .with_header("x-restli-id", "urn:li:share:9")
            .create_async()
            .await;

        let post = client(&server.url())
            .publish_article("Async by default", "Write it down first.", "urn:li:person:abc123")
            .await
            .unwrap();

        assert_eq!(post.id.as_deref(), Some("urn:li:share:9"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_publish_article_checks_combined_length() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ugcPosts")
            .expect(0)
            .create_async()
            .await;

        let err = client(&server.url())
            .publish_article("Title", &"a".repeat(2995), "urn:li:person:abc123")
            .await
            .unwrap_err();

        match err {
            PostsmithError::Publish(PublishError::ContentTooLong { length, .. }) => {
                assert_eq!(length, 3002);
            }
            other => panic!("Expected ContentTooLong, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_analytics_reads_summaries() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/socialActions/urn:li:share:42")
            .match_header("authorization", "Bearer li-token")
            .with_status(200)
            .with_body(
                r#"{"likesSummary":{"totalLikes":12},"commentsSummary":{"totalFirstLevelComments":3,"aggregatedTotalComments":5}}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/socialActions/urn:li:share:43")
            .with_status(200)
            .with_body(r#"{"commentsSummary":{"totalFirstLevelComments":2}}"#)
            .create_async()
            .await;

        let client = client(&server.url());
        let stats = client.post_analytics("urn:li:share:42").await.unwrap();
        assert_eq!(stats.post_id, "urn:li:share:42");
        assert_eq!(stats.likes, Some(12));
        assert_eq!(stats.comments, Some(5));

        let stats = client.post_analytics("urn:li:share:43").await.unwrap();
        assert_eq!(stats.likes, None);
        assert_eq!(stats.comments, Some(2));
    }

    #[tokio::test]
    async fn test_post_analytics_permission_denied() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/socialActions/urn:li:share:42")
            .with_status(403)
            .with_body("Not enough permissions to access: socialActions")
            .create_async()
            .await;

        let err = client(&server.url())
            .post_analytics("urn:li:share:42")
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("post analytics"));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            map_linkedin_error(403, "forbidden", "create post"),
            PublishError::Authentication(_)
        ));
        assert!(matches!(
            map_linkedin_error(429, "slow down", "create post"),
            PublishError::RateLimit(_)
        ));
        match map_linkedin_error(500, "", "create post") {
            PublishError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("empty response body"));
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
        assert!(is_length_rejection("Text Length of commentary Exceeded"));
        assert!(!is_length_rejection("text too long"));
    }

    #[test]
    fn test_post_url() {
        assert_eq!(
            post_url("urn:li:share:42"),
            "https://www.linkedin.com/feed/update/urn:li:share:42"
        );
    }
}
