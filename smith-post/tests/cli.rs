//! Command-line tests for smith-post

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Write a config pointing publishing at `base_url` and return its directory
fn setup_config(base_url: &str) -> (TempDir, String) {
    setup_config_with(base_url, "")
}

/// Like `setup_config`, with `extra` TOML appended
fn setup_config_with(base_url: &str, extra: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[publishing]
base_url = "{}"
timeout = "5s"
{}
"#,
            base_url, extra
        ),
    )
    .unwrap();
    let path = config_path.to_string_lossy().to_string();
    (temp_dir, path)
}

fn post_cmd(config_path: &str) -> Command {
    let mut cmd = Command::cargo_bin("smith-post").unwrap();
    cmd.env("POSTSMITH_CONFIG", config_path)
        .env_remove("GROQ_API_KEY")
        .env_remove("LINKEDIN_ACCESS_TOKEN")
        .env_remove("LINKEDIN_PERSON_ID")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_options() {
    Command::cargo_bin("smith-post")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--topic"));
}

#[test]
fn test_empty_stdin_exits_with_invalid_input() {
    let (_dir, config) = setup_config("http://127.0.0.1:9");

    post_cmd(&config)
        .write_stdin("")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Either a topic or post content is required"));
}

#[test]
fn test_invalid_schedule_exits_with_invalid_input() {
    let (_dir, config) = setup_config("http://127.0.0.1:9");

    post_cmd(&config)
        .args(["Hello network.", "--schedule", "next tuesday-ish"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid schedule time"));
}

#[test]
fn test_dry_run_trims_long_content_without_credentials() {
    let (_dir, config) = setup_config("http://127.0.0.1:9");
    let content = "Short sentences keep readers moving. ".repeat(100);

    let output = post_cmd(&config)
        .arg("--dry-run")
        .write_stdin(content)
        .assert()
        .success()
        .stderr(predicate::str::contains("will be truncated"))
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert!(text.trim_end().chars().count() <= 2950);
    assert!(text.starts_with("Short sentences keep readers moving."));
}

#[test]
fn test_dry_run_uses_configured_limits() {
    let (_dir, config) = setup_config_with(
        "http://127.0.0.1:9",
        "[limits]\nplatform_max_chars = 5000\n",
    );
    let content = "Clear writing scales better than meetings. ".repeat(82);

    let output = post_cmd(&config)
        .arg("--dry-run")
        .write_stdin(content.clone())
        .assert()
        .success()
        .stderr(predicate::str::contains("will be truncated").not())
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.trim_end(), content.trim());
}

#[test]
fn test_dry_run_article_prefixes_title() {
    let (_dir, config) = setup_config("http://127.0.0.1:9");

    post_cmd(&config)
        .args(["--dry-run", "--title", "What async taught us"])
        .write_stdin("Write it down first.\n")
        .assert()
        .success()
        .stdout(predicate::str::diff("What async taught us\n\nWrite it down first.\n"));
}

#[test]
fn test_publish_article_sends_article_share() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/ugcPosts")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareMediaCategory": "ARTICLE",
                    "media": [{ "title": { "text": "What async taught us" } }]
                }
            }
        })))
        .with_status(201)
        .with_header("x-restli-id", "urn:li:share:8")
        .create();
    let (_dir, config) = setup_config(&server.url());

    post_cmd(&config)
        .env("LINKEDIN_ACCESS_TOKEN", "li-test")
        .args(["Write it down first.", "--title", "What async taught us", "--author", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("linkedin:urn:li:share:8"));

    mock.assert();
}

#[test]
fn test_analytics_prints_counts() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/socialActions/urn:li:share:8")
        .with_status(200)
        .with_body(r#"{"likesSummary":{"totalLikes":4},"commentsSummary":{"aggregatedTotalComments":1}}"#)
        .create();
    let (_dir, config) = setup_config(&server.url());

    post_cmd(&config)
        .env("LINKEDIN_ACCESS_TOKEN", "li-test")
        .args(["--analytics", "urn:li:share:8"])
        .assert()
        .success()
        .stdout(predicate::str::diff("urn:li:share:8\tlikes:4\tcomments:1\n"));
}

#[test]
fn test_missing_token_is_a_config_error() {
    let (_dir, config) = setup_config("http://127.0.0.1:9");

    post_cmd(&config)
        .env("LINKEDIN_PERSON_ID", "abc123")
        .arg("Hello network.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("LINKEDIN_ACCESS_TOKEN"));
}

#[test]
fn test_publish_content_prints_post_id() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/ugcPosts")
        .match_header("authorization", "Bearer li-test")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "author": "urn:li:person:abc123"
        })))
        .with_status(201)
        .with_header("x-restli-id", "urn:li:share:7")
        .create();
    let (_dir, config) = setup_config(&server.url());

    post_cmd(&config)
        .env("LINKEDIN_ACCESS_TOKEN", "li-test")
        .env("LINKEDIN_PERSON_ID", "abc123")
        .arg("Hello network.")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("linkedin:urn:li:share:7"));

    mock.assert();
}

#[test]
fn test_expired_token_exits_with_auth_code() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/ugcPosts")
        .with_status(401)
        .with_body(r#"{"message":"Invalid access token"}"#)
        .create();
    let (_dir, config) = setup_config(&server.url());

    post_cmd(&config)
        .env("LINKEDIN_ACCESS_TOKEN", "expired")
        .args(["Hello network.", "--author", "abc123"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn test_whoami_prints_profile() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/userinfo")
        .with_status(200)
        .with_body(
            r#"{"sub":"abc123","given_name":"Ada","family_name":"Lovelace","name":"Ada Lovelace"}"#,
        )
        .create();
    let (_dir, config) = setup_config(&server.url());

    post_cmd(&config)
        .env("LINKEDIN_ACCESS_TOKEN", "li-test")
        .arg("--whoami")
        .assert()
        .success()
        .stdout(predicate::str::diff("Ada Lovelace (abc123)\n"));
}
