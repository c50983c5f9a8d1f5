//! Hashtag extraction from finished post text

/// Upper bound on hashtags reported for a post
pub const MAX_HASHTAGS: usize = 4;

/// Collect up to `limit` distinct hashtags from `text`, in order of appearance.
///
/// A hashtag is a whitespace-separated token starting with `#` followed by at
/// least one alphanumeric character. Trailing punctuation is dropped and
/// duplicates are compared case-insensitively.
pub fn extract_hashtags(text: &str, limit: usize) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for token in text.split_whitespace() {
        if tags.len() >= limit {
            break;
        }

        let Some(tag) = normalize_tag(token) else {
            continue;
        };

        let folded = tag.to_lowercase();
        if !tags.iter().any(|t| t.to_lowercase() == folded) {
            tags.push(tag);
        }
    }

    tags
}

/// Keep the tokens of a provider reply that start with `#`, at most `count`
pub fn parse_hashtag_reply(reply: &str, count: usize) -> Vec<String> {
    reply
        .split_whitespace()
        .filter(|token| token.starts_with('#'))
        .take(count)
        .map(str::to_string)
        .collect()
}

fn normalize_tag(token: &str) -> Option<String> {
    let body = token.strip_prefix('#')?;
    let body: String = body
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if body.chars().any(char::is_alphanumeric) {
        Some(format!("#{}", body))
    } else {
        None
    }
}
