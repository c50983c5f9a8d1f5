//! Character budget enforcement
//!
//! Both the generation path and the publish boundary go through [`enforce`],
//! so a post is trimmed the same way no matter where it entered the pipeline.
//!
//! Lengths are counted in `char`s. Sentence detection is a plain
//! "last `.`, `?` or `!`" heuristic: abbreviations, URLs, decimals and
//! punctuation inside hashtags all count as sentence ends.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Budget applied to generated posts, leaving a margin under the platform ceiling
pub const DEFAULT_MAX_CHARS: usize = 2950;

/// Hard limit enforced by the publishing platform
pub const PLATFORM_MAX_CHARS: usize = 3000;

/// A sentence end is only used if it lies within this many chars of the cut
const SENTENCE_WINDOW: usize = 200;

/// The continuation marker is only added with more than this much headroom
const MARKER_HEADROOM: usize = 50;

pub const CONTINUATION_MARKER: &str = "\n\n[Content continued in comments...]";

/// Length limits for one deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthPolicy {
    /// Budget for generated text
    pub max_chars: usize,
    /// Ceiling above which the publish boundary trims again
    pub platform_max_chars: usize,
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            platform_max_chars: PLATFORM_MAX_CHARS,
        }
    }
}

impl LengthPolicy {
    pub fn enforce(&self, text: &str) -> String {
        enforce(text, self.max_chars)
    }

    pub fn fit_platform(&self, text: &str) -> String {
        fit_platform_limit(text, self.platform_max_chars, self.max_chars)
    }
}

/// Trim `text` to at most `max_chars` characters.
///
/// Text that already fits is returned unchanged. Otherwise the cut prefers the
/// last sentence end within the final 200 characters of the budget, drops
/// hashtag fragments shorter than three characters, and appends
/// [`CONTINUATION_MARKER`] when it still fits with headroom to spare.
pub fn enforce(text: &str, max_chars: usize) -> String {
    let length = text.chars().count();
    if length <= max_chars {
        return text.to_string();
    }

    warn!(
        length,
        max_chars, "Content too long, trimming to the character budget"
    );

    let prefix = char_prefix(text, max_chars);
    let cut = match last_sentence_end(prefix) {
        Some((char_idx, byte_end)) if char_idx + SENTENCE_WINDOW > max_chars => {
            &prefix[..byte_end]
        }
        _ => prefix,
    };

    let mut trimmed = cut
        .split('\n')
        .filter(|line| !is_hashtag_fragment(line))
        .collect::<Vec<_>>()
        .join("\n");

    if trimmed.chars().count() + MARKER_HEADROOM < max_chars {
        trimmed.push_str(CONTINUATION_MARKER);
    }

    trimmed
}

/// Publish-boundary check.
///
/// Text within `ceiling` passes untouched; anything longer is run through
/// [`enforce`] with the tighter `policy_max` budget.
pub fn fit_platform_limit(text: &str, ceiling: usize, policy_max: usize) -> String {
    if text.chars().count() <= ceiling {
        return text.to_string();
    }

    let fitted = enforce(text, policy_max.min(ceiling));
    info!(
        length = fitted.chars().count(),
        ceiling, "Content truncated at the publish boundary"
    );
    fitted
}

/// The first `max_chars` characters of `text`
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Char index and exclusive byte end of the last `.`, `?` or `!`
fn last_sentence_end(text: &str) -> Option<(usize, usize)> {
    text.char_indices()
        .enumerate()
        .filter(|(_, (_, c))| matches!(c, '.' | '?' | '!'))
        .last()
        .map(|(char_idx, (byte_idx, c))| (char_idx, byte_idx + c.len_utf8()))
}

fn is_hashtag_fragment(line: &str) -> bool {
    line.starts_with('#') && line.chars().count() < 3
}
