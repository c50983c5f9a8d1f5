//! Cleanup of raw model output
//!
//! Models regularly echo parts of the prompt back ("CRITICAL:", "Tone: ...",
//! "Here's a LinkedIn post about ...") or leave short bullet instructions in
//! the draft. Those lines are removed before the text is length-checked.

use tracing::warn;

/// Lines containing any of these (case-insensitively) are dropped.
/// Matched in order; the first hit decides.
pub const LEAK_PHRASES: &[&str] = &[
    "here's a linkedin post about",
    "here's a professional linkedin post",
    "linkedin post:",
    "content requirements:",
    "requirements:",
    "instructions:",
    "write the linkedin post:",
    "generate the post content now:",
    "post content:",
    "critical:",
    "length:",
    "tone:",
    "focus:",
    "target audience:",
    "end with:",
    "include 3-4",
    "- write",
    "- use",
    "- include",
    "- provide",
    "- sound like",
];

/// Dash-prefixed lines with fewer tokens than this are treated as leftover instructions
const MIN_BULLET_TOKENS: usize = 8;

/// Cleaned output shorter than this is suspicious
const LOW_CONFIDENCE_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    /// Set when the cleaned text is so short that the output was probably mangled
    pub low_confidence: bool,
}

/// Remove instruction leaks and stray prompt bullets from `raw`.
///
/// Never fails: input made up entirely of leaked lines comes back empty with
/// `low_confidence` set.
pub fn sanitize(raw: &str) -> Sanitized {
    let mut kept: Vec<&str> = Vec::new();

    for line in raw.split('\n') {
        let line = line.trim();

        if leak_phrase(line).is_some() {
            continue;
        }

        if line.is_empty() && kept.is_empty() {
            continue;
        }

        if line.starts_with('-') && line.split_whitespace().count() < MIN_BULLET_TOKENS {
            continue;
        }

        kept.push(line);
    }

    let text = kept.join("\n").trim().to_string();
    let low_confidence = text.chars().count() < LOW_CONFIDENCE_CHARS;
    if low_confidence {
        warn!(
            length = text.chars().count(),
            "Content seems too short after cleaning"
        );
    }

    Sanitized {
        text,
        low_confidence,
    }
}

/// The first leak phrase contained in `line`, if any
pub fn leak_phrase(line: &str) -> Option<&'static str> {
    let lower = line.to_lowercase();
    LEAK_PHRASES
        .iter()
        .copied()
        .find(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "Remote work changed how teams communicate, and the best teams write things down.";

    #[test]
    fn test_clean_text_passes_through() {
        let result = sanitize(BODY);
        assert_eq!(result.text, BODY);
        assert!(!result.low_confidence);
    }

    #[test]
    fn test_removes_critical_line() {
        let raw = format!("CRITICAL: stay under limit\n{}", BODY);
        let result = sanitize(&raw);
        assert_eq!(result.text, BODY);
        assert!(!result.text.contains("CRITICAL"));
    }

    #[test]
    fn test_removes_every_leak_phrase() {
        for phrase in LEAK_PHRASES {
            let raw = format!("{}\n  {} something  \n", BODY, phrase.to_uppercase());
            let result = sanitize(&raw);
            assert_eq!(result.text, BODY, "phrase {:?} leaked", phrase);
        }
    }

    #[test]
    fn test_preamble_and_instruction_echoes_removed() {
        let raw = "Here's a LinkedIn post about remote work tips:\n\
                   \n\
                   Tone: conversational but knowledgeable\n\
                   Target audience: team leads\n\
                   Working remotely is a skill, and like any skill it improves with practice.\n\
                   \n\
                   What's your experience with remote work tips?";
        let result = sanitize(raw);
        assert_eq!(
            result.text,
            "Working remotely is a skill, and like any skill it improves with practice.\n\
             \n\
             What's your experience with remote work tips?"
        );
    }

    #[test]
    fn test_leading_blank_lines_dropped_inner_kept() {
        let raw = format!("\n\n   \n{}\n\n{}", BODY, BODY);
        let result = sanitize(&raw);
        assert_eq!(result.text, format!("{}\n\n{}", BODY, BODY));
    }

    #[test]
    fn test_short_dash_lines_dropped_long_ones_kept() {
        let long_bullet = "- Async standups save every engineer at least twenty minutes a day";
        let raw = format!("{}\n- Keep it short\n{}", BODY, long_bullet);
        let result = sanitize(&raw);
        assert_eq!(result.text, format!("{}\n{}", BODY, long_bullet));
    }

    #[test]
    fn test_only_leaks_yields_empty_low_confidence() {
        let raw = "CRITICAL: under 2900\nLength: short\nTone: casual\nInclude 3-4 hashtags";
        let result = sanitize(raw);
        assert_eq!(result.text, "");
        assert!(result.low_confidence);
    }

    #[test]
    fn test_short_output_flagged_but_returned() {
        let result = sanitize("Short but real.");
        assert_eq!(result.text, "Short but real.");
        assert!(result.low_confidence);
    }

    #[test]
    fn test_leak_phrase_reports_first_match() {
        assert_eq!(leak_phrase("LinkedIn Post: hello"), Some("linkedin post:"));
        assert_eq!(leak_phrase("nothing to see"), None);
    }
}
