//! Prompt rendering for the generation provider
//!
//! Rendering is deterministic apart from the closing question, which is drawn
//! from the caller's random source so tests can seed it.

use rand::Rng;

use crate::types::{PostLength, PostTone};

/// Hard character directive given to the model, below the enforcement budget
pub const PROMPT_CHAR_LIMIT: usize = 2900;

pub const SYSTEM_PROMPT: &str = "You are an expert LinkedIn content creator who writes engaging, \
professional posts that drive meaningful conversations and engagement. Always keep posts under \
2900 characters for LinkedIn compatibility.";

/// Topic keyword to subject guidance. Ordered: the first keyword found in the
/// topic wins, so more specific keywords must come first.
pub const TOPIC_GUIDANCE: &[(&str, &str)] = &[
    (
        "ai agent",
        "Discuss different types of AI agents (reactive, deliberative, learning, collaborative), \
         specific platforms like OpenAI GPTs, Microsoft Copilot, real business applications, \
         implementation strategies, and measurable ROI",
    ),
    (
        "artificial intelligence",
        "Cover current AI trends, specific technologies (GPT, Claude, Midjourney), real company \
         case studies, practical applications across industries, ethical considerations, and \
         future predictions",
    ),
    (
        "machine learning",
        "Explain ML types (supervised, unsupervised, reinforcement), specific tools (TensorFlow, \
         PyTorch, scikit-learn), real-world applications, data requirements, career paths, and \
         business impact",
    ),
    (
        "programming",
        "Discuss modern frameworks, specific languages and their use cases, development best \
         practices, emerging trends (AI-assisted coding), career advice, and productivity tools",
    ),
    (
        "data science",
        "Cover the full data science pipeline, specific tools and platforms, real project \
         examples, business impact measurement, career paths, and industry applications",
    ),
];

pub const DEFAULT_GUIDANCE: &str = "Provide detailed, expert-level insights with specific \
examples, tools, companies, and actionable advice";

/// Inputs for [`build_prompt`]
#[derive(Debug, Clone, Copy)]
pub struct PromptParams<'a> {
    pub topic: &'a str,
    pub tone: PostTone,
    pub length: PostLength,
    pub include_hashtags: bool,
    pub target_audience: Option<&'a str>,
    pub call_to_action: Option<&'a str>,
}

pub fn length_directive(length: PostLength) -> &'static str {
    match length {
        PostLength::Short => "1-2 concise paragraphs (aim for 400-800 characters total)",
        PostLength::Medium => "2-3 focused paragraphs (aim for 1500-2500 characters total)",
        PostLength::Long => "3-4 detailed paragraphs (aim for 2500-2800 characters total)",
    }
}

pub fn tone_directive(tone: PostTone) -> &'static str {
    match tone {
        PostTone::Professional => "authoritative and expert-level",
        PostTone::Casual => "conversational but knowledgeable",
        PostTone::Inspirational => "motivating and forward-thinking",
        PostTone::Educational => "informative and teaching-focused",
        PostTone::Promotional => "persuasive and benefit-focused",
    }
}

/// Guidance for `topic`: case-insensitive substring match against
/// [`TOPIC_GUIDANCE`], falling back to [`DEFAULT_GUIDANCE`].
pub fn guidance_for(topic: &str) -> &'static str {
    let topic = topic.to_lowercase();
    TOPIC_GUIDANCE
        .iter()
        .find(|(keyword, _)| topic.contains(keyword))
        .map(|(_, guidance)| *guidance)
        .unwrap_or(DEFAULT_GUIDANCE)
}

/// The four closing questions offered when no call-to-action is given
pub fn call_to_action_options(topic: &str) -> [String; 4] {
    [
        format!("What's your experience with {}?", topic),
        format!("How are you implementing {} in your work?", topic),
        format!("What challenges have you faced with {}?", topic),
        format!("Which {} tools have you found most effective?", topic),
    ]
}

/// Render the user prompt for a post request.
pub fn build_prompt<R: Rng + ?Sized>(params: &PromptParams<'_>, rng: &mut R) -> String {
    let topic = params.topic;

    let mut prompt = format!(
        "You are a recognized expert writing a LinkedIn post about \"{topic}\".\n\
         \n\
         CRITICAL REQUIREMENTS:\n\
         - MAXIMUM {limit} characters total (LinkedIn limit is 3000, stay under for safety)\n\
         - Length: {length}\n\
         - Tone: {tone}\n\
         - Focus: {focus}\n\
         - Include specific company names, tools, statistics, or real examples\n\
         - Provide actionable insights professionals can immediately use\n\
         - Use professional LinkedIn formatting with line breaks\n\
         - Sound like a subject matter expert who has deep hands-on experience\n\
         \n\
         IMPORTANT: Keep the post concise and within LinkedIn's character limit. Quality over quantity.",
        topic = topic,
        limit = PROMPT_CHAR_LIMIT,
        length = length_directive(params.length),
        tone = tone_directive(params.tone),
        focus = guidance_for(topic),
    );

    if let Some(audience) = params.target_audience.filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("\n- Target audience: {}", audience.trim()));
    }

    match params.call_to_action.filter(|s| !s.trim().is_empty()) {
        Some(cta) => prompt.push_str(&format!("\n- End with: {}", cta.trim())),
        None => {
            let options = call_to_action_options(topic);
            let question = &options[rng.gen_range(0..options.len())];
            prompt.push_str(&format!("\n- End with this question: {}", question));
        }
    }

    if params.include_hashtags {
        prompt.push_str(&format!(
            "\n- Include 3-4 specific hashtags related to {} (keep hashtags short)",
            topic
        ));
    }

    prompt.push_str(&format!(
        "\n\nWrite a compelling LinkedIn post that stays under {} characters:",
        PROMPT_CHAR_LIMIT
    ));

    prompt
}

/// Prompt asking the model to improve an existing post
pub fn enhance_prompt(content: &str) -> String {
    format!(
        "Improve this LinkedIn post while keeping it under {limit} characters:\n\
         \n\
         {content}\n\
         \n\
         Make it more engaging, professional, and add a compelling call to action.\n\
         IMPORTANT: Must stay under {limit} characters for LinkedIn.\n\
         \n\
         Enhanced post:",
        limit = PROMPT_CHAR_LIMIT,
        content = content,
    )
}

/// Prompt asking the model for `count` hashtags
pub fn hashtag_prompt(content: &str, count: usize) -> String {
    format!(
        "Generate {count} relevant LinkedIn hashtags for this post:\n\
         \n\
         {content}\n\
         \n\
         Return only hashtags separated by spaces, starting with #:",
        count = count,
        content = content,
    )
}
