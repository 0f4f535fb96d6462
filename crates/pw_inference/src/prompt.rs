//! Prompt construction for part-by-part, single-shot and corrective generation.

use pw_core::text::{focus_keyphrase, meta_description};
use pw_core::types::deserialize_tags;
use pw_core::Article;
use serde::Deserialize;

use crate::chunked::{render_outline, SECTIONS};

/// Phrase a non-final part ends with so the caller knows to ask for the next one.
pub const CONTINUATION_SENTINEL: &str = "Continue Generating?";
pub const DEFAULT_TONE: &str = "conversational";
pub const FAQ_COUNT: usize = 5;
/// Articles with a larger target are generated section by section.
pub const CHUNKING_THRESHOLD: u32 = 3000;
pub const MIN_ARTICLE_WORDS: u32 = 1000;
pub const WORDS_PER_PART: u32 = 1500;
pub const MAX_PARTS: u32 = 6;

/// Which template a part is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    First,
    Middle(u32),
    Last,
}

impl PartKind {
    pub fn classify(part: u32, total_parts: u32) -> Self {
        if part >= total_parts.max(1) {
            PartKind::Last
        } else if part <= 1 {
            PartKind::First
        } else {
            PartKind::Middle(part)
        }
    }
}

/// Request for one part of a multi-part article.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRequest {
    pub topic: String,
    pub part: u32,
    pub total_parts: u32,
    #[serde(default)]
    pub previous_content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
    /// Target for this part only, not the whole article.
    pub word_count: u32,
    #[serde(default)]
    pub additional_instructions: Option<String>,
}

impl PartRequest {
    pub fn kind(&self) -> PartKind {
        PartKind::classify(self.part, self.total_parts)
    }

    fn tone(&self) -> &str {
        self.tone
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TONE)
    }
}

/// Inputs for whole-article generation.
#[derive(Debug, Clone)]
pub struct ArticleBrief {
    pub title: String,
    pub word_count: u32,
    pub tone: String,
    pub tags: Vec<String>,
    pub category: String,
    pub additional_instructions: Option<String>,
}

impl From<&Article> for ArticleBrief {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            word_count: article.word_count,
            tone: article.tone.clone(),
            tags: article.tags.clone(),
            category: article.category.clone(),
            additional_instructions: article.additional_instructions.clone(),
        }
    }
}

pub fn calculate_total_parts(word_count: u32) -> u32 {
    match word_count {
        0..=1500 => 1,
        1501..=3000 => 2,
        3001..=4500 => 3,
        4501..=6000 => 4,
        6001..=7500 => 5,
        _ => MAX_PARTS.min(word_count.div_ceil(WORDS_PER_PART)),
    }
}

/// Word target for `part` when `total_words` is split over `total_parts`.
/// Every part gets the rounded-up share except the last, which takes the remainder.
pub fn part_word_target(total_words: u32, part: u32, total_parts: u32) -> u32 {
    let total_parts = total_parts.max(1);
    let per_part = total_words.div_ceil(total_parts);
    if part >= total_parts {
        total_words.saturating_sub(per_part * (total_parts - 1))
    } else {
        per_part
    }
}

/// Per-part word targets for a whole article.
pub fn plan_parts(total_words: u32) -> Vec<u32> {
    let parts = calculate_total_parts(total_words);
    (1..=parts)
        .map(|part| part_word_target(total_words, part, parts))
        .collect()
}

fn optional(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

pub fn build_part_prompt(request: &PartRequest) -> String {
    let words = request.word_count;
    let topic = request.topic.trim();
    let kind = request.kind();

    let mut prompt = match kind {
        PartKind::First => format!(
            "Write a {words} word, 100% unique, SEO-optimized, human-written article section in English on the topic \"{topic}\".\n\n\
             Follow these steps:\n\n\
             1. First, create an outline with at least 15 headings and subheadings (including H1, H2, H3, and H4).\n\
             2. Then, begin writing the article section by section.\n\
             3. For every heading and subheading, write a detailed paragraph of 300–350+ words.\n\
             4. For Part 1: Write content for Headings 1–5 and then stop with the message **\"{CONTINUATION_SENTINEL}\"**"
        ),
        PartKind::Middle(part) => {
            let scope = match part {
                2 => "Continue with Headings 6–10",
                3 => "Continue with Headings 11–15",
                _ => "Continue with additional sections",
            };
            format!(
                "Continue the article about \"{topic}\" with Part {part} (target: {words} words).\n\n\
                 For Part {part}: {scope} and stop again with the message **\"{CONTINUATION_SENTINEL}\"**"
            )
        }
        PartKind::Last if request.part <= 1 => format!(
            "Write a complete {words} word, 100% unique, SEO-optimized, human-written article in English on the topic \"{topic}\".\n\n\
             Start with an outline of headings and subheadings (H1, H2, H3), write every section in full, \
             then finish with a Conclusion + {FAQ_COUNT} unique FAQs."
        ),
        PartKind::Last => format!(
            "Complete the article about \"{topic}\" with Part {part} (target: {words} words).\n\n\
             For Part {part}: Finish with a Conclusion + {FAQ_COUNT} unique FAQs.",
            part = request.part
        ),
    };

    let previous = optional(&request.previous_content);
    if kind != PartKind::First && !previous.is_empty() {
        prompt.push_str(&format!("\n\nPrevious content for context:\n{previous}"));
    }

    let keyphrase = focus_keyphrase(topic);
    prompt.push_str(&format!(
        "\n\nCRITICAL: You must write EXACTLY {words} words - no more, no less. \
         Count your words carefully and ensure the total word count matches this target exactly.\n\n\
         Write in a human-like, {tone} tone using active voice, contractions, informal style, rhetorical questions, \
         personal pronouns, etc. Avoid sounding robotic or like AI-generated text.\n\n\
         SEO Requirements:\n\
         - Focus Keyphrase: \"{keyphrase}\"\n\
         - Meta Description: \"{meta}\"\n\
         - Tags: {tags}\n\
         - Tone: {tone}\n\
         - Additional Instructions: {extra}\n\
         - Target exactly {words} words\n\n",
        tone = request.tone(),
        meta = meta_description(topic),
        tags = request.tags.join(", "),
        extra = optional(&request.additional_instructions),
    ));

    match kind {
        PartKind::Last => prompt.push_str(
            "Use proper Markdown formatting with # for headings. This is the final part, \
             so end with the last FAQ answer and do not add any continuation prompt.",
        ),
        _ => prompt.push_str(&format!(
            "Use proper Markdown formatting with # for headings. At the end of this part, say only: \"{CONTINUATION_SENTINEL}\""
        )),
    }
    prompt
}

/// Single-shot HTML article prompt, used for targets up to the chunking threshold.
pub fn build_article_prompt(brief: &ArticleBrief) -> String {
    let words = brief.word_count;
    let title = brief.title.trim();
    let mut prompt = format!(
        "Write a comprehensive {words}-word article about \"{title}\" in proper HTML format for WordPress.\n\n\
         CRITICAL REQUIREMENTS:\n\
         - EXACT word count: {words} words (not less, not more)\n\
         - Tone: {tone}\n\
         - Category: {category}\n\
         - Tags: {tags}\n",
        tone = brief.tone,
        category = brief.category,
        tags = brief.tags.join(", "),
    );
    if let Some(extra) = brief.additional_instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("- Additional instructions: {}\n", extra.trim()));
    }
    prompt.push_str(&format!(
        "\nSEO REQUIREMENTS:\n\
         - Focus Keyphrase: \"{keyphrase}\"\n\
         - Meta Description: Create a compelling 155-160 character meta description\n\
         - Include the focus keyphrase naturally throughout the content\n\
         - Use proper heading hierarchy (H1, H2, H3)\n\
         - Include relevant internal and external links where appropriate\n\n\
         STRUCTURE THE ARTICLE WITH PROPER HTML FORMATTING TO REACH EXACTLY {words} WORDS:\n\n",
        keyphrase = focus_keyphrase(title),
    ));
    for section in SECTIONS.iter() {
        prompt.push_str(&render_outline(&(section.outline)(title)));
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nIMPORTANT FORMATTING REQUIREMENTS:\n\
         1. Use proper HTML tags: <h1>, <h2>, <h3>, <p>, <strong>, <em>\n\
         2. Each paragraph should be wrapped in <p> tags\n\
         3. Use <strong> for important terms and key concepts\n\
         4. Under every heading write 200-250 words with specific examples\n\
         5. End with a strong conclusion that summarizes key points\n\
         6. DO NOT include phrases like \"this HTML has X words\" or similar meta-commentary\n\
         7. Focus on natural, flowing content that reads well\n\n\
         CRITICAL: The article MUST be exactly {words} words. Do not use generic or placeholder text."
    ));
    prompt
}

/// Follow-up prompt asking the model to lengthen a response that came back short.
pub fn build_expansion_prompt(original_prompt: &str, actual_words: usize, target_words: u32) -> String {
    format!(
        "{original_prompt}\n\n\
         The previous response was only {actual_words} words, but we need exactly {target_words} words. \
         Please expand the content significantly by adding more detailed content, additional sections, \
         and comprehensive explanations to reach exactly {target_words} words. Keep the same formatting."
    )
}
