//! Long articles are generated as five fixed-proportion sections, one request each.

use std::sync::Arc;
use std::time::Duration;

use pw_core::text::{focus_keyphrase, leading_words, meta_description, trailing_words, word_count, EDITORIAL_YEAR};
use pw_core::{GenerationRequest, Result, TextGenerator};
use tracing::{error, info};

use crate::cleaner::clean_segment;
use crate::prompt::{ArticleBrief, CHUNKING_THRESHOLD, FAQ_COUNT};

pub type Outline = Vec<(u8, String)>;

pub struct SectionSpec {
    pub name: &'static str,
    /// Share of the total word target, in percent.
    pub percent: u32,
    pub opening: &'static str,
    pub keyphrase_uses: &'static str,
    pub outline: fn(&str) -> Outline,
}

pub static SECTIONS: [SectionSpec; 5] = [
    SectionSpec {
        name: "Introduction and Basics",
        percent: 15,
        opening: "Write the introduction and basic sections for",
        keyphrase_uses: "3-4",
        outline: introduction_outline,
    },
    SectionSpec {
        name: "Benefits and Features",
        percent: 25,
        opening: "Continue the article about",
        keyphrase_uses: "4-5",
        outline: benefits_outline,
    },
    SectionSpec {
        name: "Technology and Solutions",
        percent: 25,
        opening: "Continue the article about",
        keyphrase_uses: "4-5",
        outline: technology_outline,
    },
    SectionSpec {
        name: "Setup and Applications",
        percent: 20,
        opening: "Continue the article about",
        keyphrase_uses: "3-4",
        outline: setup_outline,
    },
    SectionSpec {
        name: "Conclusion and FAQs",
        percent: 15,
        opening: "Complete the article about",
        keyphrase_uses: "2-3",
        outline: conclusion_outline,
    },
];

fn introduction_outline(title: &str) -> Outline {
    vec![
        (1, title.to_string()),
        (2, format!("Introduction to {}", leading_words(title, 3))),
        (3, format!("What is {}?", leading_words(title, 2))),
        (3, format!("How Does {} Work?", trailing_words(title, 2))),
    ]
}

fn benefits_outline(title: &str) -> Outline {
    let subject = leading_words(title, 3);
    vec![
        (2, format!("Benefits of {}", subject)),
        (3, "Enhanced Efficiency and Performance".to_string()),
        (3, "Improved User Experience".to_string()),
        (3, "Cost-Effective Solutions".to_string()),
        (2, format!("Key Features to Look For in {}", subject)),
        (3, "Advanced Technology Integration".to_string()),
        (3, "Scalability and Flexibility".to_string()),
        (3, "Comprehensive Security Features".to_string()),
        (3, "User-Friendly Interface".to_string()),
    ]
}

fn technology_outline(title: &str) -> Outline {
    vec![
        (2, format!("{} Technology – The Game Changer", leading_words(title, 2))),
        (3, "Revolutionary Capabilities".to_string()),
        (3, "Integration with Modern Systems".to_string()),
        (3, "Real-Time Processing and Analytics".to_string()),
        (2, format!("Best {} ({} Picks)", leading_words(title, 3), EDITORIAL_YEAR)),
        (3, "Top-Rated Professional Solutions".to_string()),
        (3, "Best Enterprise-Grade Options".to_string()),
        (3, "Budget-Friendly Alternatives".to_string()),
    ]
}

fn setup_outline(title: &str) -> Outline {
    vec![
        (2, format!("How to Set Up {}", leading_words(title, 3))),
        (3, "Step-by-Step Installation Guide".to_string()),
        (3, "Connecting to Networks and Applications".to_string()),
        (3, "Troubleshooting Common Issues".to_string()),
        (2, "Use Cases and Applications".to_string()),
        (3, "Business and Commercial Applications".to_string()),
        (3, "Industrial and Manufacturing Uses".to_string()),
        (3, "Residential and Consumer Applications".to_string()),
    ]
}

fn conclusion_outline(title: &str) -> Outline {
    let subject = leading_words(title, 3);
    let faqs = [
        format!("How reliable are {} systems?", subject),
        format!("Can {} systems integrate with existing infrastructure?", subject),
        format!("What security measures are included in modern {} systems?", subject),
        format!("What are the typical costs associated with {} systems?", subject),
        format!("How do I choose the right {} system for my needs?", subject),
    ];
    let mut outline = vec![
        (2, "Conclusion".to_string()),
        (2, "Frequently Asked Questions".to_string()),
    ];
    outline.extend(faqs.into_iter().take(FAQ_COUNT).map(|q| (3, q)));
    outline
}

pub fn render_outline(outline: &Outline) -> String {
    outline
        .iter()
        .map(|(level, text)| format!("- <h{level}>{text}</h{level}>\n"))
        .collect()
}

pub fn should_chunk(word_count: u32) -> bool {
    word_count > CHUNKING_THRESHOLD
}

/// Floor of each section's share; the sum is at most 4 words short of `total`.
pub fn section_targets(total: u32) -> [u32; 5] {
    let mut targets = [0; 5];
    for (target, section) in targets.iter_mut().zip(SECTIONS.iter()) {
        *target = (total as u64 * section.percent as u64 / 100) as u32;
    }
    targets
}

pub fn build_section_prompt(brief: &ArticleBrief, section: &SectionSpec, target: u32) -> String {
    let title = brief.title.trim();
    let mut prompt = format!(
        "Write a comprehensive article section about \"{title}\" with the following requirements:\n\n\
         Tone: {tone}\n\
         Category: {category}\n\
         Tags: {tags}\n",
        tone = brief.tone,
        category = brief.category,
        tags = brief.tags.join(", "),
    );
    if let Some(extra) = brief.additional_instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Additional instructions: {}\n", extra.trim()));
    }
    prompt.push_str(&format!(
        "\n{opening} \"{title}\" with the {name} sections (target: {target} words). Include:\n{outline}\n\
         SEO Requirements:\n\
         - Focus Keyphrase: \"{keyphrase}\"\n\
         - Meta Description: \"{meta}\"\n\
         - Include the focus keyphrase naturally {uses} times\n\
         - Use proper HTML formatting\n\
         - Target exactly {target} words\n\n\
         IMPORTANT:\n\
         - Use proper HTML formatting (<h2>, <h3>, <p>, <strong>, <em>)\n\
         - Make content informative and engaging\n\
         - Use professional tone but accessible to general readers\n\
         - Include specific examples and practical information\n\
         - DO NOT include phrases like \"this HTML has X words\" or similar meta-commentary\n\
         - Focus on natural, flowing content that reads well",
        opening = section.opening,
        name = section.name.to_lowercase(),
        outline = render_outline(&(section.outline)(title)),
        keyphrase = focus_keyphrase(title),
        meta = meta_description(title),
        uses = section.keyphrase_uses,
    ));
    prompt
}

pub struct ChunkedGenerator {
    generator: Arc<dyn TextGenerator>,
    pause: Duration,
}

impl std::fmt::Debug for ChunkedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedGenerator")
            .field("generator", &self.generator.name())
            .field("pause", &self.pause)
            .finish()
    }
}

impl ChunkedGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            pause: Duration::from_secs(1),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Generates every section in order. The first failing section aborts the whole article.
    pub async fn generate(&self, brief: &ArticleBrief) -> Result<String> {
        let targets = section_targets(brief.word_count);
        info!(
            "🧩 Generating {}-word article \"{}\" in {} sections",
            brief.word_count,
            brief.title,
            SECTIONS.len()
        );

        let mut chunks = Vec::with_capacity(SECTIONS.len());
        for (index, (section, target)) in SECTIONS.iter().zip(targets).enumerate() {
            if index > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            info!("📝 Generating chunk {}: {} (target: {} words)", index + 1, section.name, target);
            let request = GenerationRequest::new(build_section_prompt(brief, section, target));
            let raw = self.generator.generate(&request).await.map_err(|e| {
                error!("Error generating chunk {} ({}): {}", index + 1, section.name, e);
                e
            })?;
            let cleaned = clean_segment(&raw);
            info!("✨ Chunk {} generated: {} words", index + 1, word_count(&cleaned));
            chunks.push(cleaned);
        }

        let article = chunks.join("\n\n");
        info!(
            "✅ Article generation complete: {} words (target: {})",
            word_count(&article),
            brief.word_count
        );
        Ok(article)
    }
}
