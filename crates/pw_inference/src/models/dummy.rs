use std::fmt;

use pw_core::{GenerationRequest, Result, TextGenerator};

use crate::prompt::CONTINUATION_SENTINEL;

const DEFAULT_WORDS: u32 = 200;
const FILLER: [&str; 12] = [
    "This", "section", "explains", "the", "topic", "with", "practical", "detail",
    "and", "clear", "examples", "throughout.",
];

/// Offline generator for demos and tests. Produces deterministic filler of
/// roughly the requested length and honours the continuation protocol.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

fn heading_for(prompt: &str) -> String {
    // prompts name their subject in the first quoted string
    prompt
        .split('"')
        .nth(1)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("Generated Section")
        .to_string()
}

#[async_trait::async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let target = request.target_words.unwrap_or(DEFAULT_WORDS).max(1) as usize;
        let body: Vec<&str> = FILLER.iter().copied().cycle().take(target).collect();

        let mut text = format!("## {}\n\n", heading_for(&request.prompt));
        for paragraph in body.chunks(60) {
            text.push_str(&paragraph.join(" "));
            text.push_str("\n\n");
        }
        if request.prompt.contains(&format!("say only: \"{}\"", CONTINUATION_SENTINEL)) {
            text.push_str(CONTINUATION_SENTINEL);
        }
        Ok(text.trim_end().to_string())
    }
}
