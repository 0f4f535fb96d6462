use std::fmt;

use async_trait::async_trait;

use crate::types::{PostDraft, PublishedPost};
use crate::Result;

/// A single text generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Requested length in words. When set, a result well under the target
    /// triggers one corrective expansion request.
    pub target_words: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            target_words: None,
        }
    }

    pub fn with_target_words(mut self, words: u32) -> Self {
        self.target_words = Some(words);
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Returns the raw generated text, before any cleaning.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[async_trait]
pub trait Publisher: Send + Sync + fmt::Debug {
    async fn publish(&self, draft: &PostDraft) -> Result<PublishedPost>;
}
