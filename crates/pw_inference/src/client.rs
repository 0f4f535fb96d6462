use std::sync::Arc;

use async_trait::async_trait;
use pw_core::text::word_count;
use pw_core::{Error, GenerationRequest, Result, TextGenerator, UsageTracker};
use tracing::{info, warn};

use crate::cleaner::clean_segment;
use crate::models::ChatCompletionModel;
use crate::prompt::build_expansion_prompt;
use crate::retry::{AttemptError, RetryPolicy};
use crate::Config;

/// Fraction of the requested length below which a response counts as short.
pub const SHORTFALL_RATIO: f64 = 0.9;

/// Generation client: retries the primary provider, falls back to the
/// secondary one once, and asks for one expansion when a response is short.
#[derive(Debug)]
pub struct GenerationClient {
    primary: ChatCompletionModel,
    fallback: Option<ChatCompletionModel>,
    retry: RetryPolicy,
    usage: Arc<UsageTracker>,
}

impl GenerationClient {
    pub fn new(config: Config, usage: Arc<UsageTracker>) -> Result<Self> {
        let primary = ChatCompletionModel::new(config.primary)?;
        let fallback = config
            .fallback
            .filter(|provider| provider.has_key())
            .map(ChatCompletionModel::new)
            .transpose()?;
        Ok(Self {
            primary,
            fallback,
            retry: config.retry,
            usage,
        })
    }

    pub fn primary(&self) -> &ChatCompletionModel {
        &self.primary
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    async fn attempt(&self, model: &ChatCompletionModel, prompt: &str) -> std::result::Result<String, AttemptError> {
        self.usage.record_api_call();
        model.complete(prompt).await
    }

    async fn generate_raw<'a>(&'a self, prompt: &str) -> Result<(String, &'a ChatCompletionModel)> {
        let primary_error = match self
            .retry
            .run(self.primary.name(), |_| self.attempt(&self.primary, prompt))
            .await
        {
            Ok(text) => return Ok((text, &self.primary)),
            Err(e @ Error::ProviderAuth(_)) => return Err(e),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_error);
        };

        info!("🔁 Attempting {} API call as fallback", fallback.name());
        match self.attempt(fallback, prompt).await {
            Ok(text) => {
                info!("✅ {} API call successful", fallback.name());
                Ok((text, fallback))
            }
            Err(failure) => {
                warn!("⚠️ {} fallback failed: {}", fallback.name(), failure);
                Err(primary_error)
            }
        }
    }

    /// One corrective request when the text is well under the target. Words
    /// are counted after cleaning, so stripped boilerplate does not count.
    /// The expansion wins whenever it arrives; otherwise the first text stands.
    async fn ensure_length(
        &self,
        model: &ChatCompletionModel,
        request: &GenerationRequest,
        text: String,
    ) -> String {
        let Some(target) = request.target_words else {
            return text;
        };
        let actual = word_count(&clean_segment(&text));
        info!("📏 Generated word count: {} (target: {})", actual, target);
        if (actual as f64) >= f64::from(target) * SHORTFALL_RATIO {
            return text;
        }

        warn!("⚠️ Content is too short ({} words). Requesting additional content...", actual);
        let expansion = build_expansion_prompt(&request.prompt, actual, target);
        match self.attempt(model, &expansion).await {
            Ok(expanded) => {
                info!("📏 Expanded word count: {}", word_count(&clean_segment(&expanded)));
                expanded
            }
            Err(failure) => {
                warn!("⚠️ Expansion request failed, keeping the short text: {}", failure);
                text
            }
        }
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let (text, model) = self.generate_raw(&request.prompt).await?;
        let text = self.ensure_length(model, request, text).await;
        self.usage.record_words(word_count(&text));
        Ok(text)
    }
}
