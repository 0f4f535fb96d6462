use std::sync::Arc;
use std::time::Duration;

use pw_core::text::word_count;
use pw_core::{
    Article, ArticleRepository, ArticleStatus, Error, GenerationRequest, NewArticle, PostDraft, PublishStatus,
    PublishedPost, Publisher, Result, TextGenerator, UsageReport, UsageTracker,
};
use pw_inference::chunked::{should_chunk, ChunkedGenerator};
use pw_inference::cleaner::{clean_for_publish, clean_segment};
use pw_inference::client::SHORTFALL_RATIO;
use pw_inference::prompt::{
    build_article_prompt, build_part_prompt, calculate_total_parts, part_word_target, ArticleBrief, PartRequest,
    MIN_ARTICLE_WORDS,
};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::logging::Logger;
use crate::tags::augment_tags;
use crate::wordpress::markup::markdown_to_html;

/// Markdown publish request from the interactive flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default, deserialize_with = "pw_core::types::deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: PublishStatus,
}

/// Sequences prompt building, generation, cleaning and publishing, both for
/// the interactive part-by-part flow and for background article records.
pub struct ArticleManager {
    generator: Arc<dyn TextGenerator>,
    publisher: Arc<dyn Publisher>,
    repository: Arc<dyn ArticleRepository>,
    usage: Arc<UsageTracker>,
    section_pause: Duration,
}

impl std::fmt::Debug for ArticleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleManager")
            .field("generator", &self.generator.name())
            .field("publisher", &self.publisher)
            .field("section_pause", &self.section_pause)
            .finish()
    }
}

impl ArticleManager {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        publisher: Arc<dyn Publisher>,
        repository: Arc<dyn ArticleRepository>,
        usage: Arc<UsageTracker>,
    ) -> Self {
        Self {
            generator,
            publisher,
            repository,
            usage,
            section_pause: Duration::from_secs(1),
        }
    }

    /// Pause between chunked sections.
    pub fn with_section_pause(mut self, pause: Duration) -> Self {
        self.section_pause = pause;
        self
    }

    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    pub fn usage(&self) -> UsageReport {
        self.usage.snapshot()
    }

    /// One interactive part. The result keeps the continuation sentinel so the
    /// caller can tell whether to ask for more.
    pub async fn generate_part(&self, request: &PartRequest) -> Result<String> {
        if request.topic.trim().is_empty() {
            return Err(Error::InvalidRequest("Topic is required".to_string()));
        }
        if request.part == 0 || request.total_parts == 0 {
            return Err(Error::InvalidRequest("Part numbers start at 1".to_string()));
        }
        info!(
            "📝 Generating part {}/{} of \"{}\" ({} words)",
            request.part, request.total_parts, request.topic, request.word_count
        );
        let prompt = build_part_prompt(request);
        let raw = self.generator.generate(&GenerationRequest::new(prompt)).await?;
        Ok(clean_segment(&raw))
    }

    /// Every part in order, each seeing the text so far, then the publish clean.
    pub async fn generate_all_parts(&self, brief: &ArticleBrief) -> Result<String> {
        let total_parts = calculate_total_parts(brief.word_count);
        info!(
            "🚀 Generating \"{}\" in {} parts ({} words)",
            brief.title, total_parts, brief.word_count
        );

        let mut accumulated = String::new();
        for part in 1..=total_parts {
            let request = PartRequest {
                topic: brief.title.clone(),
                part,
                total_parts,
                previous_content: (!accumulated.is_empty()).then(|| accumulated.clone()),
                tags: brief.tags.clone(),
                tone: Some(brief.tone.clone()),
                word_count: part_word_target(brief.word_count, part, total_parts),
                additional_instructions: brief.additional_instructions.clone(),
            };
            let text = self.generate_part(&request).await?;
            if !accumulated.is_empty() {
                accumulated.push_str("\n\n");
            }
            accumulated.push_str(&text);
        }

        let cleaned = clean_for_publish(&accumulated, &brief.title);
        info!("✨ All parts generated: {} words", word_count(&cleaned));
        Ok(cleaned)
    }

    /// Whole-article generation for records: one request up to the chunking
    /// threshold, five sections beyond it.
    pub async fn generate_article_content(&self, brief: &ArticleBrief) -> Result<String> {
        let mut brief = brief.clone();
        brief.word_count = brief.word_count.max(MIN_ARTICLE_WORDS);

        if should_chunk(brief.word_count) {
            return ChunkedGenerator::new(self.generator.clone())
                .with_pause(self.section_pause)
                .generate(&brief)
                .await;
        }

        let request = GenerationRequest::new(build_article_prompt(&brief)).with_target_words(brief.word_count);
        let raw = self.generator.generate(&request).await?;
        Ok(clean_segment(&raw))
    }

    /// Cleans the Markdown, tops up the tags, renders HTML and publishes.
    pub async fn publish_markdown(&self, request: &PublishRequest) -> Result<PublishedPost> {
        if request.title.trim().is_empty() || request.markdown.trim().is_empty() || request.category.trim().is_empty() {
            return Err(Error::InvalidRequest("Missing required fields".to_string()));
        }
        info!(
            "📤 Publishing \"{}\" to category {} as {}",
            request.title,
            request.category,
            request.status.as_str()
        );

        let cleaned = clean_for_publish(&request.markdown, &request.title);
        let tags = augment_tags(&request.tags, &cleaned, &request.title);
        info!("🏷️ Tags: {}", tags.join(", "));
        let html = markdown_to_html(&cleaned);

        let published = self
            .publisher
            .publish(&PostDraft {
                title: request.title.clone(),
                content: html,
                tags,
                category: request.category.clone(),
                status: request.status,
            })
            .await?;
        info!("✅ Article published with ID {}: {}", published.post_id, published.edit_url);
        Ok(published)
    }

    pub async fn articles(&self) -> Result<Vec<Article>> {
        self.repository.list().await
    }

    pub async fn article(&self, id: Uuid) -> Result<Article> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Article {} not found", id)))
    }

    /// Stores a new record and processes it on a background task.
    pub async fn submit(self: &Arc<Self>, request: NewArticle) -> Result<Article> {
        if request.title.trim().is_empty() {
            return Err(Error::InvalidRequest("Title is required".to_string()));
        }
        let article = self.repository.create(Article::new(request)).await?;
        info!("📰 Article {} queued: {}", article.id, article.title);

        let manager = Arc::clone(self);
        let id = article.id;
        tokio::spawn(async move {
            if let Err(e) = manager.process(id).await {
                error!("Processing of article {} could not be recorded: {}", id, e);
            }
        });
        Ok(article)
    }

    /// Runs the record pipeline. Pipeline failures are stored on the record;
    /// only repository failures are returned.
    pub async fn process(&self, id: Uuid) -> Result<()> {
        let mut article = self.article(id).await?;
        let logger = Logger::new().with_new_prefixes(format!("[{}]", short_id(id)));

        if let Err(e) = self.run_pipeline(&mut article, &logger).await {
            logger.error(&format!("❌ Processing error: {}", e));
            article.fail(e.to_string())?;
            self.repository.update(&article).await?;
        }
        Ok(())
    }

    async fn run_pipeline(&self, article: &mut Article, logger: &Logger) -> Result<()> {
        article.transition(ArticleStatus::Generating)?;
        self.repository.update(article).await?;
        logger.info(&format!("🤖 Generating \"{}\" ({} words)", article.title, article.word_count));
        logger.debug(&format!(
            "Tags: [{}], category: {}",
            article.tags.join(", "),
            article.category
        ));

        let brief = ArticleBrief::from(&*article);
        let content = self.generate_article_content(&brief).await?;
        self.usage.record_article();
        let content = clean_for_publish(&content, &article.title);
        let words = word_count(&content);
        logger.info(&format!("✨ Generated {} words", words));
        if (words as f64) < f64::from(brief.word_count.max(MIN_ARTICLE_WORDS)) * SHORTFALL_RATIO {
            logger.warn(&format!("⚠️ Content is short of the {} word target", brief.word_count));
        }

        article.content = Some(content.clone());
        article.transition(ArticleStatus::Publishing)?;
        self.repository.update(article).await?;

        let logger = logger.clone().with_prefix("[publish]");
        logger.info("📤 Sending draft to WordPress");
        let published = self
            .publisher
            .publish(&PostDraft {
                title: article.title.clone(),
                content,
                tags: article.tags.clone(),
                category: article.category.clone(),
                status: PublishStatus::Draft,
            })
            .await?;

        article.wordpress_id = Some(published.post_id);
        article.transition(ArticleStatus::Completed)?;
        self.repository.update(article).await?;
        logger.info(&format!("✅ Published as post {}", published.post_id));
        Ok(())
    }

    /// Polls until the record reaches a terminal status.
    pub async fn wait_for(&self, id: Uuid, interval: Duration) -> Result<Article> {
        loop {
            let article = self.article(id).await?;
            if article.status.is_terminal() {
                return Ok(article);
            }
            tokio::time::sleep(interval).await;
        }
    }
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string().chars().take(8).collect()
}
