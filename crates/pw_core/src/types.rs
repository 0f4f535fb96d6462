use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const DEFAULT_ARTICLE_WORD_COUNT: u32 = 6000;
pub const DEFAULT_ARTICLE_TONE: &str = "professional";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Pending,
    Generating,
    Publishing,
    Completed,
    Failed,
}

impl ArticleStatus {
    pub fn can_transition_to(self, next: ArticleStatus) -> bool {
        use ArticleStatus::*;
        matches!(
            (self, next),
            (Pending, Generating)
                | (Generating, Publishing)
                | (Generating, Failed)
                | (Publishing, Completed)
                | (Publishing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ArticleStatus::Completed | ArticleStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Generating => "generating",
            ArticleStatus::Publishing => "publishing",
            ArticleStatus::Completed => "completed",
            ArticleStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An article record tracked through generation and publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub tags: Vec<String>,
    pub category: String,
    pub word_count: u32,
    pub tone: String,
    pub additional_instructions: Option<String>,
    pub status: ArticleStatus,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub wordpress_id: Option<u64>,
    pub error: Option<String>,
}

impl Article {
    pub fn new(request: NewArticle) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: request.title,
            tags: request.tags,
            category: request.category,
            word_count: request.word_count.unwrap_or(DEFAULT_ARTICLE_WORD_COUNT),
            tone: request
                .tone
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ARTICLE_TONE.to_string()),
            additional_instructions: request.additional_instructions,
            status: ArticleStatus::Pending,
            content: None,
            created_at: now,
            updated_at: now,
            wordpress_id: None,
            error: None,
        }
    }

    /// Moves the article to `next`, rejecting anything off the
    /// pending → generating → publishing → completed path (or into failed).
    pub fn transition(&mut self, next: ArticleStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.transition(ArticleStatus::Failed)?;
        self.error = Some(message.into());
        Ok(())
    }
}

/// Submission payload for a new article record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub additional_instructions: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

/// Accepts tags either as a JSON array or a comma separated string.
pub fn deserialize_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<TagsInput>::deserialize(deserializer)?;
    Ok(match input {
        Some(TagsInput::List(tags)) => tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Some(TagsInput::Csv(csv)) => split_tags(&csv),
        None => Vec::new(),
    })
}

pub fn split_tags(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Publish,
    Pending,
    Private,
}

impl PublishStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Publish => "publish",
            PublishStatus::Pending => "pending",
            PublishStatus::Private => "private",
        }
    }
}

impl std::str::FromStr for PublishStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(PublishStatus::Draft),
            "publish" => Ok(PublishStatus::Publish),
            "pending" => Ok(PublishStatus::Pending),
            "private" => Ok(PublishStatus::Private),
            other => Err(Error::InvalidRequest(format!("Unknown post status: {}", other))),
        }
    }
}

/// A post ready to be submitted to the publishing site.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: String,
    pub status: PublishStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPost {
    pub post_id: u64,
    #[serde(rename = "url")]
    pub edit_url: String,
}
