use async_trait::async_trait;
use uuid::Uuid;

use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Store a new article record
    async fn create(&self, article: Article) -> Result<Article>;

    async fn get(&self, id: Uuid) -> Result<Option<Article>>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<Article>>;

    /// Replace an existing record; fails with `NotFound` for unknown ids
    async fn update(&self, article: &Article) -> Result<()>;
}
