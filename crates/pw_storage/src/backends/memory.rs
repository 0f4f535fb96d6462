use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pw_core::{Article, ArticleRepository, Error, Result};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryStore {
    articles: HashMap<Uuid, Article>,
}

impl MemoryStore {
    fn insert(&mut self, article: Article) -> Result<Article> {
        if self.articles.contains_key(&article.id) {
            return Err(Error::Storage(format!("Article {} already exists", article.id)));
        }
        self.articles.insert(article.id, article.clone());
        Ok(article)
    }

    fn replace(&mut self, article: &Article) -> Result<()> {
        match self.articles.get_mut(&article.id) {
            Some(existing) => {
                *existing = article.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("Article {} not found", article.id))),
        }
    }

    fn newest_first(&self) -> Vec<Article> {
        let mut articles: Vec<Article> = self.articles.values().cloned().collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        articles
    }
}

/// Process-lifetime article records. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleRepository for MemoryStorage {
    async fn create(&self, article: Article) -> Result<Article> {
        debug!("Storing article {}", article.id);
        self.store.write().await.insert(article)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.store.read().await.articles.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Article>> {
        Ok(self.store.read().await.newest_first())
    }

    async fn update(&self, article: &Article) -> Result<()> {
        self.store.write().await.replace(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pw_core::{ArticleStatus, NewArticle};

    fn article(title: &str) -> Article {
        Article::new(NewArticle {
            title: title.to_string(),
            ..NewArticle::default()
        })
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        let created = storage.create(article("Smart Locks")).await.unwrap();

        let fetched = storage.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Smart Locks");
        assert_eq!(fetched.status, ArticleStatus::Pending);
        assert!(storage.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let storage = MemoryStorage::new();
        let mut record = storage.create(article("Smart Locks")).await.unwrap();
        record.transition(ArticleStatus::Generating).unwrap();
        storage.update(&record).await.unwrap();

        let fetched = storage.get(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ArticleStatus::Generating);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.update(&article("Ghost")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let storage = MemoryStorage::new();
        let record = storage.create(article("Once")).await.unwrap();
        assert!(matches!(storage.create(record).await, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let storage = MemoryStorage::new();
        let mut older = article("Older");
        older.created_at = older.created_at - Duration::minutes(5);
        storage.create(older).await.unwrap();
        storage.create(article("Newer")).await.unwrap();

        let titles: Vec<String> = storage.list().await.unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }
}
