pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod text;
pub mod types;
pub mod usage;

pub use config::{ProviderConfig, Settings, WordPressConfig, WordPressSite};
pub use error::{Error, Result};
pub use models::{GenerationRequest, Publisher, TextGenerator};
pub use storage::ArticleRepository;
pub use types::{Article, ArticleStatus, NewArticle, PostDraft, PublishStatus, PublishedPost};
pub use usage::{UsageReport, UsageTracker};
