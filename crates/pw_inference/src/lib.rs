use pw_core::{ProviderConfig, Settings};

pub mod chunked;
pub mod cleaner;
pub mod client;
pub mod models;
pub mod prompt;
pub mod retry;

use retry::RetryPolicy;

/// Provider settings for the generation client.
#[derive(Debug, Clone)]
pub struct Config {
    pub primary: ProviderConfig,
    pub fallback: Option<ProviderConfig>,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary: ProviderConfig::deepseek(None),
            fallback: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    pub fn new(primary: ProviderConfig, fallback: Option<ProviderConfig>) -> Self {
        Self {
            primary,
            fallback,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.primary.clone(), settings.fallback.clone())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

pub mod prelude {
    pub use super::chunked::ChunkedGenerator;
    pub use super::client::GenerationClient;
    pub use super::models::{create_model, ModelKind};
    pub use super::prompt::{ArticleBrief, PartKind, PartRequest};
    pub use super::retry::RetryPolicy;
    pub use super::Config;
    pub use pw_core::{Error, GenerationRequest, Result, TextGenerator};
}

pub use models::create_model;

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::WordPressConfig;

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::new(
            ProviderConfig::deepseek(Some("a".to_string())),
            Some(ProviderConfig::openai(None)),
            WordPressConfig::default(),
        );
        let config = Config::from_settings(&settings);
        assert_eq!(config.primary.name, "DeepSeek");
        assert!(config.fallback.is_none());
        assert_eq!(config.retry, RetryPolicy::default());
    }
}
