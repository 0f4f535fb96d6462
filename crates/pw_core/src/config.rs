use std::fmt;

use url::Url;

use crate::{Error, Result};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Connection settings for one OpenAI-compatible chat-completion provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ProviderConfig {
    pub fn deepseek(api_key: Option<String>) -> Self {
        Self {
            name: "DeepSeek".to_string(),
            api_key,
            base_url: DEEPSEEK_BASE_URL.to_string(),
            model: DEEPSEEK_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn openai(api_key: Option<String>) -> Self {
        Self {
            name: "OpenAI".to_string(),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            model: OPENAI_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct WordPressConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// WordPress settings that passed validation.
#[derive(Clone)]
pub struct WordPressSite {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for WordPressSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressSite")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl WordPressSite {
    pub fn endpoint(&self, resource: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.base_url, resource)
    }

    pub fn edit_url(&self, post_id: u64) -> String {
        format!("{}/wp-admin/post.php?post={}&action=edit", self.base_url, post_id)
    }
}

impl WordPressConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: Some(base_url.into()),
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.base_url, &self.username, &self.password]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// Checks presence of every setting and the URL scheme. Never touches the network.
    pub fn validate(&self) -> Result<WordPressSite> {
        if !self.is_complete() {
            return Err(Error::Configuration(
                "WordPress configuration is required for publishing. Set WORDPRESS_URL, WORDPRESS_USERNAME and WORDPRESS_PASSWORD.".to_string(),
            ));
        }
        let base_url = self.base_url.as_deref().unwrap_or_default().trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Configuration(
                "WordPress URL must start with http:// or https://".to_string(),
            ));
        }
        Url::parse(base_url)
            .map_err(|e| Error::Configuration(format!("Invalid WordPress URL {}: {}", base_url, e)))?;

        Ok(WordPressSite {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
        })
    }

    /// Human readable problems with the configured URL.
    pub fn url_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(url) = self.base_url.as_deref() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                issues.push("WordPress URL should start with http:// or https://".to_string());
            }
            if url.ends_with('/') {
                issues.push("WordPress URL should not end with a slash".to_string());
            }
            if url.contains("/wp-admin") {
                issues.push("WordPress URL should not include /wp-admin".to_string());
            }
        }
        issues
    }
}

impl fmt::Debug for WordPressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Everything the services need, assembled once by the caller.
#[derive(Debug, Clone)]
pub struct Settings {
    pub primary: ProviderConfig,
    pub fallback: Option<ProviderConfig>,
    pub wordpress: WordPressConfig,
}

impl Settings {
    pub fn new(primary: ProviderConfig, fallback: Option<ProviderConfig>, wordpress: WordPressConfig) -> Self {
        Self {
            primary,
            fallback: fallback.filter(ProviderConfig::has_key),
            wordpress,
        }
    }
}
