//! Configuration status and connectivity reports for operators.

use pw_core::{Settings, WordPressConfig};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use super::{excerpt, looks_like_html};

const SET: &str = "***SET***";
const NOT_SET: &str = "***NOT SET***";

const CONFIG_SUGGESTIONS: [&str; 4] = [
    "Make sure WORDPRESS_URL, WORDPRESS_USERNAME and WORDPRESS_PASSWORD are set",
    "WordPress URL should be like: https://your-site.com",
    "Use Application Password from WordPress, not your regular password",
    "Check that WordPress REST API is enabled",
];

const CONNECTION_SUGGESTIONS: [&str; 6] = [
    "Check if WordPress REST API is enabled",
    "Verify the WordPress URL is correct (should be like https://your-site.com)",
    "Ensure username and password are correct",
    "Check if the user has proper permissions",
    "Try accessing the WordPress site directly in your browser",
    "Check if any security plugins are blocking API access",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStatus {
    pub is_configured: bool,
    pub wordpress_url: Option<String>,
    #[serde(rename = "hasAIKey")]
    pub has_ai_key: bool,
    pub ai_provider: String,
    pub ai_model: String,
    #[serde(rename = "hasWordPressCredentials")]
    pub has_wordpress_credentials: bool,
}

impl ConfigurationStatus {
    pub fn from_settings(settings: &Settings) -> Self {
        let has_ai_key = settings.primary.has_key();
        let has_wordpress_credentials = settings.wordpress.is_complete();
        Self {
            is_configured: has_ai_key && has_wordpress_credentials,
            wordpress_url: settings.wordpress.base_url.clone(),
            has_ai_key,
            ai_provider: settings.primary.name.to_lowercase(),
            ai_model: settings.primary.model.clone(),
            has_wordpress_credentials,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedConfig {
    pub wordpress_url: Option<String>,
    pub wordpress_username: Option<String>,
    pub wordpress_password: &'static str,
    pub deepseek_api_key: &'static str,
    pub openai_api_key: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigIssues {
    pub missing_config: bool,
    pub url_issues: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugConfigReport {
    pub success: bool,
    pub config: MaskedConfig,
    pub issues: ConfigIssues,
}

fn mask(present: bool) -> &'static str {
    if present {
        SET
    } else {
        NOT_SET
    }
}

impl DebugConfigReport {
    pub fn from_settings(settings: &Settings) -> Self {
        let wordpress = &settings.wordpress;
        let has_password = wordpress.password.as_deref().is_some_and(|p| !p.is_empty());
        Self {
            success: true,
            config: MaskedConfig {
                wordpress_url: wordpress.base_url.clone(),
                wordpress_username: wordpress.username.clone(),
                wordpress_password: mask(has_password),
                deepseek_api_key: mask(settings.primary.has_key()),
                openai_api_key: mask(settings.fallback.as_ref().is_some_and(|f| f.has_key())),
            },
            issues: ConfigIssues {
                missing_config: !wordpress.is_complete(),
                url_issues: wordpress.url_issues(),
                suggestions: CONFIG_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointFailure {
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub is_html: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingCredentials {
    pub has_url: bool,
    pub has_username: bool,
    pub has_password: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<MissingCredentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<EndpointFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ConnectionReport {
    fn missing(config: &WordPressConfig) -> Self {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        Self {
            success: false,
            message: None,
            endpoint: None,
            error: Some("WordPress configuration missing".to_string()),
            config: Some(MissingCredentials {
                has_url: present(&config.base_url),
                has_username: present(&config.username),
                has_password: present(&config.password),
            }),
            last_error: None,
            suggestions: Vec::new(),
        }
    }
}

/// Tries the posts endpoint, the REST root and the v2 root in that order.
/// The first 2xx answer that is not an HTML page wins.
pub async fn test_connection(client: &Client, config: &WordPressConfig) -> ConnectionReport {
    if !config.is_complete() {
        return ConnectionReport::missing(config);
    }
    let base = config.base_url.as_deref().unwrap_or_default().trim().trim_end_matches('/');
    let username = config.username.as_deref().unwrap_or_default();
    let password = config.password.as_deref().unwrap_or_default();

    let endpoints = [
        ("Posts API", format!("{}/wp-json/wp/v2/posts", base)),
        ("REST API Root", format!("{}/wp-json/", base)),
        ("API v2 Root", format!("{}/wp-json/wp/v2/", base)),
    ];

    let mut last_error = None;
    for (name, url) in endpoints {
        info!("🔌 Testing {} at: {}", name, url);
        let response = client
            .get(&url)
            .basic_auth(username, Some(password))
            .send()
            .await;
        match response {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                debug!("{} response status: {}", name, status);
                let is_html = looks_like_html(&body);
                if status.is_success() && !is_html {
                    return ConnectionReport {
                        success: true,
                        message: Some(format!("WordPress connection successful via {}", name)),
                        endpoint: Some(name.to_string()),
                        error: None,
                        config: None,
                        last_error: None,
                        suggestions: Vec::new(),
                    };
                }
                last_error = Some(EndpointFailure {
                    endpoint: name.to_string(),
                    status: Some(status.as_u16()),
                    body: Some(excerpt(&body, 200)),
                    is_html,
                    error: None,
                });
            }
            Err(e) => {
                last_error = Some(EndpointFailure {
                    endpoint: name.to_string(),
                    status: None,
                    body: None,
                    is_html: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    ConnectionReport {
        success: false,
        message: None,
        endpoint: None,
        error: Some("WordPress connection failed".to_string()),
        config: None,
        last_error,
        suggestions: CONNECTION_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::ProviderConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(wordpress: WordPressConfig) -> Settings {
        Settings::new(
            ProviderConfig::deepseek(Some("key".to_string())),
            Some(ProviderConfig::openai(None)),
            wordpress,
        )
    }

    #[test]
    fn test_configuration_status() {
        let status = ConfigurationStatus::from_settings(&settings(WordPressConfig::new("https://site.test", "u", "p")));
        assert!(status.is_configured);
        assert_eq!(status.ai_provider, "deepseek");
        assert_eq!(status.ai_model, "deepseek-chat");

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["hasAIKey"], true);
        assert_eq!(json["wordpressUrl"], "https://site.test");
        assert_eq!(json["hasWordPressCredentials"], true);
        assert!(json.get("hasWordpressCredentials").is_none());

        let status = ConfigurationStatus::from_settings(&settings(WordPressConfig::default()));
        assert!(!status.is_configured);
    }

    #[test]
    fn test_debug_config_masks_secrets() {
        let report = DebugConfigReport::from_settings(&settings(WordPressConfig::new("site.test/wp-admin/", "u", "hunter2")));
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("\"key\""));
        assert_eq!(report.config.wordpress_password, "***SET***");
        assert_eq!(report.config.deepseek_api_key, "***SET***");
        assert_eq!(report.config.openai_api_key, "***NOT SET***");
        assert!(!report.issues.missing_config);
        assert_eq!(report.issues.url_issues.len(), 3);
    }

    #[tokio::test]
    async fn test_connection_missing_config() {
        let report = test_connection(&Client::new(), &WordPressConfig::default()).await;
        assert!(!report.success);
        assert_eq!(report.config.unwrap().has_url, false);
    }

    #[tokio::test]
    async fn test_connection_falls_through_to_rest_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<!DOCTYPE html><html></html>"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wp-json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Site"})))
            .expect(1)
            .mount(&server)
            .await;

        let report = test_connection(&Client::new(), &WordPressConfig::new(server.uri(), "u", "p")).await;
        assert!(report.success);
        assert_eq!(report.endpoint.as_deref(), Some("REST API Root"));
    }

    #[tokio::test]
    async fn test_connection_reports_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .expect(3)
            .mount(&server)
            .await;

        let report = test_connection(&Client::new(), &WordPressConfig::new(server.uri(), "u", "p")).await;
        assert!(!report.success);
        let last = report.last_error.unwrap();
        assert_eq!(last.endpoint, "API v2 Root");
        assert_eq!(last.status, Some(403));
        assert_eq!(report.suggestions.len(), 6);
    }
}
