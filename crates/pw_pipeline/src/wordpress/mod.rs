//! WordPress REST publishing.

use std::fmt;

use async_trait::async_trait;
use pw_core::text::slugify;
use pw_core::{Error, PostDraft, PublishedPost, Publisher, Result, WordPressConfig, WordPressSite};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

pub mod diagnostics;
pub mod markup;
pub mod seo;

use crate::tags::{dedup_tags, MAX_TAGS};
use seo::SeoMeta;

/// Category used whenever the requested one cannot be resolved.
pub const DEFAULT_CATEGORY_ID: u64 = 1;

#[derive(Debug, Deserialize)]
struct Term {
    id: u64,
}

#[derive(Serialize)]
struct NewTerm<'a> {
    name: &'a str,
    slug: &'a str,
}

#[derive(Serialize)]
struct NewPost<'a> {
    title: &'a str,
    content: &'a str,
    status: &'a str,
    categories: Vec<u64>,
    tags: Vec<u64>,
    meta: SeoMeta,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: u64,
}

pub(crate) fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start().get(..64).unwrap_or(body.trim_start()).to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || body.contains("<!DOCTYPE")
}

pub(crate) fn excerpt(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

pub struct WordPressPublisher {
    client: Client,
    config: WordPressConfig,
}

impl fmt::Debug for WordPressPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressPublisher")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

impl WordPressPublisher {
    pub fn new(config: WordPressConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: WordPressConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &WordPressConfig {
        &self.config
    }

    fn authed(&self, site: &WordPressSite, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&site.username, Some(&site.password))
    }

    /// Confirms the posts endpoint answers with JSON before anything is written.
    async fn probe(&self, site: &WordPressSite) -> Result<()> {
        let url = site.endpoint("posts");
        info!("🔌 Testing WordPress connection to: {}", url);
        debug!("Using credentials: {} (password length: {})", site.username, site.password.len());

        let response = self
            .authed(site, self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                error!("WordPress connection failed: {}", e);
                Error::Publishing(format!(
                    "Cannot connect to WordPress at {}. Please check:\n1. The URL is correct and accessible\n2. WordPress is running\n3. No firewall is blocking the connection",
                    site.base_url
                ))
            })?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!("WordPress test response status: {}", status);

        if looks_like_html(&body) {
            return Err(Error::MalformedResponse(format!(
                "WordPress REST API not found at {}. Please check if:\n1. WordPress REST API is enabled\n2. The URL is correct\n3. You can access {}/wp-json/ in your browser",
                url, site.base_url
            )));
        }
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::Publishing(format!(
                "WordPress REST API endpoint not found. Please verify:\n1. WordPress is properly installed\n2. REST API is enabled\n3. The URL {} is correct",
                site.base_url
            )));
        }
        Err(Error::Publishing(format!(
            "WordPress API test failed with status {}: {}",
            status.as_u16(),
            excerpt(&body, 200)
        )))
    }

    async fn find_term(&self, site: &WordPressSite, resource: &str, slug: &str) -> Result<Option<u64>> {
        let response = self
            .authed(site, self.client.get(site.endpoint(resource)))
            .query(&[("slug", slug)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Publishing(format!("lookup failed with status {}: {}", status.as_u16(), excerpt(&body, 200))));
        }
        let terms: Vec<Term> = serde_json::from_str(&body)
            .map_err(|_| Error::MalformedResponse(format!("lookup returned non-JSON body: {}", excerpt(&body, 200))))?;
        Ok(terms.first().map(|t| t.id))
    }

    async fn create_term(&self, site: &WordPressSite, resource: &str, name: &str, slug: &str) -> Result<u64> {
        let response = self
            .authed(site, self.client.post(site.endpoint(resource)))
            .json(&NewTerm { name, slug })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Publishing(format!("create failed with status {}: {}", status.as_u16(), excerpt(&body, 200))));
        }
        let term: Term = serde_json::from_str(&body)?;
        Ok(term.id)
    }

    /// Looks a category or tag up by slug and creates it when absent.
    async fn resolve_term(&self, site: &WordPressSite, resource: &str, name: &str) -> Result<u64> {
        let slug = slugify(name);
        match self.find_term(site, resource, &slug).await? {
            Some(id) => Ok(id),
            None => {
                info!("➕ Creating {} \"{}\"", resource, name);
                self.create_term(site, resource, name, &slug).await
            }
        }
    }

    async fn resolve_category(&self, site: &WordPressSite, category: &str) -> u64 {
        if category.trim().is_empty() {
            return DEFAULT_CATEGORY_ID;
        }
        match self.resolve_term(site, "categories", category).await {
            Ok(id) => id,
            Err(e) => {
                warn!("⚠️ Error processing category \"{}\": {}. Using default category", category, e);
                DEFAULT_CATEGORY_ID
            }
        }
    }

    async fn resolve_tags(&self, site: &WordPressSite, tags: &[String]) -> Vec<u64> {
        let mut ids = Vec::new();
        for tag in dedup_tags(tags, MAX_TAGS) {
            match self.resolve_term(site, "tags", &tag).await {
                Ok(id) => ids.push(id),
                Err(e) => warn!("⚠️ Error processing tag \"{}\": {}", tag, e),
            }
        }
        ids
    }

    async fn create_post(&self, site: &WordPressSite, post: &NewPost<'_>) -> Result<u64> {
        info!("📤 Creating WordPress post at: {}", site.endpoint("posts"));
        let response = self
            .authed(site, self.client.post(site.endpoint("posts")))
            .json(post)
            .send()
            .await
            .map_err(|e| Error::Publishing(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Publishing(e.to_string()))?;
        debug!("WordPress API response status: {}", status);

        if status.is_success() {
            let created: CreatedPost = serde_json::from_str(&body).map_err(|_| {
                Error::MalformedResponse(format!("WordPress API returned invalid JSON: {}", excerpt(&body, 200)))
            })?;
            return Ok(created.id);
        }

        error!("WordPress API error: {} - {}", status, excerpt(&body, 500));
        Err(match status {
            StatusCode::UNAUTHORIZED => Error::Publishing(
                "WordPress authentication failed. Please check your username and password".to_string(),
            ),
            StatusCode::NOT_FOUND => Error::Publishing(
                "WordPress API endpoint not found. Please check your WordPress URL".to_string(),
            ),
            StatusCode::FORBIDDEN => {
                Error::Publishing("WordPress access denied. Please check your user permissions.".to_string())
            }
            _ if looks_like_html(&body) => Error::MalformedResponse(
                "WordPress returned HTML instead of JSON. This usually means the URL is incorrect or WordPress is not properly configured.".to_string(),
            ),
            _ => Error::Publishing(format!("WordPress API error: {} - {}", status.as_u16(), body)),
        })
    }
}

#[async_trait]
impl Publisher for WordPressPublisher {
    async fn publish(&self, draft: &PostDraft) -> Result<PublishedPost> {
        let site = self.config.validate()?;
        self.probe(&site).await?;

        let content = markup::prepare_content(&draft.content);
        let categories = vec![self.resolve_category(&site, &draft.category).await];
        let tags = self.resolve_tags(&site, &draft.tags).await;
        info!(
            "📝 Publishing \"{}\" (category {:?}, tags {:?}, {} chars)",
            draft.title,
            categories,
            tags,
            content.len()
        );

        let post = NewPost {
            title: &draft.title,
            content: &content,
            status: draft.status.as_str(),
            categories,
            tags,
            meta: SeoMeta::for_title(&draft.title),
        };
        let post_id = self.create_post(&site, &post).await?;
        info!("✅ WordPress post created successfully: {}", post_id);

        Ok(PublishedPost {
            post_id,
            edit_url: site.edit_url(post_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::PublishStatus;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn publisher(server: &MockServer) -> WordPressPublisher {
        WordPressPublisher::new(WordPressConfig::new(server.uri(), "editor", "app-pass"))
    }

    fn draft(tags: &[&str]) -> PostDraft {
        PostDraft {
            title: "Smart Locks".to_string(),
            content: "<h2>Why</h2><p>Because.</p>".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: "Home Security".to_string(),
            status: PublishStatus::Draft,
        }
    }

    async fn mount_probe(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(basic_auth("editor", "app-pass"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_rejects_url_without_scheme_offline() {
        let publisher = WordPressPublisher::new(WordPressConfig::new("example.com", "u", "p"));
        let err = publisher.publish(&draft(&[])).await.unwrap_err();
        assert_eq!(err.to_string(), "WordPress URL must start with http:// or https://");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_configuration_error() {
        let publisher = WordPressPublisher::new(WordPressConfig::default());
        assert!(matches!(publisher.publish(&draft(&[])).await, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_publish_flow() {
        let server = MockServer::start().await;
        mount_probe(&server).await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/categories"))
            .and(query_param("slug", "home-security"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/tags"))
            .and(query_param("slug", "smart-home"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 11}])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/tags"))
            .and(query_param("slug", "locks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/tags"))
            .and(body_partial_json(json!({"name": "Locks", "slug": "locks"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 12})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(body_partial_json(json!({
                "title": "Smart Locks",
                "status": "draft",
                "categories": [7],
                "tags": [11, 12],
                "content": "<h2>Why</h2>\n\n<p>Because.</p>",
                "meta": {"_yoast_wpseo_focuskw": "smart locks"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let published = publisher(&server)
            .publish(&draft(&["Smart Home", "Locks", "smart home"]))
            .await
            .unwrap();
        assert_eq!(published.post_id, 42);
        assert_eq!(
            published.edit_url,
            format!("{}/wp-admin/post.php?post=42&action=edit", server.uri())
        );
    }

    #[tokio::test]
    async fn test_taxonomy_failures_degrade() {
        let server = MockServer::start().await;
        mount_probe(&server).await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/categories"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(body_partial_json(json!({"categories": [1], "tags": []})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5})))
            .expect(1)
            .mount(&server)
            .await;

        let published = publisher(&server).publish(&draft(&["Locks"])).await.unwrap();
        assert_eq!(published.post_id, 5);
    }

    #[tokio::test]
    async fn test_probe_html_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<!DOCTYPE html><html></html>"))
            .mount(&server)
            .await;
        let err = publisher(&server).publish(&draft(&[])).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        assert!(err.to_string().contains("REST API not found"));
    }

    #[tokio::test]
    async fn test_probe_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"code": "rest_no_route"})))
            .mount(&server)
            .await;
        let err = publisher(&server).publish(&draft(&[])).await.unwrap_err();
        assert!(err.to_string().contains("endpoint not found"));
    }

    #[tokio::test]
    async fn test_probe_other_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"code\":\"rest_forbidden\"}"))
            .mount(&server)
            .await;
        let err = publisher(&server).publish(&draft(&[])).await.unwrap_err();
        assert!(err.to_string().contains("API test failed with status 401"));
    }

    #[tokio::test]
    async fn test_unreachable_site() {
        let publisher = WordPressPublisher::new(WordPressConfig::new("http://127.0.0.1:1", "u", "p"));
        let err = publisher.publish(&draft(&[])).await.unwrap_err();
        assert!(err.to_string().contains("Cannot connect to WordPress"));
    }

    async fn post_failure(status: u16, body: &str) -> Error {
        let server = MockServer::start().await;
        mount_probe(&server).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
            .mount(&server)
            .await;
        publisher(&server).publish(&draft(&["Locks"])).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_post_failure_mapping() {
        assert!(post_failure(401, "").await.to_string().contains("authentication failed"));
        assert!(post_failure(404, "").await.to_string().contains("endpoint not found"));
        assert!(post_failure(403, "").await.to_string().contains("access denied"));
        assert!(matches!(
            post_failure(500, "<!DOCTYPE html>").await,
            Error::MalformedResponse(_)
        ));
        let generic = post_failure(500, "{\"code\":\"db\"}").await.to_string();
        assert!(generic.starts_with("Failed to publish to WordPress: WordPress API error: 500"));
    }

    #[tokio::test]
    async fn test_long_body_gets_page_breaks() {
        let server = MockServer::start().await;
        mount_probe(&server).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .mount(&server)
            .await;

        let mut long = draft(&[]);
        long.content = format!("<p>{}</p>", vec!["word"; 3000].join(" "));
        publisher(&server).publish(&long).await.unwrap();

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let post = requests
            .iter()
            .find(|r| r.method.as_str() == "POST" && r.url.path() == "/wp-json/wp/v2/posts")
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
        assert_eq!(body["content"].as_str().unwrap().matches("<!--nextpage-->").count(), 2);
    }
}
