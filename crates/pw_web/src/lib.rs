use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles).post(handlers::create_article))
        .route("/api/articles/part", post(handlers::generate_part))
        .route("/api/articles/publish", post(handlers::publish_article))
        .route("/api/articles/publish/test", get(handlers::publish_test))
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/usage", get(handlers::usage))
        .route("/api/configuration", get(handlers::configuration).post(handlers::configuration))
        .route("/api/debug-config", get(handlers::debug_config))
        .route("/api/test-wordpress", get(handlers::test_wordpress))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(addr: SocketAddr, state: AppState) -> pw_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use pw_core::{Article, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pw_core::{
        PostDraft, ProviderConfig, PublishedPost, Publisher, Result, Settings, UsageTracker, WordPressConfig,
    };
    use pw_inference::models::DummyModel;
    use pw_pipeline::ArticleManager;
    use pw_storage::MemoryStorage;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug)]
    struct StubPublisher;

    #[async_trait]
    impl Publisher for StubPublisher {
        async fn publish(&self, _draft: &PostDraft) -> Result<PublishedPost> {
            Ok(PublishedPost {
                post_id: 42,
                edit_url: "https://site.test/wp-admin/post.php?post=42&action=edit".to_string(),
            })
        }
    }

    fn app_with(wordpress: WordPressConfig) -> Router {
        let manager = ArticleManager::new(
            Arc::new(DummyModel::new()),
            Arc::new(StubPublisher),
            Arc::new(MemoryStorage::new()),
            Arc::new(UsageTracker::new()),
        )
        .with_section_pause(Duration::ZERO);
        let settings = Settings::new(ProviderConfig::deepseek(Some("key".to_string())), None, wordpress);
        create_app(AppState::new(Arc::new(manager), settings))
    }

    fn app() -> Router {
        app_with(WordPressConfig::new("https://site.test", "admin", "secret"))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_generate_part() {
        let (status, body) = send(
            app(),
            post_json(
                "/api/articles/part",
                json!({"topic": "Smart Locks", "part": 1, "totalParts": 3, "wordCount": 300, "tags": ["home"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let markdown = body["markdown"].as_str().unwrap();
        assert!(markdown.contains("Continue Generating?"));
    }

    #[tokio::test]
    async fn test_publish_missing_fields_is_bad_request() {
        let (status, body) = send(app(), post_json("/api/articles/publish", json!({"title": "t"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_publish_returns_post_id_and_url() {
        let (status, body) = send(
            app(),
            post_json(
                "/api/articles/publish",
                json!({"title": "Smart Locks", "markdown": "## Locks\n\nText", "tags": "a,b,c", "category": "Home"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["postId"], 42);
        assert!(body["url"].as_str().unwrap().contains("post=42"));
    }

    #[tokio::test]
    async fn test_publish_endpoint_probe() {
        let (status, body) = send(app(), get("/api/articles/publish/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_article_lifecycle() {
        let app = app();
        let (status, created) = send(
            app.clone(),
            post_json("/api/articles", json!({"title": "Smart Locks", "tags": "a, b", "category": "Home", "wordCount": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["status"], "pending");
        assert_eq!(created["tags"], json!(["a", "b"]));
        let id = created["id"].as_str().unwrap().to_string();

        let mut record = Value::Null;
        for _ in 0..100 {
            let (_, body) = send(app.clone(), get(&format!("/api/articles/{}", id))).await;
            record = body;
            if record["status"] == "completed" || record["status"] == "failed" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(record["status"], "completed");
        assert_eq!(record["wordpressId"], 42);

        let (_, list) = send(app.clone(), get("/api/articles")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (_, usage) = send(app, get("/api/usage")).await;
        assert_eq!(usage["articlesGenerated"], 1);
    }

    #[tokio::test]
    async fn test_unknown_article_is_not_found() {
        let (status, _) = send(app(), get(&format!("/api/articles/{}", uuid::Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(app(), get("/api/articles/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not-a-uuid"));
    }

    #[tokio::test]
    async fn test_configuration_and_debug_config() {
        let (status, body) = send(app(), get("/api/configuration")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isConfigured"], true);
        assert_eq!(body["hasAIKey"], true);

        let (status, _) = send(app(), Request::post("/api/configuration").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(app(), get("/api/debug-config")).await;
        assert_eq!(body["config"]["wordpressPassword"], "***SET***");
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_wordpress_diagnostic_status_codes() {
        let (status, body) = send(app_with(WordPressConfig::default()), get("/api/test-wordpress")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "WordPress configuration missing");

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let (status, body) = send(
            app_with(WordPressConfig::new(server.uri(), "admin", "secret")),
            get("/api/test-wordpress"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoint"], "Posts API");
    }
}
