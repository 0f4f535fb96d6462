use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use pw_core::{Article, Error, NewArticle, PublishedPost, UsageReport};
use pw_inference::prompt::PartRequest;
use pw_pipeline::wordpress::diagnostics::{test_connection, ConfigurationStatus, DebugConfigReport};
use pw_pipeline::PublishRequest;
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use crate::AppState;

/// Maps pipeline errors onto `{error}` JSON bodies.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Error::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub async fn generate_part(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PartRequest>,
) -> ApiResult<Value> {
    let markdown = state.manager.generate_part(&request).await?;
    Ok(Json(json!({ "markdown": markdown })))
}

pub async fn publish_article(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<PublishedPost> {
    Ok(Json(state.manager.publish_markdown(&request).await?))
}

pub async fn publish_test() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Publish endpoint is accessible",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Article>> {
    Ok(Json(state.manager.articles().await?))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewArticle>,
) -> ApiResult<Article> {
    Ok(Json(state.manager.submit(request).await?))
}

pub async fn get_article(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Article> {
    let id = Uuid::parse_str(&id).map_err(|_| Error::NotFound(format!("Article {} not found", id)))?;
    Ok(Json(state.manager.article(id).await?))
}

pub async fn usage(State(state): State<Arc<AppState>>) -> Json<UsageReport> {
    Json(state.manager.usage())
}

pub async fn configuration(State(state): State<Arc<AppState>>) -> Json<ConfigurationStatus> {
    Json(ConfigurationStatus::from_settings(&state.settings))
}

pub async fn debug_config(State(state): State<Arc<AppState>>) -> Json<DebugConfigReport> {
    Json(DebugConfigReport::from_settings(&state.settings))
}

pub async fn test_wordpress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = test_connection(&state.client, &state.settings.wordpress).await;
    let status = if report.success { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    (status, Json(report))
}
