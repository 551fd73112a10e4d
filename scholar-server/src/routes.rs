//! HTTP routes for the research generation API.
//!
//! A single endpoint, `POST /api/generate`, takes `{"topic": ...}` and
//! returns the normalized `ResearchResult`. All error responses use the
//! shape `{"error": "<message>"}` with messages suitable for direct
//! display in a frontend.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use scholar_core::{ResearchProvider, ResearchResult, normalize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Shared handler state.
///
/// `provider` is `None` when no API key was available at startup; the
/// handler reports that per request instead of refusing to boot, so the
/// frontend still gets a useful error message.
pub struct AppState {
    pub provider: Option<Arc<dyn ResearchProvider>>,
}

/// A user-facing API error with its HTTP status.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the API router with CORS and request tracing.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/generate",
            post(generate).fallback(method_not_allowed),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ResearchResult>, ApiError> {
    let Ok(Json(body)) = payload else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Research topic is required.",
        ));
    };

    let topic = body
        .get("topic")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, "Research topic is required.")
        })?;

    let Some(provider) = &state.provider else {
        warn!("generation requested but no API key is configured");
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "API key is not configured on the server.",
        ));
    };

    info!(topic, model = provider.model_name(), "generating research");

    let raw = provider.generate_raw(topic).await.map_err(|e| {
        error!(topic, "provider call failed: {e}");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let result = normalize(&raw).map_err(|e| {
        error!(topic, "failed to normalize model output: {e}");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(
        topic,
        papers = result.paper_keys.len(),
        rows = result.comparison_table.len(),
        "research generated"
    );
    Ok(Json(result))
}
