//! HTTP surface of the bridge: `/chat`, `/health` and `/test-mcp`.
//!
//! Handlers are generic over the completion client so the router can be
//! exercised end to end against a mock in tests.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::client::Completion;
use crate::orchestrator::{BridgeError, Orchestrator};

/// Shared handler state. `Clone` is implemented by hand because deriving
/// it would demand `C: Clone`, which the Arc makes unnecessary.
pub struct AppState<C: Completion> {
    pub orchestrator: Arc<Orchestrator<C>>,
    pub gemini_configured: bool,
}

impl<C: Completion> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            gemini_configured: self.gemini_configured,
        }
    }
}

/// Build the bridge router with tracing and permissive CORS.
pub fn router<C: Completion + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/chat", post(chat::<C>))
        .route("/health", get(health::<C>))
        .route("/test-mcp", get(test_mcp::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    mcp_connected: bool,
    gemini_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_tools: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolSummary {
    name: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct TestMcpResponse {
    message: &'static str,
    tools: Vec<ToolSummary>,
}

async fn chat<C: Completion>(
    State(state): State<AppState<C>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let prompt = match request.prompt.as_deref().map(str::trim) {
        Some(prompt) if !prompt.is_empty() => prompt.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "Prompt is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    if !state.gemini_configured {
        return bridge_error_response(BridgeError::Config(
            "Gemini API key not configured".to_string(),
        ));
    }

    match state.orchestrator.chat(&prompt).await {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(e) => bridge_error_response(e),
    }
}

fn bridge_error_response(error: BridgeError) -> Response {
    error!("chat request failed: {error}");
    let message = match error {
        BridgeError::Config(message) => message,
        other => other.to_string(),
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody { error: message }),
    )
        .into_response()
}

async fn health<C: Completion>(State(state): State<AppState<C>>) -> Response {
    match state.orchestrator.tools().await {
        Ok(tools) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                mcp_connected: true,
                gemini_configured: state.gemini_configured,
                available_tools: Some(tools.len()),
                tools: Some(tools.iter().map(|t| t.name.to_string()).collect()),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                mcp_connected: false,
                gemini_configured: state.gemini_configured,
                available_tools: None,
                tools: None,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

async fn test_mcp<C: Completion>(State(state): State<AppState<C>>) -> Response {
    match state.orchestrator.tools().await {
        Ok(tools) => (
            StatusCode::OK,
            Json(TestMcpResponse {
                message: "MCP connection test successful",
                tools: tools
                    .iter()
                    .map(|t| ToolSummary {
                        name: t.name.to_string(),
                        description: t.description.as_deref().unwrap_or_default().to_string(),
                    })
                    .collect(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
