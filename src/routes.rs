//! HTTP surface: call-ended webhook, call initiation, health, debug.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ProviderError;
use crate::initiate::{OutboundCallRequest, VoiceProvider};
use crate::pipeline::WebhookProcessor;
use crate::pipeline::types::WebhookReply;
use crate::recent::RecentEvents;

/// Whole-request bound. The webhook path's only blocking point (the
/// gateway call) is bounded well below this, so the always-200 contract
/// is not at risk from the layer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<WebhookProcessor>,
    /// Voice provider client (None if initiation is unconfigured).
    pub provider: Option<Arc<VoiceProvider>>,
    pub recent: RecentEvents,
}

/// Build the Axum router.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/call-ended", post(call_ended))
        .route("/call", post(initiate_call))
        .route("/debug/recent", get(recent_events))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

// ── Call-ended webhook ──────────────────────────────────────────────

/// POST /webhook/call-ended
///
/// Takes the raw body rather than a typed extractor: a typed rejection
/// would answer 4xx, and this endpoint must answer 200 no matter what
/// the provider sends.
async fn call_ended(State(state): State<AppState>, body: Bytes) -> Json<WebhookReply> {
    info!(bytes = body.len(), "Call-ended webhook received");

    let reply = state.processor.handle(&body).await;

    // Capture for /debug/recent; non-JSON bodies are stored as text.
    let payload = serde_json::from_slice(&body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
    state.recent.push(payload, reply.clone());

    Json(reply)
}

// ── Call initiation ─────────────────────────────────────────────────

/// POST /call
async fn initiate_call(
    State(state): State<AppState>,
    Json(request): Json<OutboundCallRequest>,
) -> Response {
    let Some(provider) = &state.provider else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "voice provider not configured"})),
        )
            .into_response();
    };

    let violations = request.validate();
    if !violations.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "validation failed",
                "violations": violations,
            })),
        )
            .into_response();
    }

    match provider.start_call(&request).await {
        Ok(handle) => Json(json!({
            "success": true,
            "conversation_id": handle.conversation_id,
            "call_id": handle.call_id,
        }))
        .into_response(),
        Err(ProviderError::RequestFailed { status, detail }) => {
            // Pass the provider's own status through where possible.
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({"success": false, "error": detail}))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": e.to_string()})),
        )
            .into_response(),
    }
}

// ── Debug ───────────────────────────────────────────────────────────

/// GET /debug/recent
async fn recent_events(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.recent.snapshot())
}
