//! HTTP boundary.
//!
//! Thin axum layer around the serving core. Metrics are incremented and
//! observed here, once per request; core failures map to a 500 with the
//! error's message and no partial answer.

pub mod schemas;

use crate::judge::JudgeLoop;
use crate::rag::RagPipeline;
use crate::telemetry::MetricsRegistry;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use schemas::{ChatRequest, ChatResponse, JudgeResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared, read-only application state
pub struct AppState {
    pub pipeline: RagPipeline,
    pub judge: JudgeLoop,
    pub metrics: MetricsRegistry,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/judge", post(judge))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn run_server(state: Arc<AppState>, addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "serving");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    const ENDPOINT: &str = "/chat";
    state.metrics.record_request(ENDPOINT);
    let start = Instant::now();

    let outcome = state
        .pipeline
        .ask(&request.question, request.top_k, request.temperature)
        .await
        .map_err(|e| {
            state.metrics.record_error(ENDPOINT);
            error!(error = %e, "chat request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    state
        .metrics
        .observe_latency(ENDPOINT, start.elapsed().as_secs_f64());

    let record = outcome.into_record(state.pipeline.preview_chars());
    state.metrics.observe_retrieved_chunks(record.source_count);

    Ok(Json(record.into()))
}

async fn judge(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<JudgeResponse>, (StatusCode, String)> {
    const ENDPOINT: &str = "/judge";
    state.metrics.record_request(ENDPOINT);
    let start = Instant::now();

    // The judge path runs on configured defaults; request-level top_k and
    // temperature overrides are intentionally not forwarded.
    let result = state.judge.evaluate(&request.question).await.map_err(|e| {
        state.metrics.record_error(ENDPOINT);
        error!(error = %e, "judge request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    state
        .metrics
        .observe_latency(ENDPOINT, start.elapsed().as_secs_f64());
    state.metrics.observe_retrieved_chunks(result.sources.len());

    Ok(Json(result.into()))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.metrics.render(),
    )
}
