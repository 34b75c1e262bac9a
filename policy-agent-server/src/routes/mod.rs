//! HTTP route handlers

mod agent;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{AppState, StatsSnapshot};

pub use agent::{ApiError, AGENT_PATH};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "policy-agent-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Stats endpoint
async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route(
            AGENT_PATH,
            post(agent::forward_chat).options(agent::preflight),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
