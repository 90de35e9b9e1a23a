//! Liveness endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::ports::SessionStore;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

/// GET /health
pub async fn health(State(store): State<Arc<dyn SessionStore>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: store.len().await,
    })
}

pub fn health_routes(store: Arc<dyn SessionStore>) -> Router {
    Router::new().route("/health", get(health)).with_state(store)
}
