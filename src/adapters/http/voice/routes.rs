//! HTTP routes for the voice webhooks.

use axum::{routing::post, Router};

use super::handlers::{call_status, continue_call, start_call, VoiceHandlers};

/// Creates the voice router, to be nested under `/voice`.
pub fn voice_routes(handlers: VoiceHandlers) -> Router {
    Router::new()
        .route("/start", post(start_call))
        .route("/continue", post(continue_call))
        .route("/status", post(call_status))
        .with_state(handlers)
}
