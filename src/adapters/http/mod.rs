//! HTTP adapters - webhook endpoints for the telephony platform.

pub mod health;
pub mod voice;

pub use health::health_routes;
pub use voice::{voice_routes, TwimlSettings, VoiceHandlers};

use axum::Router;

use crate::ports::SessionStore;
use std::sync::Arc;

/// Assembles the full service router.
pub fn app_router(handlers: VoiceHandlers, store: Arc<dyn SessionStore>) -> Router {
    Router::new()
        .nest("/voice", voice_routes(handlers))
        .merge(health_routes(store))
}
