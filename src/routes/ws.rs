use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::ws;
use crate::state::AppState;
use std::sync::Arc;

/// Create the WebSocket router
///
/// The `/ws/audio` endpoint is intentionally unauthenticated: connections are
/// short-lived audio processing pipelines and the audio is never persisted.
/// Deployments that need access control should put a reverse proxy in front
/// of the upgrade endpoint.
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws/audio", get(ws::ws_audio_handler))
        .layer(TraceLayer::new_for_http())
}
