use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;
use std::sync::Arc;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/keywords", get(api::list_keywords))
        .route("/analyze", post(api::analyze_text))
        .route("/test", get(api::test_text))
        .layer(TraceLayer::new_for_http())
}
