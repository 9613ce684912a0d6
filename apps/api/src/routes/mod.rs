pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::analysis::handlers;
use crate::media::UPLOADS_PREFIX;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handlers::handle_analyze))
        .route("/manual-analyze", post(handlers::handle_manual_analyze))
        // Uploaded images, unauthenticated
        .nest_service(UPLOADS_PREFIX, ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
