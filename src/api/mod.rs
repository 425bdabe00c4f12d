pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use handlers::{
    append_log, create_filament, delete_filament, get_filament, health, list_filaments, list_logs,
    AppState,
};

/// Photos travel inline as base64, so requests can be large
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Build the JSON API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/filaments", get(list_filaments).post(create_filament))
        .route("/api/filaments/:id", get(get_filament).delete(delete_filament))
        .route("/api/logs", post(append_log))
        .route("/api/logs/:filament_id", get(list_logs))
        .route("/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on an already-bound listener until the process stops
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
