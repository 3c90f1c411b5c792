//! HTTP API route definitions.

use axum::{routing::any, Router};

use super::handlers::{containers, images, logs, networks, stats, status, volumes, AppState};

/// Create the API router.
///
/// Routes accept every method so the handlers can answer non-GET requests
/// with a `METHOD_NOT_ALLOWED` envelope instead of axum's bare 405.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/api/status", any(status))
        // Key protected
        .route("/api/containers", any(containers))
        .route("/api/images", any(images))
        .route("/api/volumes", any(volumes))
        .route("/api/networks", any(networks))
        .route("/api/stats", any(stats))
        .route("/api/logs", any(logs))
        .with_state(state)
}
