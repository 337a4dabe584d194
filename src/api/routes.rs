//! API Routes
//!
//! Configures the Axum router with the cache maintenance endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, health_handler, invalidate_handler, namespace_handler, stats_handler,
    sweep_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Storage and activity statistics
/// - `POST /sweep` - Remove expired entries
/// - `POST /invalidate` - Targeted invalidation for a mutated entity
/// - `DELETE /namespace/:namespace` - Drop every entry in a namespace
/// - `DELETE /cache` - Drop everything
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/sweep", post(sweep_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/namespace/:namespace", delete(namespace_handler))
        .route("/cache", delete(clear_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
