//! API Routes
//!
//! Configures the Axum router for the peer endpoint and operational endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    empty_key_handler, health_handler, malformed_peer_path_handler, peer_get_handler,
    stats_handler, AppState,
};
use super::pool::normalize_base_path;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET <base_path>:group/:key` - Serve a value to a peer (binary body)
/// - `GET <base_path>:group/` - 400, empty key (404 if the group is unknown)
/// - `GET <base_path>` and `GET <base_path>:group` - 400, incomplete peer path
/// - `GET /stats/:group` - Namespace statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState, base_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let base_path = normalize_base_path(base_path);
    let peer_route = format!("{}:group/:key", base_path);
    let empty_key_route = format!("{}:group/", base_path);
    let group_only_route = format!("{}:group", base_path);

    Router::new()
        .route(&peer_route, get(peer_get_handler))
        .route(&empty_key_route, get(empty_key_handler))
        .route(&group_only_route, get(malformed_peer_path_handler))
        .route(&base_path, get(malformed_peer_path_handler))
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
