//! API Handlers
//!
//! HTTP request handlers for the peer endpoint and the operational endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{CacheError, Result};
use crate::group::{Group, GroupRegistry};
use crate::models::{HealthResponse, PeerResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Namespaces this peer serves
    pub registry: Arc<GroupRegistry>,
    /// This peer's identity, reported by /health
    pub self_addr: Arc<str>,
}

impl AppState {
    /// Creates a new AppState over the given registry.
    pub fn new(registry: Arc<GroupRegistry>, self_addr: &str) -> Self {
        Self {
            registry,
            self_addr: Arc::from(self_addr),
        }
    }

    fn group(&self, name: &str) -> Result<Arc<Group>> {
        self.registry
            .get(name)
            .ok_or_else(|| CacheError::NamespaceNotFound(name.to_string()))
    }
}

/// Handler for GET <base_path>:group/:key
///
/// Serves a value to another peer as a bincode-encoded `PeerResponse`.
pub async fn peer_get_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<Response> {
    let group = state.group(&group)?;
    let value = group.get(&key).await?;

    let body = PeerResponse::new(value.to_vec())
        .encode()
        .map_err(|e| CacheError::Internal(format!("encoding response body: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], body).into_response())
}

/// Handler for GET <base_path>:group/ (empty key)
///
/// Unknown namespaces still answer 404; a known one rejects the empty key.
pub async fn empty_key_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Response> {
    peer_get_handler(State(state), Path((group, String::new()))).await
}

/// Handler for peer paths missing the group or key segment.
pub async fn malformed_peer_path_handler() -> CacheError {
    CacheError::InvalidArgument("expected <base_path><group>/<key>".to_string())
}

/// Handler for GET /stats/:group
///
/// Returns the namespace's counters.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state.group(&group)?;
    Ok(Json(StatsResponse::new(group.name(), group.stats())))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.self_addr.to_string(),
        state.registry.names(),
    ))
}
