//! Response DTOs for the operational endpoints
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Namespace the counters belong to
    pub group: String,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / gets)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a stats snapshot
    pub fn new(group: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            group: group.into(),
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// This peer's identity
    pub peer: String,
    /// Registered namespaces
    pub groups: Vec<String>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(peer: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            peer: peer.into(),
            groups,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
