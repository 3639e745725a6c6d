//! Configuration Module
//!
//! Handles loading peer and cache configuration from environment variables.

use std::env;

/// Default path prefix under which peers serve each other.
pub const DEFAULT_BASE_PATH: &str = "/_geecache/";

/// Default number of virtual nodes per physical peer.
pub const DEFAULT_REPLICAS: usize = 50;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// This peer's identity, as the base URL other peers reach it on
    pub self_addr: String,
    /// Comma-separated base URLs of every peer, self included
    pub peers: String,
    /// Byte budget of each namespace's eviction store (0 = unbounded)
    pub cache_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Path prefix of the peer endpoint
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SELF_ADDR` - This peer's base URL (default: http://localhost:8001)
    /// - `PEERS` - Comma-separated peer base URLs (default: SELF_ADDR)
    /// - `CACHE_BYTES` - Byte budget per namespace (default: 2048)
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `BASE_PATH` - Peer endpoint prefix (default: /_geecache/)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let self_addr = env::var("SELF_ADDR").unwrap_or(defaults.self_addr);

        Self {
            peers: env::var("PEERS").unwrap_or_else(|_| self_addr.clone()),
            self_addr,
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_bytes),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            replicas: env::var("REPLICAS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.replicas),
        }
    }

    /// Splits `peers` into a trimmed, de-duplicated list, keeping first-seen order.
    pub fn peer_list(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for peer in self.peers.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if !out.iter().any(|p| p == peer) {
                out.push(peer.to_string());
            }
        }
        out
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_addr: "http://localhost:8001".to_string(),
            peers: "http://localhost:8001".to_string(),
            cache_bytes: 2 << 10,
            server_port: 8001,
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
        }
    }
}
