//! HTTP Peer Pool
//!
//! Picks the owning peer for a key from the consistent hash ring and hands
//! back an [`HttpGetter`] for it. The peer set can be replaced at any time;
//! lookups in progress keep using the ring they started with.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::client::HttpGetter;
use crate::config::{Config, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
use crate::consistent_hash::HashRing;
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};

/// Ring plus address -> client table, always swapped together.
#[derive(Debug)]
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
#[derive(Debug)]
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    client: reqwest::Client,
    state: RwLock<Arc<PoolState>>,
}

impl HttpPool {
    /// Creates a pool with no peers; every key is served locally until
    /// [`HttpPool::configure_peers`] is called.
    pub fn new(self_addr: impl Into<String>, base_path: &str, replicas: usize) -> Self {
        Self {
            self_addr: normalize_peer_addr(&self_addr.into()),
            base_path: normalize_base_path(base_path),
            replicas,
            client: reqwest::Client::new(),
            state: RwLock::new(Arc::new(PoolState {
                ring: HashRing::new(replicas),
                getters: HashMap::new(),
            })),
        }
    }

    /// Creates a pool with the default base path and replica count.
    pub fn with_defaults(self_addr: impl Into<String>) -> Self {
        Self::new(self_addr, DEFAULT_BASE_PATH, DEFAULT_REPLICAS)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.self_addr.clone(), &config.base_path, config.replicas)
    }

    // == Configure Peers ==
    /// Replaces the peer set. The new ring and client table become visible
    /// together; readers never see a mix of old and new.
    pub fn configure_peers<S: AsRef<str>>(&self, peers: &[S]) -> Result<()> {
        let mut ring = HashRing::new(self.replicas);
        let mut getters = HashMap::with_capacity(peers.len());

        let mut addrs = Vec::with_capacity(peers.len());

        for peer in peers {
            let peer = peer.as_ref();
            if !(peer.starts_with("http://") || peer.starts_with("https://")) {
                return Err(CacheError::Configuration(format!(
                    "peer address {:?} must be an http(s) URL",
                    peer
                )));
            }
            let addr = normalize_peer_addr(peer);
            getters.insert(
                addr.clone(),
                Arc::new(HttpGetter::new(addr.as_str(), &self.base_path, self.client.clone())),
            );
            addrs.push(addr);
        }
        ring.add(addrs);

        *self.state.write() = Arc::new(PoolState { ring, getters });
        self.log(&format!("configured {} peer(s)", peers.len()));
        Ok(())
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Current peer identities.
    pub fn peers(&self) -> Vec<String> {
        self.state.read().ring.peers().to_vec()
    }

    fn log(&self, message: &str) {
        info!("[Server {}] {}", self.self_addr, message);
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = Arc::clone(&self.state.read());
        let peer = state.ring.pick_peer(key)?;
        if peer == self.self_addr {
            return None;
        }

        self.log(&format!("Pick peer {}", peer));
        let getter = state.getters.get(peer)?;
        Some(Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}

/// Canonical peer identity, without a trailing `/`.
pub fn normalize_peer_addr(addr: &str) -> String {
    addr.trim_end_matches('/').to_string()
}

/// Ensures a leading and a trailing `/`.
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF: &str = "http://localhost:8001";

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("_geecache"), "/_geecache/");
        assert_eq!(normalize_base_path("/_geecache/"), "/_geecache/");
        assert_eq!(normalize_base_path(""), "/");
    }

    #[test]
    fn test_normalize_peer_addr() {
        assert_eq!(normalize_peer_addr("http://h:1/"), "http://h:1");
        assert_eq!(normalize_peer_addr("http://h:1"), "http://h:1");
    }

    #[test]
    fn test_trailing_slash_on_self_is_still_self() {
        let pool = HttpPool::with_defaults("http://localhost:8001/");
        pool.configure_peers(&[SELF]).unwrap();
        assert_eq!(pool.self_addr(), SELF);
        for i in 0..100 {
            assert!(pool.pick_peer(&format!("key{}", i)).is_none());
        }
    }

    #[test]
    fn test_trailing_slash_on_peer_is_still_self() {
        let pool = HttpPool::with_defaults(SELF);
        pool.configure_peers(&["http://localhost:8001/", SELF]).unwrap();
        assert_eq!(pool.peers(), vec![SELF.to_string()]);
        for i in 0..100 {
            assert!(pool.pick_peer(&format!("key{}", i)).is_none());
        }
    }

    #[test]
    fn test_unconfigured_pool_serves_locally() {
        let pool = HttpPool::with_defaults(SELF);
        assert!(pool.pick_peer("Tom").is_none());
    }

    #[test]
    fn test_self_only_pool_serves_locally() {
        let pool = HttpPool::with_defaults(SELF);
        pool.configure_peers(&[SELF]).unwrap();
        for i in 0..100 {
            assert!(pool.pick_peer(&format!("key{}", i)).is_none());
        }
    }

    #[test]
    fn test_remote_owner_is_picked() {
        let pool = HttpPool::with_defaults(SELF);
        pool.configure_peers(&["http://localhost:8002"]).unwrap();

        let peer = pool.pick_peer("Tom").unwrap();
        assert_eq!(peer.addr(), "http://localhost:8002");
    }

    #[test]
    fn test_picks_split_between_self_and_remote() {
        let pool = HttpPool::with_defaults(SELF);
        pool.configure_peers(&[SELF, "http://localhost:8002", "http://localhost:8003"])
            .unwrap();

        let remote = (0..300)
            .filter(|i| pool.pick_peer(&format!("key{}", i)).is_some())
            .count();
        assert!(remote > 0 && remote < 300, "remote picks: {}", remote);
    }

    #[test]
    fn test_reconfigure_replaces_peers() {
        let pool = HttpPool::with_defaults(SELF);
        pool.configure_peers(&["http://localhost:8002"]).unwrap();
        pool.configure_peers(&["http://localhost:8003"]).unwrap();

        assert_eq!(pool.peers(), vec!["http://localhost:8003".to_string()]);
        assert_eq!(pool.pick_peer("Tom").unwrap().addr(), "http://localhost:8003");
    }

    #[test]
    fn test_invalid_peer_address_keeps_old_ring() {
        let pool = HttpPool::with_defaults(SELF);
        pool.configure_peers(&["http://localhost:8002"]).unwrap();

        let err = pool.configure_peers(&["localhost:8003"]).unwrap_err();
        assert!(matches!(err, CacheError::Configuration(_)));
        assert_eq!(pool.peers(), vec!["http://localhost:8002".to_string()]);
    }
}
