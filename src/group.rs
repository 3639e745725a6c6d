//! Namespace Module
//!
//! A [`Group`] is one named cache dataset: a byte-budgeted local store, a
//! loader for misses, an optional peer picker and the singleflight layer that
//! keeps concurrent misses for one key down to a single computation.
//! [`GroupRegistry`] holds every group a process serves.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{ByteValue, CacheStats, EvictionStore, StatsCounters};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::SingleFlight;

// == Getter ==
/// Loads the value for a key from the backing data source on a local miss.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts a plain closure into a [`Getter`].
pub struct GetterFn<F>(F);

impl<F> GetterFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == Group ==
pub struct Group {
    name: String,
    getter: Box<dyn Getter>,
    main_cache: Mutex<EvictionStore<ByteValue>>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: SingleFlight<Result<ByteValue>>,
    stats: Arc<StatsCounters>,
}

impl Group {
    /// Creates a standalone group. Use [`GroupRegistry::register`] to make it
    /// reachable from peers.
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: impl Getter + 'static) -> Self {
        let stats = Arc::new(StatsCounters::new());
        let on_evicted = {
            let stats = Arc::clone(&stats);
            Box::new(move |_: &str, _: &ByteValue| stats.record_eviction())
        };

        Self {
            name: name.into(),
            getter: Box::new(getter),
            main_cache: Mutex::new(EvictionStore::with_eviction_callback(cache_bytes, on_evicted)),
            peers: OnceLock::new(),
            loader: SingleFlight::new(),
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Binds the peer picker. Allowed once per group; a second call is a
    /// wiring bug and is reported as [`CacheError::Configuration`].
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Configuration(format!(
                "register_peers called more than once for group {}",
                self.name
            ))
        })
    }

    // == Get ==
    /// Returns the value for `key`, from the local store, the owning peer or
    /// the loader, in that order.
    pub async fn get(&self, key: &str) -> Result<ByteValue> {
        self.stats.record_get();
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }

        if let Some(value) = self.lookup_cache(key) {
            self.stats.record_hit();
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    /// Point-in-time counters plus current store size.
    pub fn stats(&self) -> CacheStats {
        let (entries, bytes) = {
            let cache = self.main_cache.lock();
            (cache.len(), cache.bytes())
        };
        self.stats.snapshot(entries, bytes)
    }

    fn lookup_cache(&self, key: &str) -> Option<ByteValue> {
        self.main_cache.lock().get(key).cloned()
    }

    async fn load(&self, key: &str) -> Result<ByteValue> {
        self.loader
            .work(key, || async {
                self.stats.record_load();

                if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => {
                            self.stats.record_peer_load();
                            return Ok(value);
                        }
                        Err(err) => {
                            self.stats.record_peer_error();
                            warn!(
                                group = %self.name,
                                key,
                                peer = peer.addr(),
                                error = %err,
                                "failed to get from peer, loading locally"
                            );
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    /// Remote values are returned as-is and never cached here; the owning
    /// peer holds them.
    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteValue> {
        let bytes = peer.fetch(&self.name, key).await?;
        Ok(ByteValue::from(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteValue> {
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.record_local_load_error();
                return Err(CacheError::Loader(err.to_string()));
            }
        };
        self.stats.record_local_load();

        let value = ByteValue::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteValue) {
        self.main_cache.lock().put(key.to_string(), value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("peers_registered", &self.peers.get().is_some())
            .field("main_cache", &*self.main_cache.lock())
            .finish()
    }
}

// == Group Registry ==
/// Every namespace served by this process, keyed by name.
///
/// Append-only: groups are registered during startup and live as long as the
/// registry.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a group. Names are unique; registering one twice
    /// is a [`CacheError::Configuration`] error.
    pub fn register(
        &self,
        name: impl Into<String>,
        cache_bytes: usize,
        getter: impl Getter + 'static,
    ) -> Result<Arc<Group>> {
        let name = name.into();
        let mut groups = self.groups.write();
        if groups.contains_key(&name) {
            return Err(CacheError::Configuration(format!(
                "group {} is already registered",
                name
            )));
        }

        let group = Arc::new(Group::new(name.clone(), cache_bytes, getter));
        groups.insert(name.clone(), Arc::clone(&group));
        info!(group = %name, cache_bytes, "registered group");
        Ok(group)
    }

    /// Looks a group up by name.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }
}
