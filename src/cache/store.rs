//! Eviction Store Module
//!
//! Byte-budgeted LRU store. Recency bookkeeping is delegated to
//! `lru::LruCache` (unbounded mode) so get/put/evict stay O(1); this type
//! adds the byte accounting and the eviction loop on top.

use std::fmt;

use lru::LruCache;

use crate::cache::ByteSize;

/// Callback invoked with each entry removed to satisfy the byte budget.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

// == Eviction Store ==
/// Key/value store ordered by recency of access with a total byte budget.
///
/// Each entry is charged `key.len() + value.byte_size()` bytes. A budget of
/// zero disables eviction entirely.
///
/// Not synchronized; owners wrap it in a lock.
pub struct EvictionStore<V> {
    /// Maximum bytes allowed, 0 = unbounded
    max_bytes: usize,
    /// Bytes currently charged
    nbytes: usize,
    /// Entries, most recently used first
    entries: LruCache<String, V>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: ByteSize> EvictionStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given byte budget.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            entries: LruCache::unbounded(),
            on_evicted: None,
        }
    }

    /// Creates an empty store that reports every eviction to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: usize, on_evicted: OnEvicted<V>) -> Self {
        Self {
            on_evicted: Some(on_evicted),
            ..Self::new(max_bytes)
        }
    }

    // == Get ==
    /// Looks up a key and, on hit, marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    // == Put ==
    /// Inserts or replaces a value, then evicts least recently used
    /// entries until the store is back within budget.
    pub fn put(&mut self, key: String, value: V) {
        let value_size = value.byte_size();
        let key_size = key.len();

        match self.entries.put(key, value) {
            Some(old) => {
                self.nbytes = self.nbytes - old.byte_size() + value_size;
            }
            None => {
                self.nbytes += key_size + value_size;
            }
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, if any, and returns its key.
    pub fn remove_oldest(&mut self) -> Option<String> {
        let (key, value) = self.entries.pop_lru()?;
        self.nbytes -= key.len() + value.byte_size();
        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&key, &value);
        }
        Some(key)
    }

    /// Checks presence without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    // == Length ==
    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn bytes(&self) -> usize {
        self.nbytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl<V> fmt::Debug for EvictionStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionStore")
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .field("len", &self.entries.len())
            .finish()
    }
}
