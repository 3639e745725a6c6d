//! Cache Statistics Module
//!
//! Tracks per-namespace lookup, load and eviction counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Live counters owned by a namespace. Updated without taking the store lock.
#[derive(Debug, Default)]
pub struct StatsCounters {
    gets: AtomicU64,
    hits: AtomicU64,
    loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    local_load_errors: AtomicU64,
    evictions: AtomicU64,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// One singleflight computation started (not one per waiter).
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load_error(&self) {
        self.local_load_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters out, pairing them with the store's current size.
    pub fn snapshot(&self, entries: usize, bytes: usize) -> CacheStats {
        CacheStats {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            local_load_errors: self.local_load_errors.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries,
            bytes,
        }
    }
}

// == Cache Stats ==
/// Point-in-time copy of a namespace's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Every `get` call, including rejected ones
    pub gets: u64,
    /// Served straight from the eviction store
    pub hits: u64,
    /// Miss computations actually run (after deduplication)
    pub loads: u64,
    /// Values fetched from a remote peer
    pub peer_loads: u64,
    /// Remote fetches that failed and fell back to the loader
    pub peer_errors: u64,
    /// Successful local loader calls
    pub local_loads: u64,
    /// Failed local loader calls
    pub local_load_errors: u64,
    /// Entries dropped to respect the byte budget
    pub evictions: u64,
    /// Entries currently cached
    pub entries: usize,
    /// Bytes currently charged
    pub bytes: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / gets, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsCounters::new().snapshot(0, 0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::new();
        counters.record_get();
        counters.record_get();
        counters.record_hit();
        assert_eq!(counters.snapshot(1, 4).hit_rate(), 0.5);
    }

    #[test]
    fn test_snapshot_carries_sizes() {
        let counters = StatsCounters::new();
        counters.record_eviction();
        counters.record_eviction();
        counters.record_peer_error();

        let stats = counters.snapshot(42, 1024);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.peer_errors, 1);
        assert_eq!(stats.entries, 42);
        assert_eq!(stats.bytes, 1024);
    }
}
