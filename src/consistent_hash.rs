//! Consistent Hash Module
//!
//! Consistent hashing with virtual nodes.
//!
//! Each physical peer is placed on the ring `replicas` times, at the hash of
//! `"{i}{peer}"` for `i in 0..replicas`. A key belongs to the first point
//! whose hash is greater than or equal to the key's hash, wrapping around to
//! the smallest point.

use std::collections::BTreeMap;
use std::hash::Hasher;

use twox_hash::XxHash64;

// == Hash Function ==
/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = fn(&[u8]) -> u64;

/// xxHash64 with a zero seed, the default ring hash.
pub fn xxhash64(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

// == Hash Ring ==
/// A consistent hash ring over peer identities.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    /// Virtual nodes per physical peer.
    replicas: usize,
    /// Ring position -> owning peer.
    points: BTreeMap<u64, String>,
    /// Physical peers, in insertion order.
    peers: Vec<String>,
}

impl HashRing {
    /// Create an empty ring using xxHash64.
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, xxhash64)
    }

    /// Create an empty ring with a custom hash function.
    pub fn with_hash(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas: replicas.max(1),
            points: BTreeMap::new(),
            peers: Vec::new(),
        }
    }

    // == Membership ==
    /// Add peers to the ring. Peers already present are skipped.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for peer in peers {
            let peer = peer.into();
            if self.peers.contains(&peer) {
                continue;
            }
            for i in 0..self.replicas {
                let point = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.points.insert(point, peer.clone());
            }
            self.peers.push(peer);
        }
    }

    /// Replace the whole peer set.
    pub fn configure<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.points.clear();
        self.peers.clear();
        self.add(peers);
    }

    // == Lookup ==
    /// The peer owning `key`, or `None` when the ring is empty.
    pub fn pick_peer(&self, key: &str) -> Option<&str> {
        let hash = (self.hash)(key.as_bytes());
        self.points
            .range(hash..)
            .next()
            .or_else(|| self.points.iter().next())
            .map(|(_, peer)| peer.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of physical peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Reads the key as a decimal number, so ring positions are predictable.
    fn decimal(data: &[u8]) -> u64 {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(50);
        assert!(ring.is_empty());
        assert_eq!(ring.pick_peer("key"), None);
    }

    #[test]
    fn test_hashing_with_wraparound() {
        let mut ring = HashRing::with_hash(3, decimal);
        // points: 2, 4, 6, 12, 14, 16, 22, 24, 26
        ring.add(["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, peer) in cases {
            assert_eq!(ring.pick_peer(key), Some(peer), "key {}", key);
        }

        // adds 8, 18, 28: 27 now lands on 8
        ring.add(["8"]);
        assert_eq!(ring.pick_peer("27"), Some("8"));
        assert_eq!(ring.pick_peer("11"), Some("2"));
    }

    #[test]
    fn test_single_peer_owns_everything() {
        let mut ring = HashRing::new(50);
        ring.add(["http://localhost:8001"]);
        for i in 0..100 {
            assert_eq!(ring.pick_peer(&format!("key{}", i)), Some("http://localhost:8001"));
        }
    }

    #[test]
    fn test_pick_is_deterministic() {
        let mut a = HashRing::new(50);
        let mut b = HashRing::new(50);
        a.add(["http://a:1", "http://b:2", "http://c:3"]);
        b.add(["http://c:3", "http://a:1", "http://b:2"]);

        for i in 0..500 {
            let key = format!("key-{}", i);
            assert_eq!(a.pick_peer(&key), a.pick_peer(&key));
            assert_eq!(a.pick_peer(&key), b.pick_peer(&key));
        }
    }

    #[test]
    fn test_configure_replaces_ring() {
        let mut ring = HashRing::new(10);
        ring.add(["http://old:1"]);
        ring.configure(["http://new:1", "http://new:2"]);

        assert_eq!(ring.len(), 2);
        for i in 0..200 {
            let peer = ring.pick_peer(&format!("k{}", i)).unwrap();
            assert!(peer.starts_with("http://new"));
        }
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut ring = HashRing::new(10);
        ring.add(["p1", "p1"]);
        ring.add(["p1"]);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_distribution() {
        let peers = ["http://10.0.0.1:8001", "http://10.0.0.2:8001", "http://10.0.0.3:8001"];
        let mut ring = HashRing::new(100);
        ring.add(peers);

        let sample = 30_000;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for i in 0..sample {
            let key = format!("sample_key_{}", i);
            *counts.entry(ring.pick_peer(&key).unwrap()).or_insert(0) += 1;
        }

        let average = sample / peers.len();
        for peer in peers {
            let count = counts.get(peer).copied().unwrap_or(0);
            assert!(
                count * 2 <= average * 3,
                "peer {} got {} keys, average {}",
                peer,
                count,
                average
            );
        }
    }
}
