//! Peers Module
//!
//! Peer-protocol capabilities the namespace coordinator depends on.
//!
//! The coordinator only needs to know *which* peer owns a key and *how* to
//! ask it; transport and encoding live behind these two traits
//! (see [`crate::api::HttpPool`] for the HTTP implementation).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// == Peer Picker ==
/// Resolves the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer's handle, or `None` when the key should be
    /// served locally (self owns it, or no peers are configured).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Fetches `key` from namespace `group` on the remote peer.
    ///
    /// Transport, status and decoding failures come back as
    /// [`crate::error::CacheError::PeerFetch`], never as a partial value.
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>>;

    /// Identity of the remote peer, for logging.
    fn addr(&self) -> &str;
}
