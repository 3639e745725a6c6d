//! Peer wire messages
//!
//! A fetch is addressed entirely by its URL (`<base>/<group>/<key>`); the
//! reply body is a bincode-encoded [`PeerResponse`].

use serde::{Deserialize, Serialize};

/// What one peer asks another for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRequest {
    pub group: String,
    pub key: String,
}

impl PeerRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }

    /// Full URL of this request on a peer whose endpoint is `base_url`
    /// (which ends with `/`). Both segments are percent-encoded.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}{}/{}",
            base_url,
            urlencoding::encode(&self.group),
            urlencoding::encode(&self.key)
        )
    }
}

/// Body of a successful peer reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerResponse {
    pub value: Vec<u8>,
}

impl PeerResponse {
    pub fn new(value: Vec<u8>) -> Self {
        Self { value }
    }

    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}
