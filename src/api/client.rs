//! HTTP Peer Client
//!
//! Fetches values from a remote peer's `<base>/<group>/<key>` endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{PeerRequest, PeerResponse};
use crate::peers::PeerGetter;

/// Handle to one remote peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    /// Peer identity, e.g. `http://10.0.0.2:8001`
    addr: String,
    /// Peer identity followed by the endpoint prefix
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    pub fn new(addr: impl Into<String>, base_path: &str, client: reqwest::Client) -> Self {
        let addr = addr.into();
        Self {
            base_url: format!("{}{}", addr.trim_end_matches('/'), base_path),
            addr,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = PeerRequest::new(group, key).url(&self.base_url);
        debug!(url = %url, "fetching from peer");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::PeerFetch(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CacheError::PeerFetch(format!("server returned: {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::PeerFetch(format!("reading response body: {}", e)))?;

        let decoded = PeerResponse::decode(&body)
            .map_err(|e| CacheError::PeerFetch(format!("decoding response body: {}", e)))?;

        Ok(decoded.value)
    }

    fn addr(&self) -> &str {
        &self.addr
    }
}
