//! Peercache - A distributed read-through cache
//!
//! Each peer keeps a byte-budgeted LRU slice of every namespace. Misses are
//! routed over consistent hashing to the owning peer, which falls back to the
//! namespace's loader; concurrent misses for one key share one computation.

pub mod api;
pub mod cache;
pub mod config;
pub mod consistent_hash;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod singleflight;

pub use api::{create_router, AppState, HttpPool};
pub use cache::ByteValue;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, GetterFn, Group, GroupRegistry};
pub use peers::{PeerGetter, PeerPicker};
