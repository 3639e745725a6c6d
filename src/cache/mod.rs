//! Cache Module
//!
//! Byte values and the byte-budgeted LRU store each namespace keeps locally.

mod byte_value;
mod store;
mod stats;


// Re-export public types
pub use byte_value::ByteValue;
pub use store::{EvictionStore, OnEvicted};
pub use stats::{CacheStats, StatsCounters};

/// Size in bytes a value is charged against an [`EvictionStore`] budget.
pub trait ByteSize {
    fn byte_size(&self) -> usize;
}
