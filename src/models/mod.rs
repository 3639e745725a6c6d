//! Request and Response models
//!
//! Binary wire messages exchanged between peers, and the JSON DTOs served on
//! the operational endpoints.

pub mod peer;
pub mod responses;

// Re-export commonly used types
pub use peer::{PeerRequest, PeerResponse};
pub use responses::{HealthResponse, StatsResponse};
