//! API Module
//!
//! HTTP transport between peers: the server-side router, the client-side
//! getter and the pool that picks which peer to ask.
//!
//! # Endpoints
//! - `GET <base_path>:group/:key` - Serve a value to another peer
//! - `GET /stats/:group` - Namespace statistics
//! - `GET /health` - Health check endpoint

pub mod client;
pub mod handlers;
pub mod pool;
pub mod routes;

pub use client::HttpGetter;
pub use handlers::*;
pub use pool::HttpPool;
pub use routes::create_router;
