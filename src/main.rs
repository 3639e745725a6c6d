//! Peercache - A distributed read-through cache node
//!
//! Serves the `scores` demo namespace and exchanges misses with the peers
//! listed in `PEERS`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::{create_router, AppState, Config, GetterFn, GroupRegistry, HttpPool};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register namespaces and bind them to the peer pool
/// 4. Start HTTP server on configured port
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
///
/// Startup configuration errors are logged and exit with status 1.
#[tokio::main]
async fn main() {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={}, cache_bytes={}, port={}",
        config.self_addr, config.peers, config.cache_bytes, config.server_port
    );

    if let Err(err) = run(config).await {
        error!("Startup failed: {:#}", err);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn run(config: Config) -> anyhow::Result<()> {
    let registry = Arc::new(GroupRegistry::new());
    let scores = registry
        .register("scores", config.cache_bytes, scores_loader())
        .context("registering namespace")?;

    let pool = Arc::new(HttpPool::from_config(&config));
    pool.configure_peers(&config.peer_list())
        .context("configuring peers")?;
    scores
        .register_peers(pool.clone())
        .context("binding peers to namespace")?;

    let app = create_router(AppState::new(registry, &config.self_addr), pool.base_path());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Cache node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    Ok(())
}

/// Demo data source standing in for a slow database.
fn scores_loader() -> GetterFn<impl Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync> {
    let db: HashMap<&'static str, &'static str> =
        [("Tom", "630"), ("Jack", "589"), ("Sam", "567")].into_iter().collect();

    GetterFn::new(move |key: &str| {
        info!("[SlowDB] search key {}", key);
        db.get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
