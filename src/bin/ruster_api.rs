//! Ruster Scanner API Server
//!
//! Usage:
//!   cargo run --bin ruster_api
//!
//! Environment:
//!   PORT / RUSTER_PORT - Server port (default: 3000)
//!   RUSTER_HOST        - Server host (default: 0.0.0.0)
//!   RUST_LOG           - Log filter (default: info)
//!   See `ScannerConfig` for provider URLs, keys and score limits

use ruster_scanner::api::{create_router, start_cleanup_task, AppState};
use ruster_scanner::{ScanCache, Scanner, ScannerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    info!("🚀 Ruster Scanner API v{}", env!("CARGO_PKG_VERSION"));

    let config = ScannerConfig::from_env();
    let cache = ScanCache::with_ttl(config.cache_ttl_secs);
    let scanner = Scanner::from_config(&config)?.with_store(Arc::new(cache.clone()));

    let state = Arc::new(AppState::new(Arc::new(scanner), cache));
    state.spawn_cache_cleanup(Duration::from_secs(60));
    start_cleanup_task();
    info!("🧹 Background cleanup tasks started");

    let app = create_router(state.clone());
    let addr: SocketAddr = config.bind_addr().parse()?;

    info!("🌐 Listening on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/scan    - Full token scan");
    info!("  GET  /v1/stats   - Scan, cache and scrape statistics");
    info!("  GET  /v1/health  - Health check");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("🛑 Shutdown signal received");
    let stats = state.telemetry().get_stats();
    info!("   Scans completed: {}", stats.scans_completed);
    info!("   Scans failed: {}", stats.scans_failed);
    info!("   Avg latency: {:.0}ms", stats.avg_latency_ms);
    info!("👋 Ruster Scanner API shutdown complete");

    Ok(())
}
