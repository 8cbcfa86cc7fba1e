//! Imperium game engine HTTP service.
//!
//! # Configuration
//!
//! - `IMPERIUM_DATABASE` - SQLite database path (default: /data/imperium.db)
//! - `IMPERIUM_DATA_DIR` - directory holding the CSV catalogs
//! - `SCAN_INTERVAL_SECS` - construction scan period (default: 10)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - log level (default: info)
//! - `LOG_FORMAT` - json (default) or text

use std::net::SocketAddr;

use tracing::{error, info};

use imperium_service::{router, spawn_scan_loop};
use imperium_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("imperium");
    init_logging(&logging_config);

    if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        database = %config.database.display(),
        port = config.port,
        scan_interval_secs = config.scan_interval.as_secs(),
        "starting imperium service"
    );

    let state = AppState::load(&config).map_err(|e| {
        error!(error = %e, "failed to load application state");
        e
    })?;
    info!(
        modules = state.catalog().modules.len(),
        research = state.catalog().research.len(),
        buildings = state.catalog().buildings.len(),
        "application state loaded"
    );

    let scanner = spawn_scan_loop(state.clone(), config.scan_interval);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scanner.abort();
    info!("imperium service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
