//! # Pantry API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scanner app ───► HTTP (8000) ───► routes ───► SQLite inventory         │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                              external product DB                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pantry_api::{router, ApiConfig, AppState, DEFAULT_LOG_FILTER};
use pantry_db::Database;
use pantry_lookup::ProductSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Pantry API server...");

    // Load configuration
    let config = ApiConfig::load().context("Invalid configuration")?;
    info!(
        addr = %config.bind_addr,
        db = %config.database_path.display(),
        upstream = %config.product_api_url,
        "Configuration loaded"
    );

    // Open the inventory store (runs migrations)
    let db = Database::new(config.db_config())
        .await
        .context("Failed to open inventory database")?;
    info!("Inventory database ready");

    let source =
        ProductSource::new(config.source_config()).context("Failed to build product client")?;

    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(db.clone(), source, config));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
