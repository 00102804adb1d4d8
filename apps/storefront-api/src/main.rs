//! # Sevmart Storefront API
//!
//! Process entry point: owns configuration, the database handle, and the
//! notifier, and wires them into the axum router. Components receive their
//! dependencies by constructor - nothing here is a global.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sevmart_db::{Database, DbConfig};
use sevmart_storefront_api::config::ApiConfig;
use sevmart_storefront_api::routes;
use sevmart_storefront_api::services::notify::Notifier;
use sevmart_storefront_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Sevmart storefront API...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path,
        bank = %config.bank.bank_code,
        "Configuration loaded"
    );

    // Connect to the database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    // Create shared state
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        notifier: Notifier::new(),
    });

    // Build the router and start serving
    let app = routes::router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
