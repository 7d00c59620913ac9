//! HTTP server setup and lifecycle.
//!
//! Configures axum with:
//! - Sum, health and metrics routes
//! - Graceful shutdown support

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::Config;
use crate::service::{router, AppState};

/// Run the sum-api HTTP server.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `shutdown_rx` - Receiver for shutdown signal
///
/// # Returns
///
/// Returns when the server has shut down.
pub async fn run_server(config: Config, shutdown_rx: watch::Receiver<bool>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, &config, shutdown_rx).await
}

/// Serve on an already bound listener until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    config: &Config,
    mut shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let state = AppState::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to create metrics registry: {e}"))?;

    tracing::info!(
        address = %listener.local_addr()?,
        metrics = state.metrics.is_some(),
        tracing = state.tracing,
        simulated_latency_ms = config.simulated_latency_ms,
        "Starting sum-api HTTP server"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            tracing::info!("Shutdown signal received, stopping server");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
