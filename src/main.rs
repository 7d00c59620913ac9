//! sum-api: overflow-checked integer addition over HTTP.
//!
//! # Usage
//!
//! ```bash
//! sum-api --port 8080 --log-level info
//! ```
//!
//! Environment variables can also be used:
//! - `SUM_API_PORT`: Port to listen on
//! - `LOG_LEVEL` / `RUST_LOG`: Log level or filter
//! - `ENVIRONMENT=local`: Human-readable logs instead of JSON
//! - `JAEGER_ENDPOINT`: OTLP gRPC collector for span export

use sum_api::config::Config;
use sum_api::observability::tracing::init_tracing;
use sum_api::server::run_server;
use tokio::sync::watch;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r#"
  sum-api v{}

  Configuration:
    Address:    {}:{}
    Log Level:  {}
    Metrics:    {}
    Tracing:    {}
    Exporter:   {}

  Press Ctrl+C to shutdown gracefully.
"#,
        version,
        config.host,
        config.port,
        config.log_level,
        config.metrics,
        config.tracing,
        config.otel_endpoint.as_deref().unwrap_or("none"),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize logging and span export; the guard flushes spans on exit
    let _tracing_guard = init_tracing(&config)?;

    print_banner(&config);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        // Wait for SIGTERM or SIGINT (Ctrl+C)
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for ctrl+c");
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        let _ = shutdown_tx.send(true);
    });

    if let Err(e) = run_server(config, shutdown_rx).await {
        tracing::error!(error = %e, "Server failed");
        return Err(e);
    }

    tracing::info!("sum-api shutdown complete");
    Ok(())
}
