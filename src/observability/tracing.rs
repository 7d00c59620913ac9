//! Logging and OpenTelemetry tracing setup.
//!
//! Configures:
//! - Structured logs as JSON, or human-readable text for local runs
//! - Environment-based filter (RUST_LOG wins over the configured level)
//! - Optional OTLP span export over gRPC (tonic), so the endpoint is the
//!   collector's gRPC listener with a scheme, e.g. `http://jaeger:4317`

use opentelemetry::trace::{TraceError, TracerProvider as _};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Sampler, Tracer};
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{Config, LogFormat};

/// Service name reported on exported spans and in startup logs.
pub const SERVICE_NAME: &str = "sum-api";

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("failed to build OTLP span exporter: {0}")]
    Exporter(#[from] TraceError),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Flushes and shuts down span export when dropped.
#[must_use = "dropping the guard shuts down span export"]
pub struct TracingGuard {
    exporting: bool,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if self.exporting {
            global::shutdown_tracer_provider();
        }
    }
}

/// Initialize logging and, when an endpoint is configured, span export.
///
/// This sets up:
/// - `EnvFilter` from `RUST_LOG`, falling back to `config.log_level`
/// - A JSON or text formatting layer
/// - An OpenTelemetry layer exporting through OTLP, if enabled
pub fn init_tracing(config: &Config) -> Result<TracingGuard, TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.log_format() {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
    };

    let tracer = match (&config.otel_endpoint, config.tracing) {
        (Some(endpoint), true) => Some(build_tracer(endpoint, config.port)?),
        _ => None,
    };
    let exporting = tracer.is_some();
    let otel_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    match &config.otel_endpoint {
        Some(endpoint) if exporting => {
            tracing::info!(service = SERVICE_NAME, endpoint = %endpoint, "Tracing initialized with OTLP export");
        }
        _ => tracing::info!(service = SERVICE_NAME, "Tracing initialized without span export"),
    }

    Ok(TracingGuard { exporting })
}

/// Build an OTLP batch-exporting tracer and install its provider globally.
fn build_tracer(endpoint: &str, port: u16) -> Result<Tracer, TraceError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("server.port", i64::from(port)),
    ]);

    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)?;

    global::set_tracer_provider(provider.clone());
    Ok(provider.tracer(SERVICE_NAME))
}
