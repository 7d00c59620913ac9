//! Observability infrastructure.
//!
//! Provides:
//! - Structured logging with optional OpenTelemetry span export
//! - Per-request spans that close on every exit path
//! - Prometheus request counters and latency histograms

pub mod metrics;
pub mod span;
pub mod tracing;
