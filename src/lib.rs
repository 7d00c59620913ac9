//! sum-api: an observable HTTP service for overflow-checked integer addition.
//!
//! A single endpoint, `GET /sum?a=<i64>&b=<i64>`, adds two signed 64-bit
//! integers and reports overflow instead of wrapping. Every request is
//! observed exactly once: one Prometheus sample, one tracing span and one
//! summarizing log event, whichever way the request ends.
//!
//! # Architecture
//!
//! - **Pure core**: arithmetic and validation have no I/O and no shared state
//! - **Injected telemetry**: metrics live in an explicitly constructed
//!   registry handed to the router, not in process globals
//! - **Scoped observation**: spans and samples are RAII guards, released on
//!   every exit path
//! - **Observable**: structured `tracing` logs, OTLP span export, Prometheus
//!   scrape endpoint
//!
//! # Modules
//!
//! - [`arith`]: Overflow-checked addition
//! - [`config`]: CLI and environment configuration
//! - [`error`]: Request error taxonomy
//! - [`observability`]: Metrics, spans and subscriber setup
//! - [`server`]: HTTP server lifecycle
//! - [`service`]: Route handlers and shared state

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // service::sum::SumResponse is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod arith;
pub mod config;
pub mod error;
pub mod observability;
pub mod server;
pub mod service;

pub use arith::{add, OverflowError};
pub use error::SumError;
pub use observability::metrics::HttpMetrics;
pub use service::{router, AppState};
