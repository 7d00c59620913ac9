//! Test utilities and server harness for sum-api tests.
//!
//! Provides:
//! - In-process router setup with fresh metrics
//! - One-shot request helpers
//! - A span ledger layer that tracks request span attributes, closures and
//!   statuses
//! - A TCP test server with graceful shutdown

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use sum_api::config::Config;
use sum_api::observability::span::REQUEST_SPAN_NAME;
use sum_api::{router, AppState, HttpMetrics};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Router plus a handle on the metrics it records into.
pub struct TestApp {
    pub router: Router,
    pub metrics: HttpMetrics,
}

impl TestApp {
    /// Router with metrics and tracing enabled and no simulated latency.
    pub fn new() -> Self {
        let metrics = HttpMetrics::new().expect("failed to create metrics");
        let state = AppState::new()
            .with_metrics(metrics.clone())
            .with_tracing(true);
        Self {
            router: router(state),
            metrics,
        }
    }

    /// Send one request and return status, content type and body text.
    pub async fn send(&self, method: Method, uri: &str) -> TestResponse {
        send(&self.router, method, uri).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Captured response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

/// Drive one request through a router clone.
pub async fn send(router: &Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");

    TestResponse {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).expect("body is not UTF-8"),
    }
}

/// Closed request span as seen by [`SpanLedger`].
#[derive(Debug, Clone, Default)]
pub struct ClosedSpan {
    pub http_method: Option<String>,
    pub http_path: Option<String>,
    pub http_status: Option<u64>,
    pub a: Option<i64>,
    pub b: Option<i64>,
    pub result: Option<i64>,
    pub status_code: Option<String>,
    pub status_message: Option<String>,
}

#[derive(Default)]
struct LedgerState {
    open: HashMap<span::Id, ClosedSpan>,
    opened: usize,
    closed: Vec<ClosedSpan>,
}

/// Layer that tracks every request span from open to close.
#[derive(Clone, Default)]
pub struct SpanLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl SpanLedger {
    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> Vec<ClosedSpan> {
        self.state.lock().unwrap().closed.clone()
    }

    /// Spans opened but not yet closed.
    pub fn still_open(&self) -> usize {
        self.state.lock().unwrap().open.len()
    }
}

struct FieldCapture<'a>(&'a mut ClosedSpan);

impl Visit for FieldCapture<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "otel.status_code" => self.0.status_code = Some(value.to_string()),
            "otel.status_message" => self.0.status_message = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "sum.a" => self.0.a = Some(value),
            "sum.b" => self.0.b = Some(value),
            "sum.result" => self.0.result = Some(value),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "http.status_code" {
            self.0.http_status = Some(value);
        }
    }

    // `%value` fields arrive here, rendered through their Display impl.
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "http.method" => self.0.http_method = Some(format!("{value:?}")),
            "http.path" => self.0.http_path = Some(format!("{value:?}")),
            _ => {}
        }
    }
}

impl<S> Layer<S> for SpanLedger
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() != REQUEST_SPAN_NAME {
            return;
        }
        let mut entry = ClosedSpan::default();
        attrs.record(&mut FieldCapture(&mut entry));

        let mut state = self.state.lock().unwrap();
        state.opened += 1;
        state.open.insert(id.clone(), entry);
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.open.get_mut(id) {
            values.record(&mut FieldCapture(entry));
        }
    }

    fn on_close(&self, id: span::Id, _ctx: Context<'_, S>) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.open.remove(&id) {
            state.closed.push(entry);
        }
    }
}

/// Running HTTP server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Start a server with the test configuration.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener has no address");
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let config = Config::test_config();
            sum_api::server::serve(listener, &config, shutdown_rx).await
        });

        Self {
            addr,
            shutdown_tx,
            handle,
        }
    }

    /// Signal shutdown and wait for the server task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        self.handle
            .await
            .expect("server task panicked")
            .expect("server returned an error");
    }
}
