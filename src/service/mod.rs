//! HTTP handlers and shared state.
//!
//! Routes:
//! - `/sum` - overflow-checked addition (any method; non-GET answers 405)
//! - `/health` - liveness
//! - `/metrics` - Prometheus scrape endpoint, when metrics are enabled

pub mod health;
pub mod latency;
pub mod sum;
pub mod validate;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::observability::metrics::HttpMetrics;
use latency::LatencySimulator;

/// JSON body of a `/sum` response.
///
/// Exactly one of `result` and `error` is present; the other is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SumResponse {
    pub fn success(result: i64) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Capabilities shared by all handlers.
///
/// Each observability concern is optional, so one handler covers every
/// combination of metrics, tracing and simulated latency.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub metrics: Option<HttpMetrics>,
    pub tracing: bool,
    pub latency: Option<LatencySimulator>,
}

impl AppState {
    /// Plain handler state with every capability turned off.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, metrics: HttpMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn with_simulated_latency(mut self, max: Duration) -> Self {
        self.latency = Some(LatencySimulator::new(max));
        self
    }

    /// Build state from configuration, creating the metrics registry if enabled.
    pub fn from_config(config: &Config) -> Result<Self, prometheus::Error> {
        let mut state = Self::new().with_tracing(config.tracing);
        if config.metrics {
            state = state.with_metrics(HttpMetrics::with_buckets(config.buckets())?);
        }
        if let Some(max) = config.simulated_latency() {
            state = state.with_simulated_latency(max);
        }
        Ok(state)
    }
}

/// Create the application router.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(sum::SUM_ROUTE, any(sum::handle_sum))
        .route("/health", get(health::handle_health));

    if let Some(metrics) = state.metrics.clone() {
        router = router.route("/metrics", get(move || metrics_handler(metrics.clone())));
    }

    router.with_state(state).layer(TraceLayer::new_for_http())
}

/// Handle GET /metrics - Prometheus metrics endpoint.
async fn metrics_handler(metrics: HttpMetrics) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain; charset=utf-8")],
                format!("Failed to encode metrics: {e}"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_error() {
        let body = serde_json::to_string(&SumResponse::success(0)).unwrap();
        assert_eq!(body, r#"{"result":0}"#);
    }

    #[test]
    fn test_failure_omits_result() {
        let body = serde_json::to_string(&SumResponse::failure("Invalid parameter 'a'")).unwrap();
        assert_eq!(body, r#"{"error":"Invalid parameter 'a'"}"#);
    }

    #[test]
    fn test_state_from_config() {
        let mut config = Config::test_config();
        config.metrics = false;
        config.simulated_latency_ms = 10;

        let state = AppState::from_config(&config).unwrap();
        assert!(state.metrics.is_none());
        assert!(state.tracing);
        assert!(state.latency.is_some());
    }

    #[tokio::test]
    async fn test_metrics_handler_renders_registry() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.record_request("GET", sum::SUM_ROUTE, 200, Duration::from_millis(2));

        let response = metrics_handler(metrics).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(r#"http_requests_total{endpoint="/sum",method="GET",status="200"} 1"#));
    }
}
