//! `/sum` request handler.
//!
//! Flow of one request:
//! ```text
//! spawn request task (detached from the connection)
//! open span + observation guard
//!     → optional simulated latency
//!     → validate (method, presence, parse a, parse b)
//!     → add (child span "add")
//!     → status, span status, summary log
//!     → response
//! guards drop → one metrics sample, span closed
//! ```

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::time::{Duration, Instant};
use tracing::instrument::{Instrument, WithSubscriber};

use crate::arith::add;
use crate::error::SumError;
use crate::observability::metrics::HttpMetrics;
use crate::observability::span::{RequestSpan, SpanStatus};
use crate::service::validate::{query_param, validate};
use crate::service::{AppState, SumResponse};

/// Route label used for metrics and routing.
pub const SUM_ROUTE: &str = "/sum";

/// Records exactly one metrics sample when dropped.
///
/// The status starts as 500 so a request that panics before reaching a
/// response is still counted.
#[derive(Debug)]
pub struct RequestObservation {
    metrics: Option<HttpMetrics>,
    method: String,
    route: &'static str,
    status: StatusCode,
    started: Instant,
}

impl RequestObservation {
    pub fn start(metrics: Option<HttpMetrics>, method: &Method, route: &'static str) -> Self {
        Self {
            metrics,
            method: method.to_string(),
            route,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            started: Instant::now(),
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for RequestObservation {
    fn drop(&mut self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_request(&self.method, self.route, self.status.as_u16(), self.elapsed());
        }
    }
}

/// Handle any-method requests to `/sum`.
///
/// The request runs on its own task, so it completes and records its real
/// status even when the client disconnects mid-request.
pub async fn handle_sum(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let task = process_sum(state, method, uri)
        .in_current_span()
        .with_current_subscriber();

    match tokio::spawn(task).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "sum request task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn process_sum(state: AppState, method: Method, uri: Uri) -> Response {
    let span = if state.tracing {
        RequestSpan::start(&method, uri.path())
    } else {
        RequestSpan::disabled()
    };
    let mut observation = RequestObservation::start(state.metrics.clone(), &method, SUM_ROUTE);

    let slept = match &state.latency {
        Some(simulator) => simulator.pause().await,
        None => Duration::ZERO,
    };

    let trace_id = span.trace_id().unwrap_or_default();
    let outcome = span.in_scope(|| {
        tracing::info!(
            method = %method,
            path = %uri.path(),
            sleep = ?slept,
            trace_id = %trace_id,
            "request received"
        );
        compute(&method, uri.query(), &span)
    });

    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(err) => err.status_code(),
    };
    observation.set_status(status);
    span.record_status_code(status);

    span.in_scope(|| match &outcome {
        Ok(result) => {
            span.set_status(&SpanStatus::Ok);
            tracing::info!(
                method = %method,
                path = %uri.path(),
                status = status.as_u16(),
                result,
                "sum calculated"
            );
        }
        Err(err) => {
            span.set_status(&SpanStatus::Error(err.to_string()));
            tracing::warn!(
                method = %method,
                path = %uri.path(),
                status = status.as_u16(),
                kind = err.kind(),
                error = %err,
                "sum request rejected"
            );
        }
    });

    match outcome {
        Ok(result) => (StatusCode::OK, Json(SumResponse::success(result))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Validate the request and add its operands.
fn compute(method: &Method, query: Option<&str>, span: &RequestSpan) -> Result<i64, SumError> {
    let raw_a = query_param(query, "a");
    let raw_b = query_param(query, "b");

    let operands = validate(method, raw_a.as_deref(), raw_b.as_deref()).inspect_err(|err| {
        if let SumError::InvalidParameter { operand, value } = err {
            tracing::debug!(param = %operand, value = %value, "invalid parameter");
        }
    })?;
    span.record_operands(&operands);

    let result = tracing::info_span!("add", a = operands.a(), b = operands.b())
        .in_scope(|| add(operands.a(), operands.b()))?;
    span.record_result(result);

    Ok(result)
}
