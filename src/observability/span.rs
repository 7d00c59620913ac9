//! Per-request tracing span.
//!
//! A [`RequestSpan`] is created when a sum request arrives and closes when it
//! is dropped, so early returns and unwinding close it too. The `otel.*`
//! fields are picked up by the OpenTelemetry layer as span kind and status.

use axum::http::{Method, StatusCode};
use opentelemetry::trace::TraceContextExt;
use tracing::field::Empty;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::service::validate::ParsedOperands;

/// Name of the span opened for every sum request.
pub const REQUEST_SPAN_NAME: &str = "sum_request";

/// Final outcome attached to a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanStatus {
    Ok,
    Error(String),
}

/// Tracing span owned by a single request.
#[derive(Debug)]
pub struct RequestSpan {
    span: Span,
}

impl RequestSpan {
    /// Open the request span. Operand, result and status fields are filled
    /// in as they become known.
    pub fn start(method: &Method, path: &str) -> Self {
        let span = tracing::info_span!(
            "sum_request",
            otel.kind = "server",
            http.method = %method,
            http.path = %path,
            http.status_code = Empty,
            sum.a = Empty,
            sum.b = Empty,
            sum.result = Empty,
            otel.status_code = Empty,
            otel.status_message = Empty,
        );
        Self { span }
    }

    /// A handle that records nothing, for when tracing is turned off.
    pub fn disabled() -> Self {
        Self { span: Span::none() }
    }

    pub fn record_operands(&self, operands: &ParsedOperands) {
        self.span.record("sum.a", operands.a());
        self.span.record("sum.b", operands.b());
    }

    pub fn record_result(&self, result: i64) {
        self.span.record("sum.result", result);
    }

    pub fn record_status_code(&self, status: StatusCode) {
        self.span.record("http.status_code", status.as_u16());
    }

    pub fn set_status(&self, status: &SpanStatus) {
        let (code, message) = match status {
            SpanStatus::Ok => ("OK", "Success"),
            SpanStatus::Error(message) => ("ERROR", message.as_str()),
        };
        self.span.record("otel.status_code", code);
        self.span.record("otel.status_message", message);
    }

    /// Hex trace ID, when an OpenTelemetry context is attached.
    pub fn trace_id(&self) -> Option<String> {
        let context = self.span.context();
        let otel_span = context.span();
        let span_context = otel_span.span_context();
        span_context
            .is_valid()
            .then(|| span_context.trace_id().to_string())
    }

    /// Run `f` with this span entered.
    pub fn in_scope<F, T>(&self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.span.in_scope(f)
    }

    /// Close the span.
    pub fn end(self) {
        drop(self);
    }
}
