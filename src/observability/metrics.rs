//! Prometheus request metrics.
//!
//! Key metrics:
//! - http_requests_total: Counter by method, endpoint, status
//! - http_request_duration_seconds: Histogram by method, endpoint
//!
//! Collectors live in a registry owned by [`HttpMetrics`], so each instance
//! (and each test) has its own independent counters.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

const REQUESTS_TOTAL: &str = "http_requests_total";
const REQUEST_DURATION: &str = "http_request_duration_seconds";

/// Request counters and latency histograms.
///
/// Cloning is cheap and shares the underlying collectors. All updates are
/// atomic, so concurrent handlers record without extra locking.
#[derive(Clone)]
pub struct HttpMetrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl HttpMetrics {
    /// Create metrics with the default Prometheus latency buckets.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_buckets(prometheus::DEFAULT_BUCKETS.to_vec())
    }

    /// Create metrics with explicit histogram bucket upper bounds (seconds).
    ///
    /// Bounds must be strictly increasing. They are checked here because
    /// the vector only builds its histograms on first use.
    pub fn with_buckets(buckets: Vec<f64>) -> Result<Self, prometheus::Error> {
        Histogram::with_opts(
            HistogramOpts::new("bucket_check", "bucket check").buckets(buckets.clone()),
        )?;

        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(REQUESTS_TOTAL, "Total number of HTTP requests"),
            &["method", "endpoint", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION, "HTTP request duration in seconds")
                .buckets(buckets),
            &["method", "endpoint"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                requests_total,
                request_duration,
            }),
        })
    }

    /// Record one completed request.
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        self.inner
            .requests_total
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.inner
            .request_duration
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    /// Render all collectors in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.inner.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Requests recorded for one (method, route, status) series.
    pub fn request_count(&self, method: &str, route: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.sum_counter(|labels| {
            labels_match(
                labels,
                &[("method", method), ("endpoint", route), ("status", status.as_str())],
            )
        })
    }

    /// Requests recorded across every series.
    pub fn total_requests(&self) -> u64 {
        self.sum_counter(|_| true)
    }

    /// Number of latency observations for one (method, route) series.
    pub fn duration_sample_count(&self, method: &str, route: &str) -> u64 {
        self.inner
            .registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == REQUEST_DURATION)
            .flat_map(|family| family.get_metric())
            .filter(|metric| {
                labels_match(metric.get_label(), &[("method", method), ("endpoint", route)])
            })
            .map(|metric| metric.get_histogram().get_sample_count())
            .sum()
    }

    fn sum_counter<F>(&self, mut select: F) -> u64
    where
        F: FnMut(&[prometheus::proto::LabelPair]) -> bool,
    {
        let total: f64 = self
            .inner
            .registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == REQUESTS_TOTAL)
            .flat_map(|family| family.get_metric())
            .filter(|metric| select(metric.get_label()))
            .map(|metric| metric.get_counter().get_value())
            .sum();
        total as u64
    }
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}

fn labels_match(labels: &[prometheus::proto::LabelPair], expected: &[(&str, &str)]) -> bool {
    expected.iter().all(|(name, value)| {
        labels
            .iter()
            .any(|pair| pair.get_name() == *name && pair.get_value() == *value)
    })
}
