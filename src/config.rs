//! Configuration parsing for the sum-api server.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::{ArgAction, Parser, ValueEnum};
use std::time::Duration;

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

/// sum-api: overflow-checked integer addition over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "sum-api")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "SUM_API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "SUM_API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Deployment environment; "local" switches logs to text
    #[arg(long, env = "ENVIRONMENT", default_value = "production")]
    pub environment: String,

    /// Log format, overriding the environment default
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// OTLP gRPC collector URL for span export, e.g. http://jaeger:4317.
    ///
    /// Spans go over OTLP/gRPC, so a scheme is required and the port is the
    /// collector's gRPC listener (4317), not the OTLP/HTTP one (4318). A bare
    /// `host:port` is rejected at startup.
    #[arg(long, env = "JAEGER_ENDPOINT", value_parser = parse_otel_endpoint)]
    pub otel_endpoint: Option<String>,

    /// Open a tracing span per request
    #[arg(long, env = "SUM_API_TRACING", default_value_t = true, action = ArgAction::Set)]
    pub tracing: bool,

    /// Record Prometheus metrics and serve /metrics
    #[arg(long, env = "SUM_API_METRICS", default_value_t = true, action = ArgAction::Set)]
    pub metrics: bool,

    /// Upper bound of the random delay added before each sum request (0 disables)
    #[arg(long, env = "SUM_API_SIMULATED_LATENCY_MS", default_value_t = 0)]
    pub simulated_latency_ms: u64,

    /// Latency histogram bucket bounds in seconds, comma separated
    #[arg(long, env = "SUM_API_DURATION_BUCKETS", value_delimiter = ',')]
    pub duration_buckets: Vec<f64>,
}

/// Accept only endpoints with an explicit `http://` or `https://` scheme.
fn parse_otel_endpoint(value: &str) -> Result<String, String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(format!(
            "expected an OTLP gRPC URL such as http://{value} (port 4317), got `{value}`"
        ))
    }
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective log format: explicit choice, else text for local runs.
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or(if self.environment == "local" {
            LogFormat::Text
        } else {
            LogFormat::Json
        })
    }

    /// Maximum simulated latency, or `None` when disabled.
    pub fn simulated_latency(&self) -> Option<Duration> {
        (self.simulated_latency_ms > 0).then(|| Duration::from_millis(self.simulated_latency_ms))
    }

    /// Histogram buckets, falling back to the Prometheus defaults.
    pub fn buckets(&self) -> Vec<f64> {
        if self.duration_buckets.is_empty() {
            prometheus::DEFAULT_BUCKETS.to_vec()
        } else {
            self.duration_buckets.clone()
        }
    }

    /// Create a default configuration for testing.
    pub fn test_config() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0, // Random port
            log_level: "debug".into(),
            environment: "test".into(),
            log_format: Some(LogFormat::Text),
            otel_endpoint: None,
            tracing: true,
            metrics: true,
            simulated_latency_ms: 0,
            duration_buckets: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            log_level: "info".into(),
            environment: "production".into(),
            log_format: None,
            otel_endpoint: None,
            tracing: true,
            metrics: true,
            simulated_latency_ms: 0,
            duration_buckets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.simulated_latency(), None);
        assert_eq!(config.buckets(), prometheus::DEFAULT_BUCKETS.to_vec());
    }

    #[test]
    fn test_local_environment_uses_text_logs() {
        let config = Config {
            environment: "local".into(),
            ..Config::default()
        };
        assert_eq!(config.log_format(), LogFormat::Text);

        let forced = Config {
            log_format: Some(LogFormat::Json),
            ..config
        };
        assert_eq!(forced.log_format(), LogFormat::Json);
    }

    #[test]
    fn test_parse_cli_flags() {
        let config = Config::try_parse_from([
            "sum-api",
            "--port",
            "9000",
            "--metrics",
            "false",
            "--simulated-latency-ms",
            "2000",
            "--duration-buckets",
            "0.1,0.5,1",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert!(!config.metrics);
        assert!(config.tracing);
        assert_eq!(config.simulated_latency(), Some(Duration::from_secs(2)));
        assert_eq!(config.buckets(), vec![0.1, 0.5, 1.0]);
    }

    #[test]
    fn test_otel_endpoint_requires_scheme() {
        let config =
            Config::try_parse_from(["sum-api", "--otel-endpoint", "http://jaeger:4317"]).unwrap();
        assert_eq!(config.otel_endpoint.as_deref(), Some("http://jaeger:4317"));

        let err = Config::try_parse_from(["sum-api", "--otel-endpoint", "jaeger:4318"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("http://jaeger:4318"), "{err}");
    }
}
