//! Artificial request latency for demos and load experiments.

use rand::Rng;
use std::time::Duration;

/// Sleeps for a uniformly random duration in `[0, max]`.
#[derive(Debug, Clone, Copy)]
pub struct LatencySimulator {
    max: Duration,
}

impl LatencySimulator {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    /// Pick the next delay without sleeping.
    pub fn sample(&self) -> Duration {
        let fraction: f64 = rand::thread_rng().gen();
        self.max.mul_f64(fraction)
    }

    /// Sleep for a random delay and return how long it was.
    pub async fn pause(&self) -> Duration {
        let delay = self.sample();
        tokio::time::sleep(delay).await;
        delay
    }
}
