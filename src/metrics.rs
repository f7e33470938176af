//! Metrics collection and export module

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Instant;

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Counters
    pub attempts_total: IntCounter,
    pub attempts_succeeded: IntCounter,
    pub attempts_failed: IntCounterVec,
    pub confirmation_timeouts: IntCounter,

    // Histograms
    pub attempt_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let attempts_total = IntCounter::with_opts(Opts::new(
            "mint_attempts_total",
            "Total number of mint creation attempts",
        ))?;

        let attempts_succeeded = IntCounter::with_opts(Opts::new(
            "mint_attempts_succeeded",
            "Number of confirmed mint creations",
        ))?;

        let attempts_failed = IntCounterVec::new(
            Opts::new("mint_attempts_failed", "Number of failed attempts by kind"),
            &["kind"],
        )?;

        let confirmation_timeouts = IntCounter::with_opts(Opts::new(
            "mint_confirmation_timeouts",
            "Attempts submitted but not confirmed in time",
        ))?;

        let attempt_latency = Histogram::with_opts(
            HistogramOpts::new("mint_attempt_latency_seconds", "End-to-end attempt latency")
                .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        )?;

        registry.register(Box::new(attempts_total.clone()))?;
        registry.register(Box::new(attempts_succeeded.clone()))?;
        registry.register(Box::new(attempts_failed.clone()))?;
        registry.register(Box::new(confirmation_timeouts.clone()))?;
        registry.register(Box::new(attempt_latency.clone()))?;

        Ok(Self {
            registry,
            attempts_total,
            attempts_succeeded,
            attempts_failed,
            confirmation_timeouts,
            attempt_latency,
        })
    }

    /// Prometheus text exposition of every registered metric
    pub fn export(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn observe_duration(&self, histogram: &Histogram) {
        histogram.observe(self.start.elapsed().as_secs_f64());
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
