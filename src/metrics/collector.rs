// src/metrics/collector.rs
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Instant;
use anyhow::Result;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        buffer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Success,
    Failure,
}

impl RelayOutcome {
    fn as_label(&self) -> &'static str {
        match self {
            RelayOutcome::Success => "success",
            RelayOutcome::Failure => "failure",
        }
    }
}

pub struct MetricsCollector {
    pub requests_total: IntCounterVec,
    pub upstream_duration_seconds: Histogram,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("relay_requests_total", "Total number of relayed product requests"),
            &["outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let upstream_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "relay_upstream_duration_seconds",
            "Upstream catalog call duration in seconds",
        ))?;
        registry.register(Box::new(upstream_duration_seconds.clone()))?;

        Ok(Self {
            requests_total,
            upstream_duration_seconds,
        })
    }

    /// A collector bound to a throwaway registry, for callers that don't export metrics.
    pub fn detached() -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(&Registry::new())?))
    }

    pub fn record_request(&self, outcome: RelayOutcome, started: Instant) {
        self.requests_total
            .with_label_values(&[outcome.as_label()])
            .inc();
        self.upstream_duration_seconds
            .observe(started.elapsed().as_secs_f64());
    }

    pub fn requests_with_outcome(&self, outcome: RelayOutcome) -> u64 {
        self.requests_total
            .with_label_values(&[outcome.as_label()])
            .get()
    }
}
