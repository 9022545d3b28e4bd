use crate::error::Result;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

/// Scan counters registered on an explicit registry so tests and the web
/// endpoint can each own one.
#[derive(Clone)]
pub struct ScanMetrics {
    registry: Registry,
    pub cycles: IntCounter,
    pub cycles_abandoned: IntCounter,
    pub records_fetched: IntCounter,
    pub parse_errors: IntCounter,
    pub candidates_passed: IntCounter,
    pub candidates_skipped: IntCounter,
    pub candidates_duplicate: IntCounter,
    pub alerts_dispatched: IntCounter,
    pub dispatch_failures: IntCounter,
    pub dedup_size: IntGauge,
    pub fetch_latency: Histogram,
}

impl ScanMetrics {
    pub fn new(registry: Registry) -> Result<Self> {
        let metrics = Self {
            cycles: IntCounter::new("scan_cycles_total", "Scan cycles started")?,
            cycles_abandoned: IntCounter::new(
                "scan_cycles_abandoned_total",
                "Scan cycles abandoned after a fetch failure",
            )?,
            records_fetched: IntCounter::new("scan_records_fetched_total", "Raw records fetched")?,
            parse_errors: IntCounter::new("scan_parse_errors_total", "Records skipped as malformed")?,
            candidates_passed: IntCounter::new(
                "scan_candidates_passed_total",
                "Candidates that passed every enabled rule",
            )?,
            candidates_skipped: IntCounter::new(
                "scan_candidates_skipped_total",
                "Candidates rejected by at least one rule",
            )?,
            candidates_duplicate: IntCounter::new(
                "scan_candidates_duplicate_total",
                "Passing candidates already alerted earlier",
            )?,
            alerts_dispatched: IntCounter::new("alerts_dispatched_total", "Alerts dispatched")?,
            dispatch_failures: IntCounter::new(
                "alert_dispatch_failures_total",
                "Dispatches where the notifier or audit sink failed",
            )?,
            dedup_size: IntGauge::new("dedup_store_size", "Pair identifiers already alerted")?,
            fetch_latency: Histogram::with_opts(
                HistogramOpts::new("fetch_latency_seconds", "Fetch latency in seconds, retries included")
                    .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 15.0, 60.0, 300.0]),
            )?,
            registry,
        };

        metrics.registry.register(Box::new(metrics.cycles.clone()))?;
        metrics.registry.register(Box::new(metrics.cycles_abandoned.clone()))?;
        metrics.registry.register(Box::new(metrics.records_fetched.clone()))?;
        metrics.registry.register(Box::new(metrics.parse_errors.clone()))?;
        metrics.registry.register(Box::new(metrics.candidates_passed.clone()))?;
        metrics.registry.register(Box::new(metrics.candidates_skipped.clone()))?;
        metrics.registry.register(Box::new(metrics.candidates_duplicate.clone()))?;
        metrics.registry.register(Box::new(metrics.alerts_dispatched.clone()))?;
        metrics.registry.register(Box::new(metrics.dispatch_failures.clone()))?;
        metrics.registry.register(Box::new(metrics.dedup_size.clone()))?;
        metrics.registry.register(Box::new(metrics.fetch_latency.clone()))?;

        Ok(metrics)
    }

    /// Prometheus text exposition of everything registered.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| crate::error::Error::InternalError(e.to_string()))
    }
}
