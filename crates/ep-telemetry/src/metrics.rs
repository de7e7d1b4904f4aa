//! Prometheus metrics for the execution provider.
//!
//! All metrics follow the naming convention: `ep_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., blocks_ingested_total)
//! - **Gauge**: Value that can go up or down (e.g., tip_height)
//! - **Histogram**: Distribution of values (e.g., sandbox_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // INGESTOR METRICS
    // =========================================================================

    /// Blocks persisted by the fetch loop
    pub static ref BLOCKS_INGESTED: Counter = Counter::new(
        "ep_ingestor_blocks_ingested_total",
        "Total number of blocks persisted by the fetch loop"
    ).expect("metric creation failed");

    /// Reorgs detected (tip deleted and refetched)
    pub static ref REORGS_DETECTED: Counter = Counter::new(
        "ep_ingestor_reorgs_total",
        "Total number of parent-hash mismatches handled"
    ).expect("metric creation failed");

    /// Events that crossed the confirmation threshold
    pub static ref EVENTS_CONFIRMED: Counter = Counter::new(
        "ep_ingestor_events_confirmed_total",
        "Total number of events moved from Pending to Confirmed"
    ).expect("metric creation failed");

    /// Chain events dropped because they failed to decode
    pub static ref EVENTS_SKIPPED: Counter = Counter::new(
        "ep_ingestor_events_skipped_total",
        "Total number of chain events that could not be decoded"
    ).expect("metric creation failed");

    /// Execution tasks created by promotion
    pub static ref TASKS_PROMOTED: Counter = Counter::new(
        "ep_ingestor_tasks_promoted_total",
        "Total number of confirmed events promoted to execution tasks"
    ).expect("metric creation failed");

    /// Blocks removed by the pruning loop
    pub static ref BLOCKS_PRUNED: Counter = Counter::new(
        "ep_ingestor_blocks_pruned_total",
        "Total number of block records removed by pruning"
    ).expect("metric creation failed");

    /// Latest persisted height
    pub static ref TIP_HEIGHT: Gauge = Gauge::new(
        "ep_ingestor_tip_height",
        "Height of the highest persisted block"
    ).expect("metric creation failed");

    /// Liveness alerts emitted by the watchdog
    pub static ref ALERTS_SENT: Counter = Counter::new(
        "ep_ingestor_alerts_total",
        "Total number of stale-tip alerts emitted"
    ).expect("metric creation failed");

    // =========================================================================
    // RUNNER METRICS
    // =========================================================================

    /// Tasks executed, by outcome (success, failure)
    pub static ref TASKS_EXECUTED: CounterVec = CounterVec::new(
        Opts::new("ep_runner_tasks_executed_total", "Total number of tasks executed"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Wall-clock time spent inside the sandbox
    pub static ref SANDBOX_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ep_runner_sandbox_duration_seconds",
            "Time spent waiting for the sandbox launcher"
        ).buckets(exponential_buckets(0.05, 2.0, 14).expect("bucket layout is valid"))
    ).expect("metric creation failed");

    // =========================================================================
    // REPORTER METRICS
    // =========================================================================

    /// Results accepted by the chain writer
    pub static ref RESULTS_REPORTED: Counter = Counter::new(
        "ep_reporter_results_reported_total",
        "Total number of results submitted on-chain"
    ).expect("metric creation failed");

    // =========================================================================
    // SHARED
    // =========================================================================

    /// Aborted loop iterations by component
    pub static ref LOOP_ERRORS: CounterVec = CounterVec::new(
        Opts::new("ep_loop_errors_total", "Total number of aborted loop iterations"),
        &["component"]
    ).expect("metric creation failed");
}

/// Handle returned once the metrics are registered.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    _registered: (),
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Ingestor
        Box::new(BLOCKS_INGESTED.clone()),
        Box::new(REORGS_DETECTED.clone()),
        Box::new(EVENTS_CONFIRMED.clone()),
        Box::new(EVENTS_SKIPPED.clone()),
        Box::new(TASKS_PROMOTED.clone()),
        Box::new(BLOCKS_PRUNED.clone()),
        Box::new(TIP_HEIGHT.clone()),
        Box::new(ALERTS_SENT.clone()),
        // Runner
        Box::new(TASKS_EXECUTED.clone()),
        Box::new(SANDBOX_DURATION.clone()),
        // Reporter
        Box::new(RESULTS_REPORTED.clone()),
        // Errors
        Box::new(LOOP_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _registered: () })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record one aborted loop iteration.
pub fn record_loop_error(component: &str) {
    LOOP_ERRORS.with_label_values(&[component]).inc();
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
