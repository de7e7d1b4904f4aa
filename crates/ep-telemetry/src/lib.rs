//! # Execution Provider Telemetry
//!
//! Logging and metrics shared by the ingestor, runner and reporter.
//!
//! ## Components
//!
//! - **Logs**: `tracing` + `tracing-subscriber`, JSON in containers, pretty in
//!   development, filtered through `EnvFilter`.
//! - **Metrics**: Prometheus counters and gauges in a global registry,
//!   exposed as text by the runtime's `/metrics` endpoint.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ep_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_role("ingestor");
//! let _guard = init_telemetry(config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EP_LOG_LEVEL` | `info` | Log level filter |
//! | `EP_JSON_LOGS` | `false` | JSON formatted logs |
//! | `EP_METRICS_PORT` | `9464` | `/metrics` port, `0` disables |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, record_loop_error, register_metrics, MetricsHandle, ALERTS_SENT,
    BLOCKS_INGESTED, BLOCKS_PRUNED, EVENTS_CONFIRMED, EVENTS_SKIPPED, LOOP_ERRORS,
    REORGS_DETECTED, RESULTS_REPORTED, SANDBOX_DURATION, TASKS_EXECUTED, TASKS_PROMOTED,
    TIP_HEIGHT,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    logging::init_logging(&config)?;

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
