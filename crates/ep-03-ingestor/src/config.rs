//! Ingestor configuration.

use std::time::Duration;

use shared_types::Height;

use crate::error::{IngestorError, IngestorResult};

/// Confirmations an event needs before it is promoted.
pub const DEFAULT_CONFIRMATION_THRESHOLD: u64 = 15;

/// Ingestor configuration
#[derive(Clone, Debug)]
pub struct IngestorConfig {
    /// Height to start from when the block ledger is empty
    pub start_height: Option<Height>,
    /// Confirmations required for Pending → Confirmed
    pub confirmation_threshold: u64,
    /// Blocks kept behind the tip; must exceed the threshold
    pub retention_window: u64,
    /// Sleep after reaching the head or after a failed fetch
    pub fetch_interval: Duration,
    /// Sleep when no confirmed event is waiting
    pub promote_interval: Duration,
    pub prune_interval: Duration,
    pub watchdog_interval: Duration,
    /// Tip age that triggers a liveness alert
    pub stale_after: Duration,
    /// Name used to prefix alerts
    pub moniker: String,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            start_height: None,
            confirmation_threshold: DEFAULT_CONFIRMATION_THRESHOLD,
            retention_window: 100_000,
            fetch_interval: Duration::from_secs(1),
            promote_interval: Duration::from_secs(1),
            prune_interval: Duration::from_secs(60),
            watchdog_interval: Duration::from_secs(30),
            stale_after: Duration::from_secs(300),
            moniker: "execution-provider".to_string(),
        }
    }
}

impl IngestorConfig {
    pub fn validate(&self) -> IngestorResult<()> {
        if self.confirmation_threshold == 0 {
            return Err(IngestorError::InvalidConfig(
                "confirmation_threshold must be at least 1".into(),
            ));
        }
        if self.retention_window <= self.confirmation_threshold {
            return Err(IngestorError::InvalidConfig(format!(
                "retention_window ({}) must be greater than confirmation_threshold ({})",
                self.retention_window, self.confirmation_threshold
            )));
        }
        if self.start_height == Some(0) {
            return Err(IngestorError::InvalidConfig(
                "start_height must be at least 1".into(),
            ));
        }
        for (name, interval) in [
            ("fetch_interval", self.fetch_interval),
            ("promote_interval", self.promote_interval),
            ("prune_interval", self.prune_interval),
            ("watchdog_interval", self.watchdog_interval),
        ] {
            if interval.is_zero() {
                return Err(IngestorError::InvalidConfig(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}
