//! Reporter configuration.

use std::time::Duration;

use crate::error::{ReporterError, ReporterResult};

#[derive(Clone, Debug)]
pub struct ReporterConfig {
    /// Sleep when no Executed task is waiting or after a failed submission
    pub poll_interval: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl ReporterConfig {
    pub fn validate(&self) -> ReporterResult<()> {
        if self.poll_interval.is_zero() {
            return Err(ReporterError::InvalidConfig(
                "poll_interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
