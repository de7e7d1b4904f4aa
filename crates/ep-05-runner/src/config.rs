//! Runner configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RunnerError, RunnerResult};

#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Parent of the per-task staging directories
    pub staging_dir: PathBuf,
    /// Sleep when no Created task is waiting
    pub poll_interval: Duration,
    /// Remove the staging directory once the tick ends
    pub cleanup_staging: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("./staging"),
            poll_interval: Duration::from_secs(1),
            cleanup_staging: true,
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> RunnerResult<()> {
        if self.staging_dir.as_os_str().is_empty() {
            return Err(RunnerError::InvalidConfig("staging_dir is empty".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(RunnerError::InvalidConfig(
                "poll_interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
