//! Alerter adapters.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::error;

use crate::error::AlertError;
use crate::ports::outbound::Alerter;

/// Writes alerts to the log at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerter;

#[async_trait]
impl Alerter for LogAlerter {
    async fn send_alert(&self, message: &str) -> Result<(), AlertError> {
        error!(alert = true, "[ep-03] {}", message);
        Ok(())
    }
}

/// Keeps every alert in memory.
#[derive(Debug, Default)]
pub struct RecordingAlerter {
    sent: RwLock<Vec<String>>,
    fail: RwLock<bool>,
}

impl RecordingAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.read().clone()
    }

    /// Reject every subsequent alert.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.write() = fail;
    }
}

#[async_trait]
impl Alerter for RecordingAlerter {
    async fn send_alert(&self, message: &str) -> Result<(), AlertError> {
        if *self.fail.read() {
            return Err(AlertError::Delivery("alert channel down".into()));
        }
        self.sent.write().push(message.to_string());
        Ok(())
    }
}
