//! Result Reporter Service.
//!
//! Each tick submits the oldest Executed task and records the transaction
//! hash with an Executed → Reported update. A failed submission leaves the
//! task Executed for the next tick.


use std::sync::Arc;
use std::time::Duration;

use ep_telemetry::{record_loop_error, RESULTS_REPORTED};
use shared_types::TaskId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::ReporterConfig;
use crate::error::{ReporterError, ReporterResult};
use crate::ports::outbound::{ChainWriter, TaskStore};

/// Result of one reporter tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Idle,
    Reported { task_id: TaskId, tx_hash: String },
    /// Submitted, but the row had already left Executed. Stored hash kept.
    AlreadyReported { task_id: TaskId },
}

pub struct ResultReporter<S, W>
where
    S: TaskStore,
    W: ChainWriter,
{
    config: ReporterConfig,
    store: Arc<S>,
    writer: Arc<W>,
}

impl<S, W> ResultReporter<S, W>
where
    S: TaskStore + 'static,
    W: ChainWriter + 'static,
{
    pub fn new(config: ReporterConfig, store: Arc<S>, writer: Arc<W>) -> ReporterResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            writer,
        })
    }

    pub async fn tick(&self) -> ReporterResult<ReportOutcome> {
        let Some(task) = self.store.next_executed_task()? else {
            return Ok(ReportOutcome::Idle);
        };
        let task_id = task.task_id;
        let receipt = task.receipt.ok_or(ReporterError::MissingReceipt(task_id))?;

        let tx_hash = self
            .writer
            .submit_result(task_id, receipt.status_code, &receipt.result_ref)
            .await?;

        if !self.store.record_submission(task_id, &tx_hash)? {
            warn!(
                "[ep-06] Task {} already reported, keeping stored hash (new {})",
                task_id, tx_hash
            );
            return Ok(ReportOutcome::AlreadyReported { task_id });
        }

        RESULTS_REPORTED.inc();
        ep_telemetry::log_event!(
            info,
            "reporter",
            "Execution result submitted",
            task_id = task_id,
            status_code = receipt.status_code,
            tx_hash = %tx_hash
        );
        Ok(ReportOutcome::Reported { task_id, tx_hash })
    }

    /// Spawn the polling loop. It exits once `shutdown` flips to `true`.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("[ep-06] Starting reporter");
            loop {
                let delay = match self.tick().await {
                    Ok(ReportOutcome::Idle) => self.config.poll_interval,
                    Ok(_) => Duration::ZERO,
                    Err(err) => {
                        report_error(&err);
                        self.config.poll_interval
                    }
                };
                if !pause(&mut shutdown, delay).await {
                    break;
                }
            }
            info!("[ep-06] Reporter stopped");
        })
    }
}

fn report_error(err: &ReporterError) {
    record_loop_error("reporter");
    if err.is_transient() {
        warn!("[ep-06] Submission aborted: {}", err);
    } else {
        error!("[ep-06] Submission aborted: {}", err);
    }
}

async fn pause(shutdown: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    if delay.is_zero() {
        tokio::task::yield_now().await;
        return !*shutdown.borrow();
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => !*shutdown.borrow(),
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}
