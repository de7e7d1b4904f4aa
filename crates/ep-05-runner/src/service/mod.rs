//! Task Runner Service.
//!
//! One tick executes at most one task:
//!
//! ```text
//! next Created task > watermark ─→ advance watermark, record attempt
//!   ─→ resolve + download executable and inputs
//!   ─→ stage workload, launch sandbox
//!   ─→ upload outputs and log to the executable's bucket
//!   ─→ Created → Executed with the receipt (conditional)
//! ```
//!
//! Any error before the final update leaves the task Created. The watermark
//! is already past it, so this process will not pick it up again; a restart
//! resets the watermark and retries it. `attempts` on the task row records
//! every try.


use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ep_04_sandbox::{stage_workload, LaunchOutcome, StagedObject};
use ep_telemetry::{record_loop_error, time_histogram, SANDBOX_DURATION, TASKS_EXECUTED};
use shared_types::{ExecutionTask, Receipt, TaskId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RunnerConfig;
use crate::domain::{output_file_name, upload_name, TickOutcome, LOG_FILE_NAME};
use crate::error::{RunnerError, RunnerResult};
use crate::ports::outbound::{ObjectStorage, SandboxLauncher, TaskStore};

/// Executes Created tasks one at a time in task id order.
pub struct TaskRunner<S, O, L>
where
    S: TaskStore,
    O: ObjectStorage,
    L: SandboxLauncher,
{
    config: RunnerConfig,
    store: Arc<S>,
    storage: Arc<O>,
    launcher: Arc<L>,
    /// Last task id this process started on. Starts at 0 on every launch.
    watermark: AtomicU64,
}

impl<S, O, L> TaskRunner<S, O, L>
where
    S: TaskStore + 'static,
    O: ObjectStorage + 'static,
    L: SandboxLauncher + 'static,
{
    pub fn new(
        config: RunnerConfig,
        store: Arc<S>,
        storage: Arc<O>,
        launcher: Arc<L>,
    ) -> RunnerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            storage,
            launcher,
            watermark: AtomicU64::new(0),
        })
    }

    pub fn watermark(&self) -> TaskId {
        self.watermark.load(Ordering::SeqCst)
    }

    /// Execute the next Created task above the watermark, if any.
    pub async fn tick(&self) -> RunnerResult<TickOutcome> {
        let Some(task) = self.store.next_created_task(self.watermark())? else {
            return Ok(TickOutcome::Idle);
        };
        let task_id = task.task_id;

        self.watermark.store(task_id, Ordering::SeqCst);
        if !self.store.record_attempt(task_id)? {
            return Ok(TickOutcome::AlreadyAdvanced { task_id });
        }
        info!(
            task_id,
            executable = %task.payload.executable_ref,
            inputs = task.payload.input_refs.len(),
            "[ep-05] Executing task"
        );

        let staging = self.config.staging_dir.join(format!("task-{task_id}"));
        if staging.exists() {
            tokio::fs::remove_dir_all(&staging).await?;
        }

        let result = self.execute(&task, &staging).await;
        if self.config.cleanup_staging {
            if let Err(err) = tokio::fs::remove_dir_all(&staging).await {
                debug!("[ep-05] Staging cleanup for task {} skipped: {}", task_id, err);
            }
        }
        let receipt = result?;

        if !self.store.record_receipt(task_id, &receipt)? {
            warn!("[ep-05] Task {} advanced by another runner, receipt dropped", task_id);
            return Ok(TickOutcome::AlreadyAdvanced { task_id });
        }

        let outcome = if receipt.is_success() { "success" } else { "failure" };
        TASKS_EXECUTED.with_label_values(&[outcome]).inc();
        ep_telemetry::log_event!(
            info,
            "runner",
            "Task executed",
            task_id = task_id,
            status_code = receipt.status_code,
            resource_used = receipt.resource_used,
            result_ref = %receipt.result_ref
        );
        Ok(TickOutcome::Executed {
            task_id,
            status_code: receipt.status_code,
        })
    }

    async fn execute(&self, task: &ExecutionTask, staging: &Path) -> RunnerResult<Receipt> {
        let payload = &task.payload;

        let executable_location = self.storage.resolve(&payload.executable_ref).await?;
        let executable = StagedObject::new(
            executable_location.name.clone(),
            self.storage.download(&executable_location).await?,
        );

        let mut inputs = Vec::with_capacity(payload.input_refs.len());
        for object_id in &payload.input_refs {
            let location = self.storage.resolve(object_id).await?;
            let bytes = self.storage.download(&location).await?;
            inputs.push(StagedObject::new(location.name, bytes));
        }

        // Unpacking and writing the workload is blocking filesystem work.
        let staging_dir = staging.to_path_buf();
        let workload = tokio::task::spawn_blocking(move || {
            stage_workload(&staging_dir, &executable, &inputs)
        })
        .await??;
        let request = workload.launch_request(payload.resource_limit);
        let outcome = {
            let _timer = time_histogram!(SANDBOX_DURATION);
            self.launcher.run(&request).await?
        };

        let bucket = executable_location.bucket;
        let result_ref = self
            .upload_outputs(task.task_id, &bucket, &workload.outputs)
            .await?;
        let log_ref = self
            .storage
            .upload(
                &bucket,
                &upload_name(task.task_id, LOG_FILE_NAME),
                outcome.combined_log.clone(),
            )
            .await?;

        Ok(receipt_from(outcome, result_ref, log_ref))
    }

    /// Upload every output that exists. Returns the id of the first one, or
    /// an empty string when the workload produced none.
    async fn upload_outputs(
        &self,
        task_id: TaskId,
        bucket: &str,
        outputs: &[PathBuf],
    ) -> RunnerResult<String> {
        let mut result_ref = String::new();
        for path in outputs {
            if !path.is_file() {
                warn!(
                    "[ep-05] Task {} did not produce {}",
                    task_id,
                    path.display()
                );
                continue;
            }
            let bytes = tokio::fs::read(path).await?;
            let name = upload_name(task_id, &output_file_name(path));
            let object_id = self.storage.upload(bucket, &name, bytes).await?;
            debug!("[ep-05] Uploaded {} as {}", name, object_id);
            if result_ref.is_empty() {
                result_ref = object_id;
            }
        }
        Ok(result_ref)
    }

    // =========================================================================
    // Loop
    // =========================================================================

    /// Spawn the polling loop. It exits once `shutdown` flips to `true`.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "[ep-05] Starting runner (staging={})",
                self.config.staging_dir.display()
            );
            loop {
                let delay = match self.tick().await {
                    Ok(TickOutcome::Idle) => self.config.poll_interval,
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
            info!("[ep-05] Runner stopped");
        })
    }
}

fn receipt_from(outcome: LaunchOutcome, result_ref: String, log_ref: String) -> Receipt {
    Receipt {
        resource_used: outcome.resource_used,
        status_code: outcome.status_code,
        result_message: outcome.result_message,
        result_ref,
        log_ref,
    }
}

fn report_error(err: &RunnerError) {
    record_loop_error("runner");
    if err.is_transient() {
        warn!("[ep-05] Tick aborted: {}", err);
    } else {
        error!("[ep-05] Tick aborted: {}", err);
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
