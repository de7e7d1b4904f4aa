//! Subprocess launcher.
//!
//! Invokes the workload runtime (a WebAssembly runtime, a container shim or
//! anything honoring the same contract) as
//!
//! ```text
//! <runtime_binary> [runtime_args..] --max-gas=<limit> <entry> <inputs..> <outputs..>
//! ```
//!
//! in the workload root. The runtime writes `report.json` next to the
//! workload; stdout and stderr become the combined log.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use shared_types::Receipt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::{ExecutionReport, REPORT_FILE};
use crate::error::{SandboxError, SandboxResult};
use crate::ports::{LaunchOutcome, LaunchRequest, SandboxLauncher};

pub const ENV_MAX_RESOURCE: &str = "EP_MAX_RESOURCE";
pub const ENV_ENTRY: &str = "EP_ENTRY";
pub const ENV_INPUT_FILES: &str = "EP_INPUT_FILES";
pub const ENV_OUTPUT_FILES: &str = "EP_OUTPUT_FILES";
pub const ENV_REPORT_FILE: &str = "EP_REPORT_FILE";

/// Launches the configured runtime as a child process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    runtime_binary: PathBuf,
    runtime_args: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(runtime_binary: impl Into<PathBuf>, runtime_args: Vec<String>) -> Self {
        Self {
            runtime_binary: runtime_binary.into(),
            runtime_args,
        }
    }

    fn command(&self, request: &LaunchRequest, report_path: &Path) -> SandboxResult<Command> {
        let mut cmd = Command::new(&self.runtime_binary);
        cmd.args(&self.runtime_args)
            .arg(format!("--max-gas={}", request.resource_limit))
            .arg(&request.entry)
            .args(&request.inputs)
            .args(&request.outputs)
            .current_dir(&request.work_dir)
            .env(ENV_MAX_RESOURCE, request.resource_limit.to_string())
            .env(ENV_ENTRY, &request.entry)
            .env(ENV_INPUT_FILES, path_list(&request.inputs)?)
            .env(ENV_OUTPUT_FILES, path_list(&request.outputs)?)
            .env(ENV_REPORT_FILE, report_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl SandboxLauncher for ProcessLauncher {
    async fn run(&self, request: &LaunchRequest) -> SandboxResult<LaunchOutcome> {
        let report_path = request.work_dir.join(REPORT_FILE);
        if report_path.exists() {
            std::fs::remove_file(&report_path)?;
        }

        let child = self.command(request, &report_path)?.spawn().map_err(|e| {
            SandboxError::Launch(format!("{}: {e}", self.runtime_binary.display()))
        })?;
        debug!(
            "[ep-04] Spawned {} for {}",
            self.runtime_binary.display(),
            request.entry.display()
        );

        let output = child.wait_with_output().await?;
        let mut combined_log = output.stdout;
        combined_log.extend_from_slice(&output.stderr);

        let report = ExecutionReport::read(&report_path);
        let outcome = if !output.status.success() {
            warn!("[ep-04] Workload exited abnormally: {}", output.status);
            LaunchOutcome {
                resource_used: report.map(|r| r.resource_used).unwrap_or_default(),
                status_code: Receipt::STATUS_FAILED,
                result_message: format!("workload exited abnormally: {}", output.status),
                combined_log,
            }
        } else {
            match report {
                Ok(report) => LaunchOutcome {
                    resource_used: report.resource_used,
                    status_code: Receipt::STATUS_SUCCESS,
                    result_message: report.result_message,
                    combined_log,
                },
                Err(reason) => {
                    warn!("[ep-04] Unreadable execution report: {}", reason);
                    LaunchOutcome {
                        resource_used: 0,
                        status_code: Receipt::STATUS_FAILED,
                        result_message: format!("invalid execution report: {reason}"),
                        combined_log,
                    }
                }
            }
        };

        info!(
            status_code = outcome.status_code,
            resource_used = outcome.resource_used,
            "[ep-04] Workload finished"
        );
        Ok(outcome)
    }
}

fn path_list(paths: &[PathBuf]) -> SandboxResult<String> {
    let list: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    serde_json::to_string(&list).map_err(|e| SandboxError::Launch(e.to_string()))
}
