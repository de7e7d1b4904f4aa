//! # Sandbox Launcher Port
//!
//! The launcher owns isolation. The orchestrator hands it host-side paths and
//! a resource budget and waits for the workload to finish.

use std::path::PathBuf;

use async_trait::async_trait;
use shared_types::Receipt;

use crate::error::SandboxResult;

/// Everything the launcher needs to run one workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub resource_limit: u64,
    /// Workload root, used as the working directory.
    pub work_dir: PathBuf,
    pub entry: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

/// What came back from the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub resource_used: u64,
    /// [`Receipt::STATUS_SUCCESS`] or [`Receipt::STATUS_FAILED`].
    pub status_code: u32,
    pub result_message: String,
    /// stdout followed by stderr.
    pub combined_log: Vec<u8>,
}

impl LaunchOutcome {
    pub fn is_success(&self) -> bool {
        self.status_code == Receipt::STATUS_SUCCESS
    }
}

/// Runs a staged workload under isolation.
///
/// Production: `ProcessLauncher`
/// Testing: `ScriptedLauncher`
#[async_trait]
pub trait SandboxLauncher: Send + Sync {
    /// `Err` only when the workload could not be started; a workload that
    /// fails yields `Ok` with a failing status code.
    async fn run(&self, request: &LaunchRequest) -> SandboxResult<LaunchOutcome>;
}
