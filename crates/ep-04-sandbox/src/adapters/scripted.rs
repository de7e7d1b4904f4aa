//! Scripted launcher for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Receipt;

use crate::error::{SandboxError, SandboxResult};
use crate::ports::{LaunchOutcome, LaunchRequest, SandboxLauncher};

/// One scripted sandbox run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedRun {
    pub resource_used: u64,
    pub status_code: u32,
    pub result_message: String,
    pub log: Vec<u8>,
    /// Written to every declared output when set.
    pub output: Option<Vec<u8>>,
}

impl ScriptedRun {
    /// A normal exit that writes `result_message` to every output.
    pub fn success(resource_used: u64, result_message: &str) -> Self {
        Self {
            resource_used,
            status_code: Receipt::STATUS_SUCCESS,
            result_message: result_message.to_string(),
            log: format!("workload finished: {result_message}\n").into_bytes(),
            output: Some(result_message.as_bytes().to_vec()),
        }
    }

    /// An abnormal exit that writes no outputs.
    pub fn failure(result_message: &str) -> Self {
        Self {
            resource_used: 0,
            status_code: Receipt::STATUS_FAILED,
            result_message: result_message.to_string(),
            log: b"trap\n".to_vec(),
            output: None,
        }
    }
}

/// Replays queued runs, then repeats the fallback run.
pub struct ScriptedLauncher {
    queue: RwLock<VecDeque<Result<ScriptedRun, String>>>,
    fallback: ScriptedRun,
    requests: RwLock<Vec<LaunchRequest>>,
}

impl ScriptedLauncher {
    pub fn new(fallback: ScriptedRun) -> Self {
        Self {
            queue: RwLock::new(VecDeque::new()),
            fallback,
            requests: RwLock::new(Vec::new()),
        }
    }

    pub fn push(&self, run: ScriptedRun) {
        self.queue.write().push_back(Ok(run));
    }

    /// Make the next launch fail before the workload starts.
    pub fn push_launch_failure(&self, reason: &str) {
        self.queue.write().push_back(Err(reason.to_string()));
    }

    /// Every request seen so far, including failed launches.
    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.read().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.requests.read().len()
    }
}

impl Default for ScriptedLauncher {
    fn default() -> Self {
        Self::new(ScriptedRun::success(42, "ok"))
    }
}

#[async_trait]
impl SandboxLauncher for ScriptedLauncher {
    async fn run(&self, request: &LaunchRequest) -> SandboxResult<LaunchOutcome> {
        self.requests.write().push(request.clone());
        let next = self.queue.write().pop_front();
        let run = match next {
            Some(Ok(run)) => run,
            Some(Err(reason)) => return Err(SandboxError::Launch(reason)),
            None => self.fallback.clone(),
        };

        if let Some(contents) = &run.output {
            for path in &request.outputs {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, contents)?;
            }
        }

        Ok(LaunchOutcome {
            resource_used: run.resource_used,
            status_code: run.status_code,
            result_message: run.result_message,
            combined_log: run.log,
        })
    }
}
