//! Recording chain writer for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::TaskId;

use crate::error::{WriterError, WriterResult};
use crate::ports::outbound::ChainWriter;

/// One accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub task_id: TaskId,
    pub status_code: u32,
    pub result_ref: String,
    pub tx_hash: String,
}

/// Accepts every submission (unless told to fail) and remembers it.
#[derive(Debug, Default)]
pub struct RecordingChainWriter {
    submissions: RwLock<Vec<Submission>>,
    failing: AtomicBool,
}

impl RecordingChainWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.read().clone()
    }

    /// Reject every subsequent submission.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainWriter for RecordingChainWriter {
    async fn submit_result(
        &self,
        task_id: TaskId,
        status_code: u32,
        result_ref: &str,
    ) -> WriterResult<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WriterError::Rejected {
                status: 503,
                message: "chain unavailable".into(),
            });
        }
        let mut submissions = self.submissions.write();
        let tx_hash = format!("{:064X}", submissions.len() + 1);
        submissions.push(Submission {
            task_id,
            status_code,
            result_ref: result_ref.to_string(),
            tx_hash: tx_hash.clone(),
        });
        Ok(tx_hash)
    }
}
