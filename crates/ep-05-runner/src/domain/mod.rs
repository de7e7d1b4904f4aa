//! # Domain Layer
//!
//! Object naming and tick results.

use std::path::Path;

use shared_types::TaskId;

/// Name of the uploaded combined log.
pub const LOG_FILE_NAME: &str = "log.txt";

/// Where a file produced by `task_id` is uploaded inside the bucket.
pub fn upload_name(task_id: TaskId, file_name: &str) -> String {
    format!("task-{task_id}/{file_name}")
}

/// File name used when uploading a declared output.
pub fn output_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Result of one runner tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No Created task above the watermark.
    Idle,
    /// Receipt recorded; the task is now Executed.
    Executed { task_id: TaskId, status_code: u32 },
    /// Another process moved the task past Created first. Nothing written.
    AlreadyAdvanced { task_id: TaskId },
}
