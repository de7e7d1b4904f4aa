//! `report.json`, written by the runtime when the workload finishes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared_types::MAX_STORED_INTEGER;

pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    #[serde(rename = "gasUsed", default)]
    pub resource_used: u64,
    #[serde(rename = "resultMsg", default)]
    pub result_message: String,
}

impl ExecutionReport {
    /// Read and parse a report. The error is a human-readable reason.
    pub fn read(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let report: Self =
            serde_json::from_slice(&bytes).map_err(|e| format!("{}: {e}", path.display()))?;
        if report.resource_used > MAX_STORED_INTEGER {
            return Err(format!(
                "{}: gasUsed {} exceeds {MAX_STORED_INTEGER}",
                path.display(),
                report.resource_used
            ));
        }
        Ok(report)
    }
}
