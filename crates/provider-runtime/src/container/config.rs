//! # Provider Configuration
//!
//! One JSON file for all three roles. Every section has defaults so a file
//! only needs the fields its role requires:
//!
//! | Role | Required |
//! |------|----------|
//! | all | `database.path` (a file path for `sqlite3`, a `mysql://` URL for `mysql`) |
//! | ingestor | `chain.rpc_addr` |
//! | runner | `runner.object_store_root`, `runner.runtime_binary` |
//! | reporter | `reporter.relay_url` |

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ep_01_task_store::{MYSQL_DIALECT, SQLITE_DIALECT};
use ep_03_ingestor::{IngestorConfig, DEFAULT_CONFIRMATION_THRESHOLD};
use ep_05_runner::RunnerConfig;
use ep_06_reporter::ReporterConfig;
use ep_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use shared_types::Height;
use thiserror::Error;

use crate::cli::Role;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub database: DatabaseConfig,
    pub chain: ChainConfig,
    pub ingestor: IngestorSection,
    pub alert: AlertConfig,
    pub runner: RunnerSection,
    pub reporter: ReporterSection,
    pub log: LogConfig,
}

/// Task store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite3` or `mysql`.
    pub dialect: String,
    /// Database file, or the server URL when `dialect` is `mysql`.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dialect: SQLITE_DIALECT.to_string(),
            path: String::new(),
        }
    }
}

/// Chain RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_addr: String,
    pub start_height: Option<Height>,
    pub request_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_addr: String::new(),
            start_height: None,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestorSection {
    pub confirmation_threshold: u64,
    pub retention_window: u64,
    pub fetch_interval_ms: u64,
    pub promote_interval_ms: u64,
    pub prune_interval_secs: u64,
    pub watchdog_interval_secs: u64,
}

impl Default for IngestorSection {
    fn default() -> Self {
        Self {
            confirmation_threshold: DEFAULT_CONFIRMATION_THRESHOLD,
            retention_window: 100_000,
            fetch_interval_ms: 1_000,
            promote_interval_ms: 1_000,
            prune_interval_secs: 60,
            watchdog_interval_secs: 30,
        }
    }
}

/// Liveness alerting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub moniker: String,
    /// Slack-compatible webhook; alerts are only logged when absent
    pub webhook_url: Option<String>,
    /// Tip age that triggers an alert
    pub block_update_timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            moniker: "execution-provider".to_string(),
            webhook_url: None,
            block_update_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSection {
    pub staging_dir: PathBuf,
    pub object_store_root: PathBuf,
    pub runtime_binary: PathBuf,
    /// Leading arguments passed before the workload arguments
    pub runtime_args: Vec<String>,
    pub poll_interval_ms: u64,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("./staging"),
            object_store_root: PathBuf::new(),
            runtime_binary: PathBuf::new(),
            runtime_args: Vec::new(),
            poll_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterSection {
    pub relay_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ReporterSection {
    fn default() -> Self {
        Self {
            relay_url: String::new(),
            poll_interval_ms: 1_000,
            request_timeout_secs: 10,
        }
    }
}

/// Overrides for the `EP_*` logging environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl ProviderConfig {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check everything `role` needs. Reports every problem at once.
    pub fn validate(&self, role: Role) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        let path = self.database.path.trim();
        match self.database.dialect.as_str() {
            _ if path.is_empty() => problems.push("database.path is required".to_string()),
            SQLITE_DIALECT => {}
            MYSQL_DIALECT if !path.starts_with("mysql://") => problems.push(format!(
                "database.path must be a mysql:// URL for dialect {MYSQL_DIALECT}"
            )),
            MYSQL_DIALECT => {}
            other => problems.push(format!(
                "database.dialect: unsupported dialect '{other}' (expected {SQLITE_DIALECT} or {MYSQL_DIALECT})"
            )),
        }

        match role {
            Role::Ingestor => {
                if self.chain.rpc_addr.trim().is_empty() {
                    problems.push("chain.rpc_addr is required".to_string());
                }
                if self.chain.request_timeout_secs == 0 {
                    problems.push("chain.request_timeout_secs must be non-zero".to_string());
                }
                if self.alert.block_update_timeout_secs == 0 {
                    problems.push("alert.block_update_timeout_secs must be non-zero".to_string());
                }
                if let Err(err) = self.ingestor_config().validate() {
                    problems.push(err.to_string());
                }
            }
            Role::Runner => {
                if self.runner.object_store_root.as_os_str().is_empty() {
                    problems.push("runner.object_store_root is required".to_string());
                }
                if self.runner.runtime_binary.as_os_str().is_empty() {
                    problems.push("runner.runtime_binary is required".to_string());
                }
                if let Err(err) = self.runner_config().validate() {
                    problems.push(err.to_string());
                }
            }
            Role::Reporter => {
                if self.reporter.relay_url.trim().is_empty() {
                    problems.push("reporter.relay_url is required".to_string());
                }
                if self.reporter.request_timeout_secs == 0 {
                    problems.push("reporter.request_timeout_secs must be non-zero".to_string());
                }
                if let Err(err) = self.reporter_config().validate() {
                    problems.push(err.to_string());
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    // =========================================================================
    // Subsystem views
    // =========================================================================

    pub fn ingestor_config(&self) -> IngestorConfig {
        IngestorConfig {
            start_height: self.chain.start_height,
            confirmation_threshold: self.ingestor.confirmation_threshold,
            retention_window: self.ingestor.retention_window,
            fetch_interval: Duration::from_millis(self.ingestor.fetch_interval_ms),
            promote_interval: Duration::from_millis(self.ingestor.promote_interval_ms),
            prune_interval: Duration::from_secs(self.ingestor.prune_interval_secs),
            watchdog_interval: Duration::from_secs(self.ingestor.watchdog_interval_secs),
            stale_after: Duration::from_secs(self.alert.block_update_timeout_secs),
            moniker: self.alert.moniker.clone(),
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            staging_dir: self.runner.staging_dir.clone(),
            poll_interval: Duration::from_millis(self.runner.poll_interval_ms),
            ..Default::default()
        }
    }

    pub fn reporter_config(&self) -> ReporterConfig {
        ReporterConfig {
            poll_interval: Duration::from_millis(self.reporter.poll_interval_ms),
        }
    }

    pub fn chain_timeout(&self) -> Duration {
        Duration::from_secs(self.chain.request_timeout_secs)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.reporter.request_timeout_secs)
    }

    /// Environment-derived telemetry with the `log` section applied on top.
    pub fn telemetry_config(&self, role: Role) -> TelemetryConfig {
        let mut telemetry = TelemetryConfig::for_role(role.as_str());
        if let Some(level) = &self.log.level {
            telemetry.log_level = level.clone();
        }
        if let Some(json) = self.log.json {
            telemetry.json_logs = json;
        }
        telemetry
    }
}
