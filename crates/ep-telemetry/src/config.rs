//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Role of this process (ingestor, runner, reporter)
    pub role: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Prometheus metrics port, 0 disables the endpoint
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "execution-provider".to_string(),
            role: "node".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_port: 9464,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EP_SERVICE_NAME`: Service name (default: execution-provider)
    /// - `EP_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `EP_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `EP_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `EP_METRICS_PORT`: Prometheus metrics port (default: 9464)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("EP_SERVICE_NAME")
                .unwrap_or_else(|_| "execution-provider".to_string()),

            role: "node".to_string(),

            log_level: env::var("EP_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("EP_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("EP_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            metrics_port: env::var("EP_METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9464),
        }
    }

    /// Create configuration for one process role.
    pub fn for_role(role: &str) -> Self {
        let mut config = Self::from_env();
        config.role = role.to_string();
        config
    }

    /// Service name including the role.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.role)
    }
}
