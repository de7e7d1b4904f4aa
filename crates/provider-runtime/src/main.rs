//! # Execution Provider
//!
//! Runs one role of the pipeline until Ctrl-C.
//!
//! ## Startup Sequence
//!
//! 1. Parse the CLI and load the JSON configuration
//! 2. Validate the configuration for the selected role (fatal on error)
//! 3. Initialize logging and metrics
//! 4. Open the task store and start the role's loops
//! 5. Serve `/metrics` when a metrics port is configured
//!
//! Any failure before step 4 completes exits non-zero without starting a loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ep_01_task_store::StoreBackend;
use ep_telemetry::init_telemetry;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use provider_runtime::{metrics_server, roles, Cli, ProviderConfig, Role};

/// The running process: one role plus its shutdown channel.
struct ProviderRuntime {
    role: Role,
    config: ProviderConfig,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ProviderRuntime {
    fn new(role: Role, config: ProviderConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            role,
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    fn start(&self, store: Arc<StoreBackend>) -> Result<Vec<JoinHandle<()>>> {
        roles::start(self.role, &self.config, store, self.shutdown_rx.clone())
    }

    fn start_metrics(&self, port: u16) {
        if port == 0 {
            info!("[runtime] Metrics endpoint disabled");
            return;
        }
        let role = self.role.as_str();
        let shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics_server::serve(port, role, shutdown).await {
                error!("[runtime] Metrics endpoint failed: {}", e);
            }
        });
    }

    async fn shutdown(&self, handles: Vec<JoinHandle<()>>) {
        info!("[runtime] Shutting down {}", self.role);
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("[runtime] Failed to send shutdown signal: {}", e);
        }
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("[runtime] Loop ended abnormally: {}", e);
            }
        }
        info!("[runtime] Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ProviderConfig::load(&cli.config_path)
        .with_context(|| format!("loading {}", cli.config_path.display()))?;
    config
        .validate(cli.role)
        .context("configuration rejected")?;

    let telemetry = config.telemetry_config(cli.role);
    let metrics_port = telemetry.metrics_port;
    let _telemetry = init_telemetry(telemetry).context("initializing telemetry")?;

    info!(
        "[runtime] Starting execution provider v{} as {}",
        env!("CARGO_PKG_VERSION"),
        cli.role
    );

    let runtime = ProviderRuntime::new(cli.role, config);
    let store = roles::open_store(&runtime.config)?;
    let handles = runtime.start(store)?;
    runtime.start_metrics(metrics_port);

    info!("[runtime] Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl+C")?;

    runtime.shutdown(handles).await;
    Ok(())
}
