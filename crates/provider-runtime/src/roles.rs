//! Role wiring: build the adapters a role needs and start its loops.

use std::sync::Arc;

use anyhow::{Context, Result};
use ep_01_task_store::{StoreBackend, SystemTimeSource};
use ep_02_chain_reader::CometRpcReader;
use ep_03_ingestor::IngestorService;
use ep_04_sandbox::ProcessLauncher;
use ep_05_runner::{FsObjectStorage, TaskRunner};
use ep_06_reporter::{HttpRelayWriter, ResultReporter};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::adapters::RuntimeAlerter;
use crate::cli::Role;
use crate::container::ProviderConfig;

/// Open the shared task store for the configured dialect.
pub fn open_store(config: &ProviderConfig) -> Result<Arc<StoreBackend>> {
    let store = ep_01_task_store::open_store(&config.database.dialect, &config.database.path)
        .with_context(|| format!("opening {} task store", config.database.dialect))?;
    info!("[runtime] Task store dialect {}", store.dialect());
    Ok(Arc::new(store))
}

/// Start every loop of `role`. The handles finish once shutdown flips.
pub fn start(
    role: Role,
    config: &ProviderConfig,
    store: Arc<StoreBackend>,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<JoinHandle<()>>> {
    let handles = match role {
        Role::Ingestor => start_ingestor(config, store, shutdown)?,
        Role::Runner => vec![start_runner(config, store, shutdown)?],
        Role::Reporter => vec![start_reporter(config, store, shutdown)?],
    };
    info!("[runtime] Role {} started with {} loops", role, handles.len());
    Ok(handles)
}

fn start_ingestor(
    config: &ProviderConfig,
    store: Arc<StoreBackend>,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<JoinHandle<()>>> {
    let chain = CometRpcReader::new(&config.chain.rpc_addr, config.chain_timeout())
        .context("building chain RPC client")?;
    let alerter = RuntimeAlerter::from_config(config.alert.webhook_url.as_deref(), config.chain_timeout())
        .context("building alert webhook client")?;

    let service = IngestorService::new(
        config.ingestor_config(),
        store,
        Arc::new(chain),
        Arc::new(alerter),
        Arc::new(SystemTimeSource),
    )
    .context("creating ingestor")?;
    Ok(Arc::new(service).spawn(shutdown))
}

fn start_runner(
    config: &ProviderConfig,
    store: Arc<StoreBackend>,
    shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>> {
    let storage = FsObjectStorage::new(&config.runner.object_store_root);
    let launcher = ProcessLauncher::new(
        &config.runner.runtime_binary,
        config.runner.runtime_args.clone(),
    );

    let runner = TaskRunner::new(
        config.runner_config(),
        store,
        Arc::new(storage),
        Arc::new(launcher),
    )
    .context("creating runner")?;
    Ok(Arc::new(runner).spawn(shutdown))
}

fn start_reporter(
    config: &ProviderConfig,
    store: Arc<StoreBackend>,
    shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>> {
    let writer = HttpRelayWriter::new(&config.reporter.relay_url, config.relay_timeout())
        .context("building relay client")?;

    let reporter = ResultReporter::new(config.reporter_config(), store, Arc::new(writer))
        .context("creating reporter")?;
    Ok(Arc::new(reporter).spawn(shutdown))
}
