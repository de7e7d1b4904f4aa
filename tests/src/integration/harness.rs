//! A whole pipeline in one process.
//!
//! Each role gets its own store handle on the same SQLite file, the way the
//! three deployed processes share the database. A fourth handle is kept for
//! assertions.

use std::sync::Arc;
use std::time::Duration;

use ep_01_task_store::{ManualTimeSource, PromotionOutcome, SqliteTaskStore, TaskStore, TimeSource};
use ep_02_chain_reader::InMemoryChain;
use ep_03_ingestor::{FetchOutcome, IngestorConfig, IngestorService, RecordingAlerter};
use ep_04_sandbox::ScriptedLauncher;
use ep_05_runner::{InMemoryObjectStorage, RunnerConfig, TaskRunner};
use ep_06_reporter::{RecordingChainWriter, ReporterConfig, ResultReporter};
use tempfile::TempDir;

pub const START: i64 = 1_700_000_000;

pub type Ingestor = IngestorService<SqliteTaskStore, InMemoryChain, RecordingAlerter>;
pub type Runner = TaskRunner<SqliteTaskStore, InMemoryObjectStorage, ScriptedLauncher>;
pub type Reporter = ResultReporter<SqliteTaskStore, RecordingChainWriter>;

pub struct Pipeline {
    pub dir: TempDir,
    pub store: Arc<SqliteTaskStore>,
    pub chain: Arc<InMemoryChain>,
    pub clock: Arc<ManualTimeSource>,
    pub storage: Arc<InMemoryObjectStorage>,
    pub launcher: Arc<ScriptedLauncher>,
    pub writer: Arc<RecordingChainWriter>,
    pub alerter: Arc<RecordingAlerter>,
    pub ingestor: Arc<Ingestor>,
    pub runner: Arc<Runner>,
    pub reporter: Arc<Reporter>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_ingestor_config(IngestorConfig {
            fetch_interval: Duration::from_millis(5),
            promote_interval: Duration::from_millis(5),
            prune_interval: Duration::from_millis(20),
            ..Default::default()
        })
    }

    pub fn with_ingestor_config(config: IngestorConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("tasks.db");
        let clock = Arc::new(ManualTimeSource::new(START));
        let open = || {
            let time: Arc<dyn TimeSource> = clock.clone();
            Arc::new(SqliteTaskStore::open(&db).unwrap().with_time_source(time))
        };

        let chain = Arc::new(InMemoryChain::new());
        let storage = Arc::new(InMemoryObjectStorage::new());
        let launcher = Arc::new(ScriptedLauncher::default());
        let writer = Arc::new(RecordingChainWriter::new());
        let alerter = Arc::new(RecordingAlerter::new());

        let ingestor = IngestorService::new(
            config,
            open(),
            chain.clone(),
            alerter.clone(),
            clock.clone(),
        )
        .unwrap();
        let runner = TaskRunner::new(
            RunnerConfig {
                staging_dir: dir.path().join("staging"),
                poll_interval: Duration::from_millis(5),
                ..Default::default()
            },
            open(),
            storage.clone(),
            launcher.clone(),
        )
        .unwrap();
        let reporter = ResultReporter::new(
            ReporterConfig {
                poll_interval: Duration::from_millis(5),
            },
            open(),
            writer.clone(),
        )
        .unwrap();

        Self {
            store: open(),
            dir,
            chain,
            clock,
            storage,
            launcher,
            writer,
            alerter,
            ingestor: Arc::new(ingestor),
            runner: Arc::new(runner),
            reporter: Arc::new(reporter),
        }
    }

    /// Fetch until the ingestor reaches the chain head.
    pub async fn sync(&self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let outcome = self.ingestor.fetch_step().await.unwrap();
            if matches!(outcome, FetchOutcome::HeadReached { .. }) {
                return outcomes;
            }
            outcomes.push(outcome);
        }
    }

    /// Promote until nothing Confirmed is left.
    pub fn promote_all(&self) -> Vec<PromotionOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.ingestor.promote_step().unwrap() {
            outcomes.push(outcome);
        }
        outcomes
    }

    pub fn tip_height(&self) -> u64 {
        self.store.tip().unwrap().height
    }
}
