//! Ingestor Service - fetch, promote, prune and watch.
//!
//! Four independent loops share one service instance:
//!
//! | Loop | Tick | Sleeps when |
//! |------|------|-------------|
//! | fetch | `fetch_step` | head reached or error |
//! | promote | `promote_step` | nothing Confirmed |
//! | prune | `prune_step` | always (`prune_interval`) |
//! | watchdog | `watchdog_step` | always (`watchdog_interval`) |
//!
//! The loops never coordinate in memory. Every step re-reads what it needs
//! from the store and relies on status-conditioned updates for safety.


use std::sync::Arc;
use std::time::Duration;

use ep_01_task_store::PromotionOutcome;
use ep_02_chain_reader::decode_block;
use ep_telemetry::{
    record_loop_error, ALERTS_SENT, BLOCKS_INGESTED, BLOCKS_PRUNED, EVENTS_CONFIRMED,
    EVENTS_SKIPPED, REORGS_DETECTED, TASKS_PROMOTED, TIP_HEIGHT,
};
use shared_types::{BlockRecord, EventKind, Height};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::IngestorConfig;
use crate::domain::{is_fork, next_height, prune_floor, stale_tip_alert};
use crate::error::{IngestorError, IngestorResult};
use crate::ports::outbound::{Alerter, ChainReader, TaskStore, TimeSource};

/// Result of one fetch tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new tip was persisted.
    Appended {
        height: Height,
        events: usize,
        skipped: usize,
        newly_confirmed: u64,
    },
    /// The fetched block did not extend the tip; the tip was deleted.
    Rewound { height: Height, events_deleted: u64 },
    /// The chain has not produced the target height yet.
    HeadReached { height: Height },
}

/// The ingestion pipeline over a store, a chain and an alert channel.
pub struct IngestorService<S, C, A>
where
    S: TaskStore,
    C: ChainReader,
    A: Alerter,
{
    config: IngestorConfig,
    store: Arc<S>,
    chain: Arc<C>,
    alerter: Arc<A>,
    clock: Arc<dyn TimeSource>,
}

impl<S, C, A> IngestorService<S, C, A>
where
    S: TaskStore + 'static,
    C: ChainReader + 'static,
    A: Alerter + 'static,
{
    pub fn new(
        config: IngestorConfig,
        store: Arc<S>,
        chain: Arc<C>,
        alerter: Arc<A>,
        clock: Arc<dyn TimeSource>,
    ) -> IngestorResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            chain,
            alerter,
            clock,
        })
    }

    pub fn config(&self) -> &IngestorConfig {
        &self.config
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Advance the tip by one block, or rewind it on a fork.
    pub async fn fetch_step(&self) -> IngestorResult<FetchOutcome> {
        let tip = self.store.tip()?;
        let target = next_height(&tip, self.config.start_height);

        let raw = match self.chain.fetch_block_and_events(target).await {
            Ok(raw) => raw,
            Err(err) if err.is_head_reached() => {
                return Ok(FetchOutcome::HeadReached { height: target });
            }
            Err(err) => return Err(err.into()),
        };

        if is_fork(&tip, &raw.header) {
            let rewind = self.store.rewind_to(tip.height)?;
            REORGS_DETECTED.inc();
            ep_telemetry::log_event!(
                warn,
                "ingestor",
                "Parent hash mismatch, rewinding tip",
                height = tip.height,
                stored_hash = %tip.block_hash,
                fetched_parent = %raw.header.parent_hash,
                events_deleted = rewind.events_deleted
            );
            return Ok(FetchOutcome::Rewound {
                height: tip.height,
                events_deleted: rewind.events_deleted,
            });
        }

        let report = decode_block(raw);
        for err in &report.skipped {
            EVENTS_SKIPPED.inc();
            error!("[ep-03] Dropping undecodable event at height {}: {}", target, err);
        }

        let record = BlockRecord::from_header(&report.block.header, self.clock.now());
        let events = report.block.events.len();
        let update = {
            let store = Arc::clone(&self.store);
            let record = record.clone();
            let threshold = self.config.confirmation_threshold;
            let decoded = report.block.events;
            tokio::task::spawn_blocking(move || {
                store.append_block(&record, &decoded)?;
                store.refresh_confirmations(record.height, threshold)
            })
            .await??
        };

        BLOCKS_INGESTED.inc();
        EVENTS_CONFIRMED.inc_by(update.newly_confirmed as f64);
        TIP_HEIGHT.set(record.height as f64);

        if events > 0 || update.newly_confirmed > 0 {
            info!(
                height = record.height,
                events = events,
                newly_confirmed = update.newly_confirmed,
                "[ep-03] Block stored"
            );
        } else {
            debug!("[ep-03] Block {} stored", record.height);
        }

        Ok(FetchOutcome::Appended {
            height: record.height,
            events,
            skipped: report.skipped.len(),
            newly_confirmed: update.newly_confirmed,
        })
    }

    /// Promote the oldest Confirmed task-creation event, if any.
    pub fn promote_step(&self) -> IngestorResult<Option<PromotionOutcome>> {
        let Some(event) = self.store.next_confirmed_event(EventKind::TaskCreated)? else {
            return Ok(None);
        };

        let outcome = self.store.promote_event(&event)?;
        match outcome {
            PromotionOutcome::Promoted { task_id } => {
                TASKS_PROMOTED.inc();
                ep_telemetry::log_event!(
                    info,
                    "ingestor",
                    "Execution task created",
                    task_id = task_id,
                    height = event.height,
                    tx_hash = %event.tx_hash
                );
            }
            PromotionOutcome::DuplicateTask { task_id } => {
                warn!(
                    "[ep-03] Task {} already exists, event {} marked promoted",
                    task_id, event.id
                );
            }
            PromotionOutcome::NotConfirmed => {
                debug!("[ep-03] Event {} promoted concurrently", event.id);
            }
        }
        Ok(Some(outcome))
    }

    /// Drop blocks that fell out of the retention window.
    pub fn prune_step(&self) -> IngestorResult<u64> {
        let tip = self.store.tip()?;
        let Some(floor) = prune_floor(tip.height, self.config.retention_window) else {
            return Ok(0);
        };

        let deleted = self.store.prune_below(floor)?;
        if deleted > 0 {
            BLOCKS_PRUNED.inc_by(deleted as f64);
            info!("[ep-03] Pruned {} blocks below height {}", deleted, floor);
        }
        Ok(deleted)
    }

    /// Alert when the tip has not moved within the staleness budget.
    pub async fn watchdog_step(&self) -> IngestorResult<Option<String>> {
        let tip = self.store.tip()?;
        let Some(message) = stale_tip_alert(
            &self.config.moniker,
            &tip,
            self.clock.now(),
            self.config.stale_after,
        ) else {
            return Ok(None);
        };

        self.alerter.send_alert(&message).await?;
        ALERTS_SENT.inc();
        warn!("[ep-03] Liveness alert sent: {}", message);
        Ok(Some(message))
    }

    // =========================================================================
    // Loops
    // =========================================================================

    /// Spawn the fetch, promotion, pruning and watchdog loops.
    ///
    /// Each loop exits once `shutdown` flips to `true`.
    pub fn spawn(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        info!(
            "[ep-03] Starting ingestor (threshold={}, retention={})",
            self.config.confirmation_threshold, self.config.retention_window
        );
        vec![
            tokio::spawn(Arc::clone(&self).run_fetch_loop(shutdown.clone())),
            tokio::spawn(Arc::clone(&self).run_promote_loop(shutdown.clone())),
            tokio::spawn(Arc::clone(&self).run_prune_loop(shutdown.clone())),
            tokio::spawn(self.run_watchdog_loop(shutdown)),
        ]
    }

    async fn run_fetch_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            let delay = match self.fetch_step().await {
                Ok(FetchOutcome::HeadReached { .. }) => self.config.fetch_interval,
                Ok(_) => Duration::ZERO,
                Err(err) => {
                    report_error("fetch", &err);
                    self.config.fetch_interval
                }
            };
            if !pause(&mut shutdown, delay).await {
                break;
            }
        }
        info!("[ep-03] Fetch loop stopped");
    }

    async fn run_promote_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            let delay = match self.promote_step() {
                Ok(Some(_)) => Duration::ZERO,
                Ok(None) => self.config.promote_interval,
                Err(err) => {
                    report_error("promote", &err);
                    self.config.promote_interval
                }
            };
            if !pause(&mut shutdown, delay).await {
                break;
            }
        }
        info!("[ep-03] Promotion loop stopped");
    }

    async fn run_prune_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if let Err(err) = self.prune_step() {
                report_error("prune", &err);
            }
            if !pause(&mut shutdown, self.config.prune_interval).await {
                break;
            }
        }
        info!("[ep-03] Pruning loop stopped");
    }

    async fn run_watchdog_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if !pause(&mut shutdown, self.config.watchdog_interval).await {
                break;
            }
            if let Err(err) = self.watchdog_step().await {
                report_error("watchdog", &err);
            }
        }
        info!("[ep-03] Watchdog loop stopped");
    }
}

fn report_error(component: &str, err: &IngestorError) {
    record_loop_error(component);
    if err.is_transient() {
        warn!("[ep-03] {} tick failed: {}", component, err);
    } else {
        error!("[ep-03] {} tick failed: {}", component, err);
    }
}

/// Sleep for `delay` unless shutdown is requested first. Returns `false` on
/// shutdown.
async fn pause(shutdown: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    if delay.is_zero() {
        tokio::task::yield_now().await;
        return !*shutdown.borrow();
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => !*shutdown.borrow(),
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}
