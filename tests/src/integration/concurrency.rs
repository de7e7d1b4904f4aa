//! # Concurrent Transitions
//!
//! Every status change is a conditional update. When several processes race
//! on the same row, exactly one wins and the others observe a no-op.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use ep_01_task_store::{PromotionOutcome, SqliteTaskStore, TaskStore};
    use ep_02_chain_reader::task_created_event;
    use ep_05_runner::{RunnerConfig, TaskRunner, TickOutcome};
    use ep_06_reporter::{RecordingChainWriter, ReportOutcome, ReporterConfig, ResultReporter};
    use shared_types::{EventKind, Receipt, TaskStatus};

    use crate::integration::harness::Pipeline;

    const RACERS: usize = 8;

    fn db_path(p: &Pipeline) -> PathBuf {
        p.dir.path().join("tasks.db")
    }

    /// Run `f` on `RACERS` threads, each with its own store handle, released
    /// together. Returns every result.
    fn race<T, F>(db: PathBuf, f: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(usize, &SqliteTaskStore) -> T + Send + Sync + 'static,
    {
        let barrier = Arc::new(Barrier::new(RACERS));
        let f = Arc::new(f);
        let handles: Vec<_> = (0..RACERS)
            .map(|i| {
                let barrier = barrier.clone();
                let f = f.clone();
                let db = db.clone();
                thread::spawn(move || {
                    let store = SqliteTaskStore::open(&db).unwrap();
                    barrier.wait();
                    f(i, &store)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    async fn pipeline_with_confirmed_task(task_id: u64) -> Pipeline {
        let p = Pipeline::new();
        let exe = p.storage.insert("bucket-a", "job.wasm", b"\0asm".to_vec());
        p.chain.extend_to(2);
        p.chain
            .push_block(vec![task_created_event("T", task_id, &exe, &[], 1_000)]);
        p.chain.extend_to(20);
        p.sync().await;
        p
    }

    fn receipt(i: usize) -> Receipt {
        Receipt {
            resource_used: i as u64,
            status_code: Receipt::STATUS_SUCCESS,
            result_message: format!("racer {i}"),
            result_ref: format!("bucket-a/task-7/result-{i}.txt"),
            log_ref: String::new(),
        }
    }

    // =========================================================================
    // STORE-LEVEL RACES
    // =========================================================================

    #[tokio::test]
    async fn test_concurrent_promotion_creates_one_task() {
        let p = pipeline_with_confirmed_task(7).await;
        let event = p
            .store
            .next_confirmed_event(EventKind::TaskCreated)
            .unwrap()
            .unwrap();

        let outcomes = race(db_path(&p), move |_, store| {
            store.promote_event(&event).unwrap()
        });
        let promoted = outcomes
            .iter()
            .filter(|o| matches!(o, PromotionOutcome::Promoted { task_id: 7 }))
            .count();
        assert_eq!(promoted, 1);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, PromotionOutcome::Promoted { .. } | PromotionOutcome::NotConfirmed)));
        assert_eq!(p.store.task(7).unwrap().unwrap().status, TaskStatus::Created);
    }

    #[tokio::test]
    async fn test_concurrent_receipts_one_wins() {
        let p = pipeline_with_confirmed_task(7).await;
        p.promote_all();

        let won = race(db_path(&p), |i, store| store.record_receipt(7, &receipt(i)).unwrap());
        let winners: Vec<usize> = won
            .iter()
            .enumerate()
            .filter(|(_, won)| **won)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(winners.len(), 1);

        let task = p.store.task(7).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Executed);
        assert_eq!(task.receipt.unwrap(), receipt(winners[0]));

        // Too late for a second receipt.
        assert!(!p.store.record_receipt(7, &receipt(99)).unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_keep_first_hash() {
        let p = pipeline_with_confirmed_task(7).await;
        p.promote_all();
        assert!(p.store.record_receipt(7, &receipt(0)).unwrap());

        let won = race(db_path(&p), |i, store| {
            store.record_submission(7, &format!("HASH-{i}")).unwrap()
        });
        let winner = won.iter().position(|won| *won).unwrap();
        assert_eq!(won.iter().filter(|won| **won).count(), 1);

        let stored = p.store.task(7).unwrap().unwrap().submit_tx_hash;
        assert_eq!(stored, Some(format!("HASH-{winner}")));

        assert!(!p.store.record_submission(7, "LATE").unwrap());
        assert_eq!(
            p.store.task(7).unwrap().unwrap().submit_tx_hash,
            Some(format!("HASH-{winner}"))
        );
    }

    // =========================================================================
    // SERVICE-LEVEL RACES
    // =========================================================================

    #[tokio::test]
    async fn test_two_runners_execute_task_once() {
        let p = pipeline_with_confirmed_task(7).await;
        p.promote_all();

        let second = TaskRunner::new(
            RunnerConfig {
                staging_dir: p.dir.path().join("staging-2"),
                ..Default::default()
            },
            Arc::new(SqliteTaskStore::open(db_path(&p)).unwrap()),
            p.storage.clone(),
            p.launcher.clone(),
        )
        .unwrap();

        let (a, b) = tokio::join!(p.runner.tick(), second.tick());
        let outcomes = [a.unwrap(), b.unwrap()];
        let executed = outcomes
            .iter()
            .filter(|o| matches!(o, TickOutcome::Executed { task_id: 7, .. }))
            .count();
        assert_eq!(executed, 1, "{outcomes:?}");
        assert!(outcomes.iter().all(|o| matches!(
            o,
            TickOutcome::Executed { .. } | TickOutcome::AlreadyAdvanced { .. } | TickOutcome::Idle
        )));
        assert_eq!(p.store.task(7).unwrap().unwrap().status, TaskStatus::Executed);
    }

    #[tokio::test]
    async fn test_second_reporter_never_replaces_hash() {
        let p = pipeline_with_confirmed_task(7).await;
        p.promote_all();
        p.runner.tick().await.unwrap();

        let other_writer = Arc::new(RecordingChainWriter::new());
        let second = ResultReporter::new(
            ReporterConfig::default(),
            Arc::new(SqliteTaskStore::open(db_path(&p)).unwrap()),
            other_writer.clone(),
        )
        .unwrap();

        let first = p.reporter.tick().await.unwrap();
        let ReportOutcome::Reported { tx_hash, .. } = first else {
            panic!("unexpected {first:?}");
        };
        assert_eq!(second.tick().await.unwrap(), ReportOutcome::Idle);
        assert!(other_writer.submissions().is_empty());
        assert_eq!(
            p.store.task(7).unwrap().unwrap().submit_tx_hash,
            Some(tx_hash)
        );
    }
}
