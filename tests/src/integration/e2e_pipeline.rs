//! # End-to-End Pipeline
//!
//! A task-creation event travels through every stage:
//!
//! ```text
//! height 100  event Pending
//! tip 114     14 confirmations, still Pending
//! tip 115     Confirmed → promoted → task Created
//! runner      sandbox {42, "ok"} → task Executed
//! reporter    submission → task Reported
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ep_01_task_store::{PromotionOutcome, TaskStore};
    use ep_02_chain_reader::task_created_event;
    use ep_03_ingestor::FetchOutcome;
    use ep_04_sandbox::ScriptedRun;
    use ep_05_runner::TickOutcome;
    use ep_06_reporter::ReportOutcome;
    use shared_types::{EventStatus, Receipt, TaskStatus};

    use crate::integration::harness::Pipeline;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    /// Upload an executable and one input, then emit task 7 at height 100.
    fn inject_task_seven(p: &Pipeline) -> (String, String) {
        let exe = p.storage.insert("bucket-a", "word_count.wasm", b"\0asm".to_vec());
        let input = p.storage.insert("bucket-b", "data.txt", b"to be or not to be".to_vec());
        p.chain.extend_to(99);
        let height = p
            .chain
            .push_block(vec![task_created_event("AA07", 7, &exe, &[&input], 50_000)]);
        assert_eq!(height, 100);
        (exe, input)
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    // =========================================================================
    // STEP-BY-STEP
    // =========================================================================

    #[tokio::test]
    async fn test_task_travels_from_event_to_submission() {
        let p = Pipeline::new();
        let (exe, _) = inject_task_seven(&p);

        // Tip 114: fourteen confirmations, nothing to promote.
        p.chain.extend_to(114);
        p.sync().await;
        assert_eq!(p.tip_height(), 114);
        let events = p.store.events_at(100).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, EventStatus::Pending);
        assert_eq!(events[0].confirmations, 14);
        assert!(p.promote_all().is_empty());
        assert!(p.store.task(7).unwrap().is_none());

        // Tip 115: Confirmed, then promoted.
        p.chain.extend_to(115);
        let outcomes = p.sync().await;
        assert!(matches!(
            outcomes.as_slice(),
            [FetchOutcome::Appended {
                height: 115,
                newly_confirmed: 1,
                ..
            }]
        ));
        assert_eq!(p.store.events_at(100).unwrap()[0].status, EventStatus::Confirmed);
        assert_eq!(
            p.promote_all(),
            vec![PromotionOutcome::Promoted { task_id: 7 }]
        );
        assert_eq!(p.store.events_at(100).unwrap()[0].status, EventStatus::Promoted);

        let task = p.store.task(7).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Created);
        assert_eq!(task.origin_tx_hash, "AA07");
        assert_eq!(task.payload.executable_ref, exe);
        assert_eq!(task.payload.resource_limit, 50_000);

        // Runner: the default scripted sandbox reports {42, "ok"}.
        assert_eq!(
            p.runner.tick().await.unwrap(),
            TickOutcome::Executed {
                task_id: 7,
                status_code: Receipt::STATUS_SUCCESS,
            }
        );
        let task = p.store.task(7).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Executed);
        let receipt = task.receipt.unwrap();
        assert_eq!(receipt.resource_used, 42);
        assert_eq!(receipt.result_message, "ok");
        assert!(!receipt.result_ref.is_empty());
        assert_eq!(p.launcher.requests()[0].resource_limit, 50_000);

        // Reporter.
        let outcome = p.reporter.tick().await.unwrap();
        let ReportOutcome::Reported { task_id, tx_hash } = outcome else {
            panic!("unexpected {outcome:?}");
        };
        assert_eq!(task_id, 7);
        assert!(!tx_hash.is_empty());

        let task = p.store.task(7).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Reported);
        assert_eq!(task.submit_tx_hash.as_deref(), Some(tx_hash.as_str()));

        let submissions = p.writer.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].status_code, Receipt::STATUS_SUCCESS);
        assert_eq!(submissions[0].result_ref, receipt.result_ref);

        // Nothing left for anyone.
        assert!(p.promote_all().is_empty());
        assert_eq!(p.runner.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(p.reporter.tick().await.unwrap(), ReportOutcome::Idle);
    }

    #[tokio::test]
    async fn test_failed_workload_is_reported_with_failure_status() {
        let p = Pipeline::new();
        inject_task_seven(&p);
        p.chain.extend_to(115);
        p.sync().await;
        p.promote_all();

        p.launcher.push(ScriptedRun::failure("unreachable instruction"));
        assert_eq!(
            p.runner.tick().await.unwrap(),
            TickOutcome::Executed {
                task_id: 7,
                status_code: Receipt::STATUS_FAILED,
            }
        );
        let receipt = p.store.task(7).unwrap().unwrap().receipt.unwrap();
        assert_eq!(receipt.result_message, "unreachable instruction");
        assert!(receipt.result_ref.is_empty());
        assert!(!receipt.log_ref.is_empty());

        p.reporter.tick().await.unwrap();
        let submissions = p.writer.submissions();
        assert_eq!(submissions[0].status_code, Receipt::STATUS_FAILED);
        assert_eq!(submissions[0].result_ref, "");
        assert_eq!(
            p.store.task(7).unwrap().unwrap().status,
            TaskStatus::Reported
        );
    }

    #[tokio::test]
    async fn test_stalled_chain_raises_liveness_alert() {
        let p = Pipeline::new();
        p.chain.extend_to(12);
        p.sync().await;

        p.clock.advance(300);
        assert_eq!(p.ingestor.watchdog_step().await.unwrap(), None);

        p.clock.advance(1);
        let alert = p.ingestor.watchdog_step().await.unwrap().unwrap();
        assert!(alert.starts_with("[execution-provider] last block fetched at "));
        assert!(alert.ends_with("height=12"));
        assert_eq!(p.alerter.sent(), vec![alert]);

        // A new block resets the clock.
        p.chain.extend_to(13);
        p.sync().await;
        assert_eq!(p.ingestor.watchdog_step().await.unwrap(), None);
    }

    // =========================================================================
    // RUNNING LOOPS
    // =========================================================================

    #[tokio::test]
    async fn test_loops_drive_task_to_reported() {
        let p = Pipeline::new();
        inject_task_seven(&p);
        p.chain.extend_to(120);

        let (tx, rx) = tokio::sync::watch::channel(false);
        let mut handles = p.ingestor.clone().spawn(rx.clone());
        handles.push(p.runner.clone().spawn(rx.clone()));
        handles.push(p.reporter.clone().spawn(rx));

        let store = p.store.clone();
        wait_for(move || {
            store
                .task(7)
                .unwrap()
                .is_some_and(|task| task.status == TaskStatus::Reported)
        })
        .await;

        tx.send(true).unwrap();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .unwrap()
                .unwrap();
        }
        assert_eq!(p.tip_height(), 120);
        assert_eq!(p.writer.submissions().len(), 1);
    }
}
