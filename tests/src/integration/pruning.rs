//! # Pruning Boundary
//!
//! With tip `T` and retention window `W`, the block at `T - W - 1` is deleted
//! and the block at `T - W` is kept. Events and tasks are never pruned.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ep_01_task_store::TaskStore;
    use ep_02_chain_reader::task_created_event;
    use ep_03_ingestor::IngestorConfig;
    use shared_types::{EventStatus, TaskStatus};

    use crate::integration::harness::Pipeline;

    fn pipeline(retention_window: u64) -> Pipeline {
        Pipeline::with_ingestor_config(IngestorConfig {
            retention_window,
            fetch_interval: Duration::from_millis(5),
            promote_interval: Duration::from_millis(5),
            prune_interval: Duration::from_millis(10),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_prune_boundary() {
        let p = pipeline(20);
        p.chain.extend_to(50);
        p.sync().await;

        assert_eq!(p.ingestor.prune_step().unwrap(), 29);
        assert!(p.store.block_at(29).unwrap().is_none());
        assert!(p.store.block_at(30).unwrap().is_some());
        assert!(p.store.block_at(1).unwrap().is_none());
        assert_eq!(p.tip_height(), 50);

        // Idempotent until the tip moves.
        assert_eq!(p.ingestor.prune_step().unwrap(), 0);
        p.chain.extend_to(51);
        p.sync().await;
        assert_eq!(p.ingestor.prune_step().unwrap(), 1);
        assert!(p.store.block_at(30).unwrap().is_none());
        assert!(p.store.block_at(31).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pruning_keeps_events_and_tasks() {
        let p = pipeline(20);
        p.chain.extend_to(4);
        p.chain
            .push_block(vec![task_created_event("AA03", 3, "exe", &[], 1_000)]);
        p.chain.extend_to(60);
        p.sync().await;
        p.promote_all();

        p.ingestor.prune_step().unwrap();
        assert!(p.store.block_at(5).unwrap().is_none());

        let events = p.store.events_at(5).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, EventStatus::Promoted);
        assert_eq!(p.store.task(3).unwrap().unwrap().status, TaskStatus::Created);
    }

    #[tokio::test]
    async fn test_ingestion_continues_after_pruning() {
        let p = pipeline(20);
        p.chain.extend_to(40);
        p.sync().await;
        p.ingestor.prune_step().unwrap();

        p.chain.extend_to(45);
        p.sync().await;
        assert_eq!(p.tip_height(), 45);
        let tip = p.store.block_at(45).unwrap().unwrap();
        let parent = p.store.block_at(44).unwrap().unwrap();
        assert_eq!(tip.parent_hash, parent.block_hash);
    }

    #[tokio::test]
    async fn test_prune_loop_applies_window() {
        let p = pipeline(20);
        p.chain.extend_to(50);

        let (tx, rx) = tokio::sync::watch::channel(false);
        let handles = p.ingestor.clone().spawn(rx);

        let store = p.store.clone();
        tokio::time::timeout(Duration::from_secs(10), async move {
            loop {
                let caught_up = store.tip().unwrap().height == 50;
                if caught_up && store.block_at(29).unwrap().is_none() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(p.store.block_at(30).unwrap().is_some());
    }
}
