//! Behavior every [`TaskStore`] adapter must share.
//!
//! Each case takes a freshly migrated, empty store and the clock it stamps
//! rows with. Adapters run the whole set through [`task_store_conformance!`].

use shared_types::{
    BlockRecord, ChainEvent, EventBody, EventKind, EventStatus, Receipt, ResultSubmitted,
    TaskCreated, TaskPayload, TaskStatus, MAX_STORED_INTEGER,
};

use crate::adapters::time::ManualTimeSource;
use crate::domain::PromotionOutcome;
use crate::error::StoreError;
use crate::ports::inbound::TaskStore;

/// Expand to one `#[test]` per conformance case. `$open` takes the test clock
/// and returns `Option<(store, guard)>`; `None` skips the case and the guard
/// lives until the case ends.
macro_rules! task_store_conformance {
    ($open:path) => {
        $crate::adapters::conformance::task_store_conformance!($open;
            test_empty_store_tip_is_genesis,
            test_append_block_persists_block_and_events,
            test_duplicate_height_rolls_back_events,
            test_rewind_keeps_confirmed_events,
            test_prune_below_is_strict,
            test_confirmation_threshold_boundary,
            test_refresh_is_idempotent,
            test_confirmed_events_stop_counting,
            test_next_confirmed_event_orders_by_task_id,
            test_promote_inserts_task_with_payload,
            test_promote_twice_is_noop,
            test_promote_duplicate_task_id,
            test_next_created_task_respects_watermark,
            test_task_lifecycle_moves_forward_only,
            test_record_attempt_only_while_created,
            test_concurrent_receipts_apply_once,
            test_integer_columns_hold_full_range,
        );
    };
    ($open:path; $($case:ident),+ $(,)?) => {
        $(
            #[test]
            fn $case() {
                let clock = std::sync::Arc::new(
                    $crate::adapters::time::ManualTimeSource::new(1_000),
                );
                let Some((store, _guard)) = $open(std::sync::Arc::clone(&clock)) else {
                    return;
                };
                $crate::adapters::conformance::$case(&store, &clock);
            }
        )+
    };
}

pub(crate) use task_store_conformance;

// =============================================================================
// Fixtures
// =============================================================================

pub fn block(height: u64) -> BlockRecord {
    BlockRecord {
        height,
        block_hash: format!("H{height}"),
        parent_hash: format!("H{}", height.saturating_sub(1)),
        block_time: 1_700_000_000 + height as i64,
        observed_at: 1_700_000_000 + height as i64,
    }
}

pub fn task_created(task_id: u64) -> ChainEvent {
    ChainEvent {
        tx_hash: format!("TX{task_id}"),
        body: EventBody::TaskCreated(TaskCreated {
            task_id,
            operator: "0xoperator".into(),
            payload: TaskPayload {
                executable_ref: format!("exe-{task_id}"),
                input_refs: vec![format!("in-{task_id}-a"), format!("in-{task_id}-b")],
                resource_limit: 1_000,
                method: "run".into(),
                params_hex: "cafe".into(),
            },
        }),
    }
}

pub fn receipt(resource_used: u64) -> Receipt {
    Receipt {
        resource_used,
        status_code: Receipt::STATUS_SUCCESS,
        result_message: "ok".into(),
        result_ref: "bucket/result".into(),
        log_ref: "bucket/log".into(),
    }
}

/// Store a block carrying `task_ids`, confirm it and promote every event.
pub fn seed_created_tasks<S: TaskStore>(store: &S, height: u64, task_ids: &[u64]) {
    let events: Vec<_> = task_ids.iter().copied().map(task_created).collect();
    store.append_block(&block(height), &events).unwrap();
    store.refresh_confirmations(height + 15, 15).unwrap();
    while let Some(event) = store.next_confirmed_event(EventKind::TaskCreated).unwrap() {
        store.promote_event(&event).unwrap();
    }
}

// =============================================================================
// Blocks
// =============================================================================

pub fn test_empty_store_tip_is_genesis<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    assert!(store.tip().unwrap().is_genesis());
}

pub fn test_append_block_persists_block_and_events<S: TaskStore>(
    store: &S,
    _clock: &ManualTimeSource,
) {
    store
        .append_block(
            &block(100),
            &[
                task_created(7),
                ChainEvent {
                    tx_hash: "RESULT".into(),
                    body: EventBody::ResultSubmitted(ResultSubmitted { task_id: Some(3) }),
                },
            ],
        )
        .unwrap();

    assert_eq!(store.tip().unwrap(), block(100));
    assert_eq!(store.block_at(100).unwrap(), Some(block(100)));

    let events = store.events_at(100).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::TaskCreated);
    assert_eq!(events[0].task_id, 7);
    assert_eq!(events[0].block_hash, "H100");
    assert_eq!(events[0].status, EventStatus::Pending);
    assert_eq!(events[0].payload.input_refs, vec!["in-7-a", "in-7-b"]);
    assert_eq!(events[1].kind, EventKind::ResultSubmitted);
    assert_eq!(events[1].task_id, 3);
    assert!(events[1].payload.executable_ref.is_empty());
}

pub fn test_duplicate_height_rolls_back_events<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    store.append_block(&block(10), &[]).unwrap();
    assert!(store.append_block(&block(10), &[task_created(1)]).is_err());
    assert!(store.events_at(10).unwrap().is_empty());
}

pub fn test_rewind_keeps_confirmed_events<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    store.append_block(&block(10), &[task_created(1)]).unwrap();
    store.refresh_confirmations(25, 15).unwrap();
    store.append_block(&block(11), &[task_created(2)]).unwrap();

    let outcome = store.rewind_to(10).unwrap();
    assert_eq!(outcome.blocks_deleted, 2);
    assert_eq!(outcome.events_deleted, 1);

    assert!(store.tip().unwrap().is_genesis());
    let kept = store.events_at(10).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].status, EventStatus::Confirmed);
    assert!(store.events_at(11).unwrap().is_empty());
}

pub fn test_prune_below_is_strict<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    for height in 1..=10 {
        store.append_block(&block(height), &[]).unwrap();
    }
    assert_eq!(store.prune_below(4).unwrap(), 3);
    assert!(store.block_at(3).unwrap().is_none());
    assert!(store.block_at(4).unwrap().is_some());
    assert_eq!(store.tip().unwrap().height, 10);
}

// =============================================================================
// Confirmations and promotion
// =============================================================================

pub fn test_confirmation_threshold_boundary<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    store.append_block(&block(100), &[task_created(7)]).unwrap();

    let update = store.refresh_confirmations(114, 15).unwrap();
    assert_eq!(update.newly_confirmed, 0);
    let event = &store.events_at(100).unwrap()[0];
    assert_eq!(event.confirmations, 14);
    assert_eq!(event.status, EventStatus::Pending);

    let update = store.refresh_confirmations(115, 15).unwrap();
    assert_eq!(update.newly_confirmed, 1);
    let event = &store.events_at(100).unwrap()[0];
    assert_eq!(event.confirmations, 15);
    assert_eq!(event.status, EventStatus::Confirmed);
}

pub fn test_refresh_is_idempotent<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    store.append_block(&block(100), &[task_created(7)]).unwrap();
    store.refresh_confirmations(105, 15).unwrap();
    store.refresh_confirmations(105, 15).unwrap();
    assert_eq!(store.events_at(100).unwrap()[0].confirmations, 5);
}

pub fn test_confirmed_events_stop_counting<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    store.append_block(&block(100), &[task_created(7)]).unwrap();
    store.refresh_confirmations(115, 15).unwrap();
    let update = store.refresh_confirmations(130, 15).unwrap();
    assert_eq!(update.refreshed, 0);
    assert_eq!(store.events_at(100).unwrap()[0].confirmations, 15);
}

pub fn test_next_confirmed_event_orders_by_task_id<S: TaskStore>(
    store: &S,
    _clock: &ManualTimeSource,
) {
    store
        .append_block(&block(50), &[task_created(9), task_created(4), task_created(6)])
        .unwrap();
    store.refresh_confirmations(70, 15).unwrap();

    let event = store.next_confirmed_event(EventKind::TaskCreated).unwrap().unwrap();
    assert_eq!(event.task_id, 4);
    assert!(store
        .next_confirmed_event(EventKind::ResultSubmitted)
        .unwrap()
        .is_none());
}

pub fn test_promote_inserts_task_with_payload<S: TaskStore>(store: &S, clock: &ManualTimeSource) {
    store.append_block(&block(100), &[task_created(7)]).unwrap();
    store.refresh_confirmations(115, 15).unwrap();

    clock.set(2_000);
    let event = store.next_confirmed_event(EventKind::TaskCreated).unwrap().unwrap();
    assert_eq!(
        store.promote_event(&event).unwrap(),
        PromotionOutcome::Promoted { task_id: 7 }
    );

    let task = store.task(7).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Created);
    assert_eq!(task.origin_tx_hash, "TX7");
    assert_eq!(task.operator, "0xoperator");
    assert_eq!(task.payload, event.payload);
    assert_eq!(task.receipt, None);
    assert_eq!(task.created_at, 2_000);
    assert_eq!(store.events_at(100).unwrap()[0].status, EventStatus::Promoted);
}

pub fn test_promote_twice_is_noop<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    store.append_block(&block(100), &[task_created(7)]).unwrap();
    store.refresh_confirmations(115, 15).unwrap();
    let event = store.next_confirmed_event(EventKind::TaskCreated).unwrap().unwrap();

    store.promote_event(&event).unwrap();
    assert_eq!(
        store.promote_event(&event).unwrap(),
        PromotionOutcome::NotConfirmed
    );
}

pub fn test_promote_duplicate_task_id<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    store.append_block(&block(100), &[task_created(7)]).unwrap();
    store.append_block(&block(101), &[task_created(7)]).unwrap();
    store.refresh_confirmations(120, 15).unwrap();

    let first = store.next_confirmed_event(EventKind::TaskCreated).unwrap().unwrap();
    assert!(matches!(
        store.promote_event(&first).unwrap(),
        PromotionOutcome::Promoted { task_id: 7 }
    ));
    let second = store.next_confirmed_event(EventKind::TaskCreated).unwrap().unwrap();
    assert_eq!(
        store.promote_event(&second).unwrap(),
        PromotionOutcome::DuplicateTask { task_id: 7 }
    );
    assert!(store
        .next_confirmed_event(EventKind::TaskCreated)
        .unwrap()
        .is_none());
}

// =============================================================================
// Task transitions
// =============================================================================

pub fn test_next_created_task_respects_watermark<S: TaskStore>(
    store: &S,
    _clock: &ManualTimeSource,
) {
    seed_created_tasks(store, 10, &[3, 1, 2]);

    assert_eq!(store.next_created_task(0).unwrap().unwrap().task_id, 1);
    assert_eq!(store.next_created_task(1).unwrap().unwrap().task_id, 2);
    assert!(store.next_created_task(3).unwrap().is_none());
}

pub fn test_task_lifecycle_moves_forward_only<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    seed_created_tasks(store, 10, &[1]);

    assert!(!store.record_submission(1, "0xEARLY").unwrap());
    assert!(store.record_receipt(1, &receipt(42)).unwrap());
    assert!(!store.record_receipt(1, &receipt(99)).unwrap());

    let executed = store.next_executed_task().unwrap().unwrap();
    assert_eq!(executed.receipt, Some(receipt(42)));

    assert!(store.record_submission(1, "0xABC").unwrap());
    assert!(!store.record_submission(1, "0xDEF").unwrap());

    let task = store.task(1).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Reported);
    assert_eq!(task.submit_tx_hash.as_deref(), Some("0xABC"));
    assert_eq!(task.receipt, Some(receipt(42)));
    assert!(store.next_executed_task().unwrap().is_none());
}

pub fn test_record_attempt_only_while_created<S: TaskStore>(store: &S, clock: &ManualTimeSource) {
    clock.set(500);
    seed_created_tasks(store, 10, &[1]);

    assert!(store.record_attempt(1).unwrap());
    assert!(store.record_attempt(1).unwrap());
    let task = store.task(1).unwrap().unwrap();
    assert_eq!(task.attempts, 2);
    assert_eq!(task.last_attempt_at, Some(500));

    store.record_receipt(1, &receipt(1)).unwrap();
    assert!(!store.record_attempt(1).unwrap());
    assert!(!store.record_attempt(404).unwrap());
}

pub fn test_concurrent_receipts_apply_once<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    seed_created_tasks(store, 10, &[1]);

    let winners: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8u64)
            .map(|i| scope.spawn(move || store.record_receipt(1, &receipt(i)).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count()
    });

    assert_eq!(winners, 1);
    assert_eq!(store.task(1).unwrap().unwrap().status, TaskStatus::Executed);
}

pub fn test_integer_columns_hold_full_range<S: TaskStore>(store: &S, _clock: &ManualTimeSource) {
    seed_created_tasks(store, 10, &[MAX_STORED_INTEGER]);
    assert!(store
        .record_receipt(MAX_STORED_INTEGER, &receipt(MAX_STORED_INTEGER))
        .unwrap());
    let task = store.task(MAX_STORED_INTEGER).unwrap().unwrap();
    assert_eq!(task.receipt, Some(receipt(MAX_STORED_INTEGER)));

    let err = store.record_receipt(1, &receipt(u64::MAX)).unwrap_err();
    assert!(!err.is_transient());
    assert!(matches!(err, StoreError::OutOfRange { .. } | StoreError::Database(_)));
}
