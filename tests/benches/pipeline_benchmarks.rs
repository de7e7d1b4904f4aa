//! # Pipeline Benchmarks
//!
//! | Stage | Measured |
//! |-------|----------|
//! | ep-02 decode | attribute bags → `ChainEvent` for one busy block |
//! | ep-01 ingest | `append_block` + `refresh_confirmations` per block |
//! | ep-01 promote | `next_confirmed_event` + `promote_event` per task |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ep_01_task_store::{SqliteTaskStore, TaskStore};
use ep_02_chain_reader::{decode_block, task_created_event, RawBlock, RawEvent};
use shared_types::{BlockHeader, BlockRecord, EventKind};

fn busy_block(height: u64, events: u64) -> RawBlock {
    RawBlock {
        header: BlockHeader {
            height,
            block_hash: format!("H{height}"),
            parent_hash: format!("H{}", height - 1),
            timestamp: 1_700_000_000 + height as i64,
        },
        events: (0..events)
            .map(|i| {
                let task_id = height * 1_000 + i;
                task_created_event(
                    &format!("TX{task_id}"),
                    task_id,
                    "bucket-a/job.zip",
                    &["bucket-b/in-1", "bucket-b/in-2"],
                    10_000,
                )
            })
            .collect::<Vec<RawEvent>>(),
    }
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("ep-02-decode");
    for events in [1u64, 50, 500] {
        let block = busy_block(10, events);
        group.throughput(Throughput::Elements(events));
        group.bench_with_input(BenchmarkId::from_parameter(events), &block, |b, block| {
            b.iter(|| black_box(decode_block(block.clone())))
        });
    }
    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ep-01-ingest");
    group.measurement_time(Duration::from_secs(5));
    for events in [0u64, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(events), &events, |b, &events| {
            let store = SqliteTaskStore::open_in_memory().unwrap();
            let mut height = 0u64;
            b.iter(|| {
                height += 1;
                let report = decode_block(busy_block(height, events));
                let record = BlockRecord::from_header(&report.block.header, 0);
                store.append_block(&record, &report.block.events).unwrap();
                black_box(store.refresh_confirmations(height, 15).unwrap());
            })
        });
    }
    group.finish();
}

fn bench_promote(c: &mut Criterion) {
    c.bench_function("ep-01-promote", |b| {
        let store = SqliteTaskStore::open_in_memory().unwrap();
        let mut height = 0u64;
        b.iter(|| {
            height += 1;
            let report = decode_block(busy_block(height, 1));
            let record = BlockRecord::from_header(&report.block.header, 0);
            store.append_block(&record, &report.block.events).unwrap();
            store.refresh_confirmations(height + 15, 15).unwrap();
            let event = store
                .next_confirmed_event(EventKind::TaskCreated)
                .unwrap()
                .unwrap();
            black_box(store.promote_event(&event).unwrap());
        })
    });
}

criterion_group!(benches, bench_decode, bench_ingest, bench_promote);
criterion_main!(benches);
