//! # Packaged Workloads on Disk
//!
//! Zip workloads stored in a directory-backed object store, staged by the
//! runner and launched as a real child process.

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use ep_01_task_store::{SqliteTaskStore, TaskStore};
    use ep_02_chain_reader::task_created_event;
    use ep_04_sandbox::{pack_zip, ProcessLauncher};
    use ep_05_runner::{FsObjectStorage, RunnerConfig, RunnerError, TaskRunner, TickOutcome};
    use ep_06_reporter::ReportOutcome;
    use shared_types::{Receipt, TaskStatus};

    use crate::integration::harness::Pipeline;

    const MANIFEST: &[u8] =
        br#"{"entry": "word_count.wasm", "inputs": ["input/data.txt"], "outputs": ["output/result.txt"]}"#;

    /// Stands in for the wasm runtime: `$1` is the resource flag, then
    /// entry, input and output.
    const WORD_COUNT: &str = r#"#!/bin/sh
words=$(wc -w < "$3" | tr -d ' ')
echo "$words" > "$4"
printf '{"gasUsed": %s, "resultMsg": "counted %s words"}' "$words" "$words" > "$EP_REPORT_FILE"
echo "word count finished""#;

    fn put(root: &Path, id: &str, bytes: &[u8]) {
        let path = root.join(id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    fn disk_runner(p: &Pipeline) -> TaskRunner<SqliteTaskStore, FsObjectStorage, ProcessLauncher> {
        let script = p.dir.path().join("runtime.sh");
        std::fs::write(&script, WORD_COUNT).unwrap();
        TaskRunner::new(
            RunnerConfig {
                staging_dir: p.dir.path().join("disk-staging"),
                ..Default::default()
            },
            Arc::new(SqliteTaskStore::open(p.dir.path().join("tasks.db")).unwrap()),
            Arc::new(FsObjectStorage::new(p.dir.path().join("objects"))),
            Arc::new(ProcessLauncher::new(
                "sh",
                vec![script.to_string_lossy().into_owned()],
            )),
        )
        .unwrap()
    }

    async fn promote_task(p: &Pipeline, task_id: u64, exe: &str, input: &str) {
        p.chain.extend_to(2);
        p.chain
            .push_block(vec![task_created_event("PKG", task_id, exe, &[input], 5_000)]);
        p.chain.extend_to(20);
        p.sync().await;
        p.promote_all();
    }

    #[tokio::test]
    async fn test_zip_workload_runs_and_uploads_result() {
        let p = Pipeline::new();
        let objects = p.dir.path().join("objects");
        let package = pack_zip(&[
            ("wordcount/manifest.json", MANIFEST),
            ("wordcount/word_count.wasm", b"\0asm"),
        ])
        .unwrap();
        put(&objects, "bucket-a/wordcount.zip", &package);
        put(&objects, "bucket-b/data.txt", b"to be or not to be");

        promote_task(&p, 7, "bucket-a/wordcount.zip", "bucket-b/data.txt").await;
        let runner = disk_runner(&p);

        assert_eq!(
            runner.tick().await.unwrap(),
            TickOutcome::Executed {
                task_id: 7,
                status_code: Receipt::STATUS_SUCCESS,
            }
        );

        let receipt = p.store.task(7).unwrap().unwrap().receipt.unwrap();
        assert_eq!(receipt.resource_used, 6);
        assert_eq!(receipt.result_message, "counted 6 words");
        assert_eq!(receipt.result_ref, "bucket-a/task-7/result.txt");
        assert_eq!(receipt.log_ref, "bucket-a/task-7/log.txt");

        let result = std::fs::read_to_string(objects.join(&receipt.result_ref)).unwrap();
        assert_eq!(result.trim(), "6");
        let log = std::fs::read_to_string(objects.join(&receipt.log_ref)).unwrap();
        assert!(log.contains("word count finished"));
        assert!(!p.dir.path().join("disk-staging/task-7").exists());

        let outcome = p.reporter.tick().await.unwrap();
        assert!(matches!(outcome, ReportOutcome::Reported { task_id: 7, .. }));
        assert_eq!(
            p.writer.submissions()[0].result_ref,
            "bucket-a/task-7/result.txt"
        );
    }

    #[tokio::test]
    async fn test_escaping_archive_leaves_task_created() {
        let p = Pipeline::new();
        let objects = p.dir.path().join("objects");
        let package = pack_zip(&[
            ("manifest.json", MANIFEST),
            ("word_count.wasm", b"\0asm"),
            ("../../escaped.txt", b"gotcha"),
        ])
        .unwrap();
        put(&objects, "bucket-a/evil.zip", &package);
        put(&objects, "bucket-b/data.txt", b"a b");

        promote_task(&p, 9, "bucket-a/evil.zip", "bucket-b/data.txt").await;
        let runner = disk_runner(&p);

        let err = runner.tick().await.unwrap_err();
        assert!(matches!(err, RunnerError::Sandbox(_)), "{err}");
        assert!(!err.is_transient());
        assert!(!p.dir.path().join("escaped.txt").exists());

        let task = p.store.task(9).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Created);
        assert_eq!(task.attempts, 1);
        // The watermark moved past the task; this runner will not retry it.
        assert_eq!(runner.tick().await.unwrap(), TickOutcome::Idle);
    }

    #[tokio::test]
    async fn test_missing_executable_is_reported_as_storage_error() {
        let p = Pipeline::new();
        put(&p.dir.path().join("objects"), "bucket-b/data.txt", b"a b");
        promote_task(&p, 4, "bucket-a/absent.zip", "bucket-b/data.txt").await;

        let err = disk_runner(&p).tick().await.unwrap_err();
        assert!(matches!(err, RunnerError::Storage(_)), "{err}");
        assert_eq!(
            p.store.task(4).unwrap().unwrap().status,
            TaskStatus::Created
        );
    }
}
