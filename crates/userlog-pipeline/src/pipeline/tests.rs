use crate::pipeline::{
    config::PipelineConfig,
    service::{Pipeline, RunSummary},
};
use core::time::Duration;
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;
use tokio::time::timeout;
use userlog_core::{
    ActionCatalog, DEFAULT_EMAIL_DOMAIN, Error, LOG_ENTRY_LIMIT, prepare_output_dir,
};

// Generous upper bound so a wedged pipeline fails the test instead of hanging.
const RUN_TIMEOUT: Duration = Duration::from_secs(30);

fn immediate_config(output_dir: &Path, num_jobs: u64, num_workers: usize) -> PipelineConfig {
    PipelineConfig {
        num_jobs,
        num_workers,
        queue_capacity: num_workers,
        output_dir: output_dir.to_path_buf(),
        generation_delay: Duration::ZERO,
        write_delay: Duration::ZERO,
        max_log_entries: 25,
        email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
        catalog: ActionCatalog::default(),
        seed: Some(11),
    }
}

async fn run(config: PipelineConfig) -> userlog_core::Result<RunSummary> {
    prepare_output_dir(&config.output_dir).await?;
    timeout(RUN_TIMEOUT, Pipeline::new(config).run())
        .await
        .expect("pipeline run timed out")
}

fn report_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect()
}

/// Checks header, marker and numbering of one report; returns its entry count.
fn check_report(dir: &Path, id: u64, catalog: &ActionCatalog) -> usize {
    let text = std::fs::read_to_string(dir.join(format!("uid{id}.txt"))).unwrap();
    assert!(text.ends_with('\n'), "uid{id}.txt is truncated");

    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some(format!("UID: {id}; Email: user{id}@company.com;").as_str())
    );
    assert_eq!(lines.next(), Some("Activity Log:"));

    let mut entries = 0;
    for (index, line) in lines.enumerate() {
        let rest = line
            .strip_prefix(&format!("{index}. ["))
            .unwrap_or_else(|| panic!("uid{id}.txt line {index} is misnumbered: {line}"));
        let (action, stamp) = rest.split_once("] at ").unwrap();
        assert!(catalog.contains(action), "unknown action {action}");
        assert!(stamp.ends_with('Z') && stamp.contains('T'), "bad timestamp {stamp}");
        entries += 1;
    }
    entries
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn five_jobs_two_workers_write_every_report() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("users");
    let config = immediate_config(&dir, 5, 2);
    let catalog = config.catalog.clone();

    let summary = run(config).await.unwrap();

    assert_eq!(summary.submitted, 5);
    assert_eq!(summary.generated, 5);
    assert_eq!(summary.persisted, 5);
    assert_eq!(
        report_names(&dir),
        (0..5)
            .map(|i| format!("uid{i}.txt"))
            .collect::<BTreeSet<_>>()
    );
    for id in 0..5 {
        assert!(check_report(&dir, id, &catalog) <= 25);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_job_is_processed_once_for_any_pool_size() {
    for (num_jobs, num_workers) in [(1, 1), (40, 1), (40, 3), (3, 16), (250, 8)] {
        let temp_dir = TempDir::new().unwrap();
        let mut config = immediate_config(temp_dir.path(), num_jobs, num_workers);
        config.queue_capacity = 2;
        let catalog = config.catalog.clone();

        let summary = run(config).await.unwrap();

        assert_eq!(summary.generated, num_jobs, "K = {num_workers}");
        assert_eq!(summary.persisted, num_jobs, "K = {num_workers}");
        let names = report_names(temp_dir.path());
        assert_eq!(names.len() as u64, num_jobs);
        for id in 0..num_jobs {
            check_report(temp_dir.path(), id, &catalog);
        }
    }
}

#[tokio::test]
async fn zero_jobs_completes_immediately() {
    let temp_dir = TempDir::new().unwrap();
    let summary = run(immediate_config(temp_dir.path(), 0, 4)).await.unwrap();

    assert_eq!(summary.submitted, 0);
    assert_eq!(summary.persisted, 0);
    assert!(report_names(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn empty_logs_render_header_only() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = immediate_config(temp_dir.path(), 3, 2);
    config.max_log_entries = 0;

    run(config).await.unwrap();

    for id in 0..3 {
        let text = std::fs::read_to_string(temp_dir.path().join(format!("uid{id}.txt"))).unwrap();
        assert_eq!(
            text,
            format!("UID: {id}; Email: user{id}@company.com;\nActivity Log:\n")
        );
    }
}

#[tokio::test]
async fn custom_domain_and_actions_flow_into_reports() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = immediate_config(temp_dir.path(), 4, 2);
    config.email_domain = "example.org".to_string();
    config.catalog = ActionCatalog::new(["exported report"]).unwrap();
    config.max_log_entries = 3;

    run(config).await.unwrap();

    for id in 0..4 {
        let text = std::fs::read_to_string(temp_dir.path().join(format!("uid{id}.txt"))).unwrap();
        assert!(text.starts_with(&format!("UID: {id}; Email: user{id}@example.org;\n")));
        assert!(
            text.lines()
                .skip(2)
                .all(|line| line.contains("[exported report]"))
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simulated_latency_bounds_elapsed_time() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = immediate_config(temp_dir.path(), 4, 2);
    config.generation_delay = Duration::from_millis(20);
    config.write_delay = Duration::from_millis(20);

    let summary = run(config).await.unwrap();

    // Every job passes through one generation delay and one write delay.
    assert!(summary.elapsed >= Duration::from_millis(40));
    assert_eq!(report_names(temp_dir.path()).len(), 4);
}

#[tokio::test]
async fn oversized_log_length_is_rejected_before_any_work() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = immediate_config(temp_dir.path(), 1, 1);
    config.max_log_entries = 1 << 40;

    let err = run(config).await.unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidConfig { ref reason } if reason.contains("MAX_LOG_ENTRIES")
    ));
    assert!(report_names(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn largest_log_length_runs() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = immediate_config(temp_dir.path(), 2, 2);
    config.max_log_entries = LOG_ENTRY_LIMIT;
    let catalog = config.catalog.clone();

    run(config).await.unwrap();

    for id in 0..2 {
        assert!(check_report(temp_dir.path(), id, &catalog) <= LOG_ENTRY_LIMIT);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn write_failure_aborts_run_with_failing_job() {
    let temp_dir = TempDir::new().unwrap();
    let config = immediate_config(&temp_dir.path().join("never-created"), 50, 4);

    // Skip preparation so every write hits a missing directory.
    let err = timeout(RUN_TIMEOUT, Pipeline::new(config).run())
        .await
        .expect("failed run must not hang")
        .unwrap_err();

    match err {
        Error::Persist { id, path, .. } => {
            assert!(id < 50);
            assert!(path.ends_with(format!("uid{id}.txt")));
        }
        other => panic!("expected a persistence failure, got {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn write_failure_with_backpressure_does_not_hang() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = immediate_config(&temp_dir.path().join("never-created"), 500, 2);
    config.queue_capacity = 1;

    let err = timeout(RUN_TIMEOUT, Pipeline::new(config).run())
        .await
        .expect("failed run must not hang")
        .unwrap_err();
    assert!(matches!(err, Error::Persist { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_cancels_in_flight_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = immediate_config(temp_dir.path(), 1_000, 2);
    config.write_delay = Duration::from_millis(50);
    prepare_output_dir(temp_dir.path()).await.unwrap();

    let pipeline = Pipeline::new(config);
    let token = pipeline.shutdown_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let err = timeout(RUN_TIMEOUT, pipeline.run())
        .await
        .expect("cancelled run must not hang")
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(report_names(temp_dir.path()).len() < 1_000);
}

#[tokio::test]
async fn cancelled_before_start_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    prepare_output_dir(temp_dir.path()).await.unwrap();
    let pipeline = Pipeline::new(immediate_config(temp_dir.path(), 10, 2));
    pipeline.shutdown_token().cancel();

    let err = timeout(RUN_TIMEOUT, pipeline.run())
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(report_names(temp_dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rerun_after_prepare_replaces_previous_output() {
    let temp_dir = TempDir::new().unwrap();
    run(immediate_config(temp_dir.path(), 6, 3)).await.unwrap();
    run(immediate_config(temp_dir.path(), 2, 3)).await.unwrap();

    assert_eq!(
        report_names(temp_dir.path()),
        BTreeSet::from(["uid0.txt", "uid1.txt"].map(String::from))
    );
}
