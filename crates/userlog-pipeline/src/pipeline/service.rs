//! Orchestration of a single pipeline run.
//!
//! [`Pipeline::run`] wires the stages together:
//!
//! ```text
//! JobSource -> job queue -> generation pool -> user queue -> persistence pool
//!                                                                 |
//!                         caller <- CompletionBarrier <-----------+
//! ```
//!
//! ## Responsibilities
//!
//! - Spawn both worker pools over bounded MPMC queues.
//! - Dispatch every job, then wait for the completion barrier to drain.
//! - On any failure, cancel the run so nothing blocks forever, join every
//!   worker, and surface the root-cause error.

use crate::pipeline::{
    barrier::CompletionBarrier,
    config::PipelineConfig,
    pool::{
        generator::{GenerationWorker, generation_loop},
        manager::WorkerPool,
        persister::{PersistenceWorker, persistence_loop},
    },
    source::JobSource,
    telemetry::increment_run_failures,
};
use core::time::Duration;
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;
use userlog_core::{
    ActivitySynthesizer, Error, Job, ReportWriter, Result, SeededRandom, SystemClock, UserRecord,
};

/// Counts and timing for a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Jobs dispatched by the source.
    pub submitted: u64,
    /// Records produced across the generation pool. A worker stopped by a
    /// shutdown signal after the last report was written does not contribute.
    pub generated: u64,
    /// Reports written across the persistence pool, counted like `generated`.
    pub persisted: u64,
    pub elapsed: Duration,
}

/// A configured two-stage pipeline.
///
/// The pipeline assumes its output directory has already been prepared (see
/// [`userlog_core::prepare_output_dir`]).
pub struct Pipeline {
    config: PipelineConfig,
    shutdown_token: CancellationToken,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Token that aborts an in-progress (or future) run when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs every job to completion.
    ///
    /// Returns once the completion barrier has drained, meaning every job's
    /// report has been written and synced, and every worker has stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] before starting any worker if the
    /// configuration is out of range. Otherwise returns the first root-cause
    /// error observed, for example [`Error::Persist`] naming the job whose
    /// report could not be written, or [`Error::Cancelled`] if the run was
    /// shut down before every report was written.
    #[tracing::instrument(
        name = "run",
        skip_all,
        fields(jobs = self.config.num_jobs, workers = self.config.num_workers)
    )]
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let config = &self.config;
        config.validate()?;
        let run_token = self.shutdown_token.child_token();

        let (job_tx, job_rx) = async_channel::bounded::<Job>(config.queue_capacity);
        let (user_tx, user_rx) = async_channel::bounded::<UserRecord>(config.queue_capacity);
        let barrier = Arc::new(CompletionBarrier::new());
        let writer = ReportWriter::new(&config.output_dir);

        let generators =
            WorkerPool::spawn("generation", config.num_workers, &run_token, |worker_id| {
                let worker = GenerationWorker {
                    worker_id,
                    jobs: job_rx.clone(),
                    users: user_tx.clone(),
                    synthesizer: ActivitySynthesizer::new(
                        config.catalog.clone(),
                        config.max_log_entries,
                        SeededRandom::for_worker(config.seed, worker_id),
                        SystemClock,
                    ),
                    email_domain: config.email_domain.clone(),
                    latency: config.generation_delay,
                };
                generation_loop(worker, run_token.clone())
            });

        let persisters =
            WorkerPool::spawn("persistence", config.num_workers, &run_token, |worker_id| {
                let worker = PersistenceWorker {
                    worker_id,
                    users: user_rx.clone(),
                    writer: writer.clone(),
                    barrier: Arc::clone(&barrier),
                    latency: config.write_delay,
                };
                persistence_loop(worker, run_token.clone())
            });

        // Only workers may hold queue endpoints from here on; the user queue
        // closes when the last generation worker drops its sender.
        drop(job_rx);
        drop(user_tx);
        drop(user_rx);

        tracing::info!(
            generation_workers = generators.len(),
            persistence_workers = persisters.len(),
            "Worker pools started"
        );

        let outcome: Result<u64> = async {
            let submitted = JobSource::new(job_tx, Arc::clone(&barrier))
                .dispatch(config.num_jobs, &run_token)
                .await?;

            tokio::select! {
                biased;
                () = barrier.wait() => Ok(submitted),
                () = run_token.cancelled() => Err(Error::Cancelled),
            }
        }
        .await;

        if outcome.is_err() {
            run_token.cancel();
        }

        let generation = generators.join().await;
        let persistence = persisters.join().await;

        let mut errors = persistence.errors;
        errors.extend(generation.errors);
        let outcome = settle(outcome, errors);

        match outcome {
            Ok(submitted) => {
                let summary = RunSummary {
                    submitted,
                    generated: generation.processed,
                    persisted: persistence.processed,
                    elapsed: start.elapsed(),
                };
                tracing::info!(
                    generated = summary.generated,
                    persisted = summary.persisted,
                    "Run complete in {:.2}s",
                    summary.elapsed.as_secs_f64()
                );
                Ok(summary)
            }
            Err(e) => {
                increment_run_failures();
                tracing::error!(outstanding = barrier.outstanding(), "Run aborted: {e}");
                Err(e)
            }
        }
    }
}

/// Combines the dispatch outcome with the errors collected from both pools.
///
/// Once the barrier has drained every report is on disk, so worker
/// cancellations observed afterwards (a late shutdown signal) do not fail the
/// run. Otherwise the first error that is not a knock-on cancellation wins,
/// falling back to a cancellation if that is all there is.
fn settle(outcome: Result<u64>, errors: Vec<Error>) -> Result<u64> {
    let mut cancelled = None;
    for e in errors {
        if !e.is_cancelled() {
            return Err(e);
        }
        cancelled.get_or_insert(e);
    }

    match (outcome, cancelled) {
        (Ok(submitted), _) => Ok(submitted),
        (Err(e), _) if !e.is_cancelled() => Err(e),
        (Err(e), cancelled) => Err(cancelled.unwrap_or(e)),
    }
}
