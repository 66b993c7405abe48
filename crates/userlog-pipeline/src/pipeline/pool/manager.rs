//! Fixed-size pools of asynchronous workers.
//!
//! This module defines the [`WorkerPool`] struct, which spawns a set of
//! workers sharing one input queue and joins them at the end of a run. Each
//! worker resolves to the number of items it processed.
//!
//! A worker that fails or panics cancels the run's shared
//! [`CancellationToken`], so its siblings, the job source and the caller all
//! stop instead of waiting on work that will never complete.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use userlog_core::{Error, Result};

/// Per-pool outcome once every worker has stopped.
#[derive(Debug, Default)]
pub struct PoolReport {
    /// Items processed across all workers that finished cleanly.
    pub processed: u64,
    /// Errors from failed workers, in worker order.
    pub errors: Vec<Error>,
}

/// A pool of spawned workers belonging to one pipeline stage.
pub struct WorkerPool {
    name: &'static str,
    workers: Vec<JoinHandle<Result<u64>>>,
}

impl WorkerPool {
    /// Spawns `size` workers, building each one's future with `make_worker`.
    ///
    /// Every worker runs inside a `<name>_worker` span carrying its index.
    pub fn spawn<F, Fut>(
        name: &'static str,
        size: usize,
        shutdown: &CancellationToken,
        mut make_worker: F,
    ) -> Self
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<u64>> + Send + 'static,
    {
        let workers = (0..size)
            .map(|worker_id| {
                let worker = make_worker(worker_id);
                let shutdown = shutdown.clone();
                let span = tracing::info_span!("worker", pool = name, worker_id);

                tokio::spawn(
                    async move {
                        let result = match AssertUnwindSafe(worker).catch_unwind().await {
                            Ok(result) => result,
                            Err(panic) => Err(Error::WorkerFailed {
                                pool: name,
                                worker_id,
                                context: panic_message(panic.as_ref()),
                            }),
                        };

                        match &result {
                            Ok(processed) => {
                                tracing::trace!(processed, "Worker {worker_id} stopped");
                            }
                            Err(e) if e.is_cancelled() => {
                                tracing::debug!("Worker {worker_id} observed cancellation");
                            }
                            Err(e) => {
                                tracing::error!("Worker {worker_id} failed: {e}");
                                shutdown.cancel();
                            }
                        }
                        result
                    }
                    .instrument(span),
                )
            })
            .collect();

        Self { name, workers }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Waits for every worker to stop and aggregates their outcomes.
    pub async fn join(self) -> PoolReport {
        let name = self.name;
        let results = futures::future::join_all(self.workers).await;

        let mut report = PoolReport::default();
        for (worker_id, result) in results.into_iter().enumerate() {
            match result {
                Ok(Ok(processed)) => report.processed += processed,
                Ok(Err(e)) => report.errors.push(e),
                Err(join_err) => report.errors.push(Error::WorkerFailed {
                    pool: name,
                    worker_id,
                    context: join_err.to_string(),
                }),
            }
        }

        tracing::debug!(
            pool = name,
            processed = report.processed,
            failed = report.errors.len(),
            "Worker pool joined"
        );
        report
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
