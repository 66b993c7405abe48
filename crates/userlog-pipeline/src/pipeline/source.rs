use crate::pipeline::{barrier::CompletionBarrier, telemetry::increment_jobs_submitted};
use async_channel::Sender;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use userlog_core::{Error, Job, Result};

/// Feeds job ids into the job queue.
///
/// The source owns the only sender of the job queue; consuming it in
/// [`JobSource::dispatch`] closes the queue once the last job is enqueued.
pub struct JobSource {
    jobs: Sender<Job>,
    barrier: Arc<CompletionBarrier>,
}

impl JobSource {
    pub const fn new(jobs: Sender<Job>, barrier: Arc<CompletionBarrier>) -> Self {
        Self { jobs, barrier }
    }

    /// Enqueues jobs `0..count` in increasing order.
    ///
    /// Each job is registered with the barrier before it is enqueued, so the
    /// barrier cannot drain while a submitted job is still in flight. Enqueue
    /// waits while the queue is full.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `shutdown` fires while dispatching.
    /// - [`Error::ChannelError`] if every generation worker has gone away.
    pub async fn dispatch(self, count: u64, shutdown: &CancellationToken) -> Result<u64> {
        for job in 0..count {
            self.barrier.add(1);

            tokio::select! {
                biased;
                () = shutdown.cancelled() => return Err(Error::Cancelled),
                sent = self.jobs.send(job) => {
                    if sent.is_err() {
                        return Err(Error::ChannelError {
                            context: format!("Job queue closed before job {job} was submitted"),
                        });
                    }
                }
            }

            increment_jobs_submitted();
            tracing::trace!(job, "Job submitted");
        }

        tracing::debug!(count, "All jobs submitted, closing job queue");
        Ok(count)
    }
}
