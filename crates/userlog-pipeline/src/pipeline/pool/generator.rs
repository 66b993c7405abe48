use crate::pipeline::telemetry::{increment_users_generated, record_log_entries};
use async_channel::{Receiver, Sender};
use core::time::Duration;
use tokio_util::sync::CancellationToken;
use userlog_core::{ActivitySynthesizer, Error, Job, RandSource, Result, TimeSource, UserRecord};

/// Everything one generation worker owns.
///
/// The synthesizer, and with it the random source, belongs to this worker
/// alone. The `users` sender is this worker's share of the user queue: the
/// queue closes once every generation worker has dropped its sender.
pub struct GenerationWorker<R, T> {
    pub worker_id: usize,
    pub jobs: Receiver<Job>,
    pub users: Sender<UserRecord>,
    pub synthesizer: ActivitySynthesizer<R, T>,
    pub email_domain: String,
    pub latency: Duration,
}

/// Worker task turning job ids into [`UserRecord`]s.
///
/// Runs until the job queue is closed and drained, then drops its user queue
/// sender. Resolves to the number of records it produced.
///
/// # Errors
///
/// - [`Error::Cancelled`] if `shutdown` fires while work may still arrive or
///   while handing off a record.
/// - [`Error::ChannelError`] if the user queue has no consumers left.
pub async fn generation_loop<R, T>(
    worker: GenerationWorker<R, T>,
    shutdown: CancellationToken,
) -> Result<u64>
where
    R: RandSource,
    T: TimeSource,
{
    let GenerationWorker {
        worker_id,
        jobs,
        users,
        mut synthesizer,
        email_domain,
        latency,
    } = worker;

    tracing::trace!("Generation worker {worker_id} started");
    let mut generated = 0_u64;

    loop {
        let job = tokio::select! {
            biased;
            // A fully dispatched and drained queue means this worker is done.
            () = shutdown.cancelled(), if !(jobs.is_closed() && jobs.is_empty()) => {
                return Err(Error::Cancelled);
            }
            job = jobs.recv() => match job {
                Ok(job) => job,
                // Closed and drained.
                Err(_) => break,
            },
        };

        let count = synthesizer.entry_count();
        let user = UserRecord::new(job, &email_domain, synthesizer.logs(count));
        record_log_entries(count as f64);
        tracing::info!(uid = job, entries = count, "Generated user {job}");

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        tokio::select! {
            biased;
            () = shutdown.cancelled() => return Err(Error::Cancelled),
            sent = users.send(user) => {
                if sent.is_err() {
                    return Err(Error::ChannelError {
                        context: format!("User queue closed before UID {job} was handed off"),
                    });
                }
            }
        }

        increment_users_generated();
        generated += 1;
    }

    tracing::trace!(generated, "Generation worker {worker_id} drained job queue");
    Ok(generated)
}
