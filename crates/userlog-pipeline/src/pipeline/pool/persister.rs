use crate::pipeline::{
    barrier::CompletionBarrier,
    telemetry::{increment_reports_written, record_write_duration},
};
use async_channel::Receiver;
use core::time::Duration;
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;
use userlog_core::{Error, ReportWriter, Result, UserRecord};

/// Everything one persistence worker owns.
pub struct PersistenceWorker {
    pub worker_id: usize,
    pub users: Receiver<UserRecord>,
    pub writer: ReportWriter,
    pub barrier: Arc<CompletionBarrier>,
    pub latency: Duration,
}

/// Worker task writing one report per received [`UserRecord`].
///
/// A job is released on the barrier only after its report has been fully
/// written and synced. Runs until the user queue is closed and drained, and
/// resolves to the number of reports it wrote.
///
/// # Errors
///
/// - [`Error::Persist`] if a report cannot be written. The run is aborted.
/// - [`Error::BarrierUnderflow`] if a release has no matching submission.
/// - [`Error::Cancelled`] if `shutdown` fires while waiting for a record.
pub async fn persistence_loop(
    worker: PersistenceWorker,
    shutdown: CancellationToken,
) -> Result<u64> {
    let PersistenceWorker {
        worker_id,
        users,
        writer,
        barrier,
        latency,
    } = worker;

    tracing::trace!("Persistence worker {worker_id} started");
    let mut persisted = 0_u64;

    loop {
        let user = tokio::select! {
            biased;
            () = shutdown.cancelled() => return Err(Error::Cancelled),
            user = users.recv() => match user {
                Ok(user) => user,
                // Closed and drained.
                Err(_) => break,
            },
        };

        tracing::info!(uid = user.id, "Writing report for UID {}", user.id);
        let started = Instant::now();
        let path = writer.write(&user).await?;
        record_write_duration(started.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(uid = user.id, path = %path.display(), "Report written");

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        barrier.done()?;
        increment_reports_written();
        persisted += 1;
    }

    tracing::trace!(persisted, "Persistence worker {worker_id} drained user queue");
    Ok(persisted)
}
