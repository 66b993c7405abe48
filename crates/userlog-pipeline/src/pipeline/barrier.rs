//! Completion tracking for a pipeline run.
//!
//! [`CompletionBarrier`] counts jobs that have been submitted but not yet
//! persisted. The job source adds one unit before each enqueue, persistence
//! workers release one unit after each successful write, and the caller waits
//! for the count to reach zero.

use core::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use userlog_core::{Error, Result};

#[derive(Debug, Default)]
pub struct CompletionBarrier {
    outstanding: AtomicUsize,
    notify: Notify,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `n` units of outstanding work.
    pub fn add(&self, n: usize) {
        self.outstanding.fetch_add(n, Ordering::AcqRel);
    }

    /// Releases one unit of completed work, waking waiters when the count
    /// reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BarrierUnderflow`] if no work is outstanding; the
    /// count is left untouched.
    pub fn done(&self) -> Result<()> {
        let previous = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| Error::BarrierUnderflow)?;

        if previous == 1 {
            self.notify.notify_waiters();
        }
        Ok(())
    }

    /// Number of jobs submitted but not yet persisted.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Waits until no work is outstanding.
    ///
    /// Resolves immediately if the count is already zero. Callers should only
    /// wait after every job has been registered.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a release between the load and the
            // await is not missed.
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}
