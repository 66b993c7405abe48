//! Error types for the userlog pipeline.
//!
//! This module defines the central `Error` enum shared by storage preparation,
//! the worker pools and the completion barrier. Every variant is fatal to a
//! run; there is no retry path.
//!
//! ## Error Cases
//! - `Storage`: the output directory could not be created or cleared.
//! - `Persist`: a report file could not be created, written or synced.
//! - `InvalidConfig`: a run parameter is out of range.
//! - `InvalidCatalog`: the action catalog cannot be sampled from.
//! - `ChannelError`: a pipeline queue closed while work was still in flight.
//! - `BarrierUnderflow`: more completions were signalled than jobs submitted.
//! - `WorkerFailed`: a worker task panicked or could not be joined.
//! - `Cancelled`: the run was stopped before every job completed.

use crate::common::types::Job;
use std::{io, path::PathBuf};

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the userlog pipeline.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Preparing the output directory failed before any work started.
    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the report for a single job failed.
    #[error("Failed to persist report for UID {id} to {}: {source}", .path.display())]
    Persist {
        id: Job,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A run parameter is out of range. Checked before any worker starts.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The configured action catalog is unusable.
    #[error("Invalid action catalog: {reason}")]
    InvalidCatalog { reason: String },

    /// A pipeline queue was closed underneath a producer or consumer.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The completion barrier was released more times than work was added.
    #[error("Completion barrier released more jobs than were submitted")]
    BarrierUnderflow,

    /// A worker task panicked or was aborted.
    #[error("{pool} worker {worker_id} failed: {context}")]
    WorkerFailed {
        pool: &'static str,
        worker_id: usize,
        context: String,
    },

    /// The run was cancelled by a shutdown signal or a failing worker.
    #[error("Pipeline run was cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `true` for errors that are a consequence of another failure
    /// rather than a root cause.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
