//! Types shared by every pipeline stage.
//!
//! - [`types`] - jobs, log entries and user records.
//! - [`error`] - the crate-wide [`Error`] and [`Result`].
//! - [`report`] - rendering a [`UserRecord`] into its activity report.

pub mod error;
pub mod report;
pub mod types;

pub use error::{Error, Result};
pub use report::report_file_name;
pub use types::{DEFAULT_EMAIL_DOMAIN, Job, LogEntry, UserRecord, email_for};
