use chrono::{DateTime, Utc};

/// Identifier of one unit of work. Jobs are dense over `0..N` and each one
/// becomes exactly one [`UserRecord`].
pub type Job = u64;

/// Default domain used when deriving user emails.
pub const DEFAULT_EMAIL_DOMAIN: &str = "company.com";

/// A single timestamped action in a user's activity log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(action: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            action: action.into(),
            timestamp,
        }
    }
}

/// A fully synthesized user, ready to be persisted.
///
/// Built once by a generation worker and consumed once by a persistence
/// worker. `logs` is kept in insertion order, which is also chronological.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Job,
    pub email: String,
    pub logs: Vec<LogEntry>,
}

impl UserRecord {
    /// Creates a record for `id`, deriving its email from `email_domain`.
    pub fn new(id: Job, email_domain: &str, logs: Vec<LogEntry>) -> Self {
        Self {
            id,
            email: email_for(id, email_domain),
            logs,
        }
    }
}

/// Derives the deterministic email address for a job.
///
/// ```
/// assert_eq!(userlog_core::email_for(4, "company.com"), "user4@company.com");
/// ```
pub fn email_for(id: Job, domain: &str) -> String {
    format!("user{id}@{domain}")
}
