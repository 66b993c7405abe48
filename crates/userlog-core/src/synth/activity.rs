use crate::{Error, LogEntry, RandSource, Result, TimeSource};
use std::sync::Arc;

/// Actions used when no catalog is configured.
pub const DEFAULT_ACTIONS: [&str; 5] = [
    "logged in",
    "logged out",
    "created record",
    "deleted record",
    "updated account",
];

/// Largest accepted per-user log length.
///
/// A full log is rendered and held in memory by one worker at a time, so this
/// bounds the memory of a single record to a few megabytes.
pub const LOG_ENTRY_LIMIT: usize = 100_000;

/// The fixed set of action strings a log entry may carry.
///
/// Cloning is cheap; all workers of a run share the same backing slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionCatalog {
    actions: Arc<[String]>,
}

impl ActionCatalog {
    /// Builds a catalog from the given actions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCatalog`] if the catalog is empty or contains a
    /// blank action.
    pub fn new<I, S>(actions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let actions: Arc<[String]> = actions.into_iter().map(Into::into).collect();
        if actions.is_empty() {
            return Err(Error::InvalidCatalog {
                reason: "at least one action is required".to_string(),
            });
        }
        if let Some(pos) = actions.iter().position(|a| a.trim().is_empty()) {
            return Err(Error::InvalidCatalog {
                reason: format!("action at position {pos} is blank"),
            });
        }
        Ok(Self { actions })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// Picks an action uniformly from the whole catalog.
    fn pick<R: RandSource>(&self, rand: &mut R) -> &str {
        &self.actions[rand.below(self.actions.len())]
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self {
            actions: DEFAULT_ACTIONS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Produces randomized activity logs.
///
/// The only state touched is the owned [`RandSource`], so one synthesizer per
/// worker gives each worker an independent stream of content.
#[derive(Clone, Debug)]
pub struct ActivitySynthesizer<R, T> {
    catalog: ActionCatalog,
    max_entries: usize,
    rand: R,
    time: T,
}

impl<R, T> ActivitySynthesizer<R, T>
where
    R: RandSource,
    T: TimeSource,
{
    /// Creates a synthesizer whose logs hold between `0` and `max_entries`
    /// entries (inclusive).
    pub fn new(catalog: ActionCatalog, max_entries: usize, rand: R, time: T) -> Self {
        Self {
            catalog,
            max_entries,
            rand,
            time,
        }
    }

    /// Draws the log length for the next user, uniformly in
    /// `0..=max_entries`.
    pub fn entry_count(&mut self) -> usize {
        self.rand.below(self.max_entries.saturating_add(1))
    }

    /// Generates `count` log entries stamped with the current time.
    ///
    /// Timestamps never decrease within the returned log, even if the
    /// underlying clock steps backwards.
    pub fn logs(&mut self, count: usize) -> Vec<LogEntry> {
        let mut logs: Vec<LogEntry> = Vec::with_capacity(count.min(LOG_ENTRY_LIMIT));
        for _ in 0..count {
            let now = self.time.now();
            let timestamp = match logs.last() {
                Some(prev) if prev.timestamp > now => prev.timestamp,
                _ => now,
            };
            let action = self.catalog.pick(&mut self.rand).to_string();
            logs.push(LogEntry { action, timestamp });
        }
        logs
    }
}
