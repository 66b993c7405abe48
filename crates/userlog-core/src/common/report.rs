//! Plain-text activity reports.
//!
//! A report is a header line carrying the user's id and email, the
//! `Activity Log:` marker, then one 0-based numbered line per log entry:
//!
//! ```text
//! UID: 2; Email: user2@company.com;
//! Activity Log:
//! 0. [logged in] at 2026-10-19T08:30:00Z
//! 1. [created record] at 2026-10-19T08:30:00Z
//! ```

use crate::common::types::{Job, UserRecord};
use chrono::SecondsFormat;
use core::fmt::Write;

/// Returns the file name that holds the report for `id`.
pub fn report_file_name(id: Job) -> String {
    format!("uid{id}.txt")
}

impl UserRecord {
    /// Renders the activity report for this user.
    ///
    /// Rendering is pure: the same record always yields byte-identical text.
    pub fn activity_report(&self) -> String {
        // Header, marker and roughly 48 bytes per entry line.
        let mut out = String::with_capacity(64 + self.logs.len() * 48);
        // Writing into a `String` cannot fail.
        let _ = write!(out, "UID: {}; Email: {};\nActivity Log:\n", self.id, self.email);
        for (index, entry) in self.logs.iter().enumerate() {
            let _ = writeln!(
                out,
                "{index}. [{}] at {}",
                entry.action,
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::{LogEntry, UserRecord};
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_790_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn empty_log_renders_header_and_marker_only() {
        let user = UserRecord::new(3, "company.com", Vec::new());
        assert_eq!(
            user.activity_report(),
            "UID: 3; Email: user3@company.com;\nActivity Log:\n"
        );
    }

    #[test]
    fn entries_are_numbered_from_zero_in_insertion_order() {
        let user = UserRecord::new(
            7,
            "company.com",
            vec![
                LogEntry::new("logged in", at(0)),
                LogEntry::new("updated account", at(1)),
            ],
        );
        let report = user.activity_report();
        let lines: Vec<_> = report.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "UID: 7; Email: user7@company.com;");
        assert_eq!(lines[1], "Activity Log:");
        assert_eq!(lines[2], "0. [logged in] at 2026-09-21T14:13:20Z");
        assert_eq!(lines[3], "1. [updated account] at 2026-09-21T14:13:21Z");
        assert!(report.ends_with('\n'));
    }

    #[test]
    fn rendering_is_idempotent() {
        let user = UserRecord::new(
            1,
            "example.org",
            (0..50)
                .map(|i| LogEntry::new("deleted record", at(i)))
                .collect(),
        );
        assert_eq!(user.activity_report(), user.activity_report());
    }

    #[test]
    fn report_file_name_is_derived_from_id() {
        assert_eq!(super::report_file_name(0), "uid0.txt");
        assert_eq!(super::report_file_name(42), "uid42.txt");
    }
}
