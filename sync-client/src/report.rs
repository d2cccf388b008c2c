//! Run summary.

use std::fmt;

use sync_types::{FileOutcome, OutcomeStatus};

/// Every outcome produced by one sync run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    outcomes: Vec<FileOutcome>,
}

impl SyncReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome.
    pub fn record(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes.
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Number of files processed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of uploaded files.
    pub fn uploaded(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Uploaded { .. }))
    }

    /// Number of skipped files.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    /// Number of failed files.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed { .. }))
    }

    /// True if any file failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(FileOutcome::is_failure)
    }

    /// Failed outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uploaded, {} skipped, {} failed",
            self.uploaded(),
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use sync_types::{Fingerprint, ObjectKey, UploadReason};

    #[test]
    fn counts_and_summary() {
        let key = |k: &str| ObjectKey::parse(k).unwrap();
        let path = Path::new("/root/x");

        let mut report = SyncReport::new();
        assert!(!report.has_failures());
        report.record(FileOutcome::skipped(key("a"), path));
        report.record(FileOutcome::uploaded(
            key("b"),
            path,
            UploadReason::New,
            Fingerprint::empty_object(),
        ));
        report.record(FileOutcome::failed(Some(key("c")), path, "boom"));

        assert_eq!(report.total(), 3);
        assert_eq!(report.uploaded(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.to_string(), "1 uploaded, 1 skipped, 1 failed");
    }
}
