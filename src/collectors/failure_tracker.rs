//! Skipped-item tracking and reporting
//!
//! Every collectible or discovery producer that fails is recorded here so the
//! run can end with one summary of what is missing from the archive, plus a
//! hint about elevated privileges when the failures look permission related.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::CollectError;

/// One item that did not make it into the archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub name: String,
    pub reason: String,
    #[serde(default)]
    pub permission_denied: bool,
}

/// Tracks items that were skipped during a run
#[derive(Debug, Clone, Default)]
pub struct FailureTracker {
    skipped: Vec<SkippedItem>,
}

impl FailureTracker {
    /// Create a new failure tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed item
    pub fn record(&mut self, name: &str, error: &CollectError) {
        self.skipped.push(SkippedItem {
            name: name.to_string(),
            reason: error.to_string(),
            permission_denied: error.is_permission_denied(),
        });
    }

    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }

    pub fn failure_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn permission_failure_count(&self) -> usize {
        self.skipped.iter().filter(|s| s.permission_denied).count()
    }

    /// Check if we should suggest running with elevated privileges
    pub fn should_suggest_elevation(&self) -> bool {
        self.permission_failure_count() > 0
    }

    pub fn into_skipped(self) -> Vec<SkippedItem> {
        self.skipped
    }

    /// Report skipped items and provide guidance
    pub fn report_failures(&self) {
        if self.skipped.is_empty() {
            return;
        }

        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        warn!("Skipped Items Summary");
        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        warn!("");
        warn!(
            "The following {} item(s) could not be collected:",
            self.skipped.len()
        );
        warn!("");

        for item in &self.skipped {
            warn!("  • {}: {}", item.name, item.reason);
        }

        if self.should_suggest_elevation() {
            warn!("");
            warn!(
                "{} of them failed with permission errors. Try running with sudo: sudo {}",
                self.permission_failure_count(),
                std::env::args().collect::<Vec<_>>().join(" ")
            );
        }

        warn!("");
        warn!("Note: Collection continued for accessible items.");
        warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_failure_tracker() {
        let mut tracker = FailureTracker::new();

        // Initially no failures
        assert_eq!(tracker.failure_count(), 0);
        assert!(!tracker.should_suggest_elevation());

        tracker.record("/commands/nonexistent", &CollectError::NotFound {
            program: "nonexistent".to_string(),
        });
        assert_eq!(tracker.failure_count(), 1);
        assert!(!tracker.should_suggest_elevation());

        tracker.record("/etc/shadow", &CollectError::Open {
            path: PathBuf::from("/etc/shadow"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        assert_eq!(tracker.failure_count(), 2);
        assert_eq!(tracker.permission_failure_count(), 1);
        assert!(tracker.should_suggest_elevation());

        // Reporting must not panic
        tracker.report_failures();

        let skipped = tracker.into_skipped();
        assert_eq!(skipped[0].name, "/commands/nonexistent");
        assert!(skipped[0].reason.contains("nonexistent"));
        assert!(skipped[1].permission_denied);
    }

    #[test]
    fn test_empty_report_is_silent() {
        FailureTracker::new().report_failures();
    }
}
