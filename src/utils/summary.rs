use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::collectors::failure_tracker::SkippedItem;

/// One entry that made it into the archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CollectedEntry {
    pub name: String,
    pub size: u64,
    pub sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Create a JSON summary of the snapshot.
///
/// The summary is written as the last regular entry of the archive and lists
/// everything that was collected, with digests, and everything that was
/// skipped, with the reason.
///
/// # Example Output
///
/// ```json
/// {
///   "collection_id": "550e8400-e29b-41d4-a716-446655440000",
///   "hostname": "node-01",
///   "collection_time": "2024-01-15T14:30:52Z",
///   "collector_version": "0.1.0",
///   "danger": false,
///   "entry_count": 42,
///   "entries": [...],
///   "skipped": [...]
/// }
/// ```
pub fn create_collection_summary(
    hostname: &str,
    timestamp: &str,
    danger: bool,
    entries: &[CollectedEntry],
    skipped: &[SkippedItem],
) -> Result<String> {
    let summary = json!({
        "collection_id": Uuid::new_v4().to_string(),
        "hostname": hostname,
        "collection_time": timestamp,
        "os_version": std::env::consts::OS,
        "collector_version": env!("CARGO_PKG_VERSION"),
        "danger": danger,
        "entry_count": entries.len(),
        "entries": entries,
        "skipped_count": skipped.len(),
        "skipped": skipped,
    });

    serde_json::to_string_pretty(&summary).context("Failed to serialize collection summary to JSON")
}
