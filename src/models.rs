use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ENTRY_MODE;

/// Archive metadata for one regular entry.
///
/// `size` is always the length of the buffered content, never a size reported
/// by the filesystem.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    pub path: String,
    pub size: u64,
    pub mode: u32,
    pub mtime: u64,
}

impl EntryHeader {
    /// Header for generated content: default mode, modified now.
    pub fn new(path: &str, size: u64) -> Self {
        Self {
            path: path.to_string(),
            size,
            mode: DEFAULT_ENTRY_MODE,
            mtime: unix_now(),
        }
    }
}

/// Seconds since the epoch, clamped to zero for clocks set before 1970.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
