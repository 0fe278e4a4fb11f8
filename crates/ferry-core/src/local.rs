//! Records persisted on the device, never sent to the server as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A check-in that could not reach the server and waits for a flush.
///
/// Serialized with camelCase keys so queues written by earlier app builds
/// stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCheckIn {
    pub verification_code: String,
    #[serde(default)]
    pub retry_count: u32,
}

impl PendingCheckIn {
    #[must_use]
    pub fn new(verification_code: impl Into<String>) -> Self {
        Self {
            verification_code: verification_code.into(),
            retry_count: 0,
        }
    }
}

/// Number of successful check-ins on a given UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub count: u32,
    pub date: NaiveDate,
}

impl DailyCount {
    /// The count as seen on `today`: a record from another day reads as zero.
    #[must_use]
    pub fn count_on(&self, today: NaiveDate) -> u32 {
        if self.date == today { self.count } else { 0 }
    }

    /// Increment for `today`, resetting first if the record is stale.
    #[must_use]
    pub fn incremented_on(self, today: NaiveDate) -> Self {
        let base = if self.date == today { self.count } else { 0 };
        Self {
            count: base + 1,
            date: today,
        }
    }
}

/// Outcome of replaying the offline queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    pub succeeded: u32,
    /// Entries dropped after reaching the retry ceiling.
    pub failed: u32,
}
