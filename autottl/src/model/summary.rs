//! Catalog rows and ranked source summaries

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SourceId;

/// A source as listed by the feed catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub id: SourceId,
    pub name: String,
    /// Unix seconds of the last successful poll
    #[serde(default)]
    pub last_update: i64,
    /// Explicit TTL in seconds; 0 means the TTL is managed automatically
    #[serde(default)]
    pub ttl: i64,
}

impl FeedRecord {
    pub fn is_auto_ttl(&self) -> bool {
        self.ttl == 0
    }
}

/// One row of the batch ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub id: SourceId,
    pub name: String,
    pub last_update: i64,
    pub ttl: i64,
    /// Cheap mean inter-arrival estimate: `(max - min) / count`
    pub avg_ttl: i64,
    /// Newest timestamp in the window, `None` when the source has no entries
    pub date_max: Option<i64>,
}

impl SourceSummary {
    /// Whether the newest entry is within twice the maximum interval of `now`
    pub fn is_active(&self, now: i64, max_interval: i64) -> bool {
        crate::adjuster::is_recent(self.date_max, now, max_interval)
    }
}

/// Display status of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    /// Flooding with new items; polled at the minimum interval
    Burst,
    /// Produced an entry within twice the maximum interval
    Active,
    /// Quiet for longer than twice the maximum interval
    Idle,
}

impl SourceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceStatus::Burst => "burst",
            SourceStatus::Active => "active",
            SourceStatus::Idle => "idle",
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
