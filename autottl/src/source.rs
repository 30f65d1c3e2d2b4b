//! Collaborators that supply observations and catalog rows
//!
//! The estimator never talks to storage directly. It consumes plain,
//! newest-first timestamp windows through [`TimestampSource`] and catalog
//! rows through [`FeedCatalog`]. [`MemorySource`] implements both over
//! in-process data, loadable from a JSON fixture.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{FeedRecord, SourceId, TimeField};

/// Supplies the most recent observation timestamps of a source
pub trait TimestampSource: Send + Sync {
    /// Up to `limit` timestamps (Unix seconds) for `source_id`, newest first
    fn fetch_recent_timestamps(
        &self,
        source_id: &SourceId,
        field: TimeField,
        limit: usize,
    ) -> Result<Vec<i64>>;
}

/// Lists the sources known to the polling system
pub trait FeedCatalog: Send + Sync {
    fn feeds(&self) -> Result<Vec<FeedRecord>>;
}

impl<T: TimestampSource + ?Sized> TimestampSource for Arc<T> {
    fn fetch_recent_timestamps(
        &self,
        source_id: &SourceId,
        field: TimeField,
        limit: usize,
    ) -> Result<Vec<i64>> {
        (**self).fetch_recent_timestamps(source_id, field, limit)
    }
}

impl<T: FeedCatalog + ?Sized> FeedCatalog for Arc<T> {
    fn feeds(&self) -> Result<Vec<FeedRecord>> {
        (**self).feeds()
    }
}

/// One observed entry carrying both timestamp semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTimes {
    /// Date declared by the source
    pub date: i64,
    /// When the poller first saw the entry
    #[serde(rename = "lastSeen")]
    pub last_seen: i64,
}

impl EntryTimes {
    pub fn get(&self, field: TimeField) -> i64 {
        match field {
            TimeField::DeclaredAt => self.date,
            TimeField::ObservedAt => self.last_seen,
        }
    }
}

/// A feed and its entries as written in a fixture file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureFeed {
    #[serde(flatten)]
    pub record: FeedRecord,
    #[serde(default)]
    pub entries: Vec<EntryTimes>,
}

/// Top-level fixture document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub feeds: Vec<FixtureFeed>,
}

/// In-memory timestamp source and feed catalog
///
/// Feeds keep catalog order; entries may be recorded in any order.
#[derive(Debug, Default)]
pub struct MemorySource {
    feeds: RwLock<Vec<FeedRecord>>,
    entries: RwLock<HashMap<SourceId, Vec<EntryTimes>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from a parsed fixture
    pub fn from_fixture(fixture: Fixture) -> Self {
        let source = Self::new();
        for feed in fixture.feeds {
            let id = feed.record.id.clone();
            source.add_feed(feed.record);
            for entry in feed.entries {
                source.record_entry(&id, entry);
            }
        }
        source
    }

    /// Parse a JSON fixture document
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Load a JSON fixture from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add a feed to the catalog, replacing any feed with the same id
    pub fn add_feed(&self, record: FeedRecord) {
        let mut feeds = self.feeds.write();
        match feeds.iter_mut().find(|f| f.id == record.id) {
            Some(existing) => *existing = record,
            None => feeds.push(record),
        }
    }

    pub fn record_entry(&self, source_id: &SourceId, entry: EntryTimes) {
        self.entries
            .write()
            .entry(source_id.clone())
            .or_default()
            .push(entry);
    }

    /// Record an entry whose declared and observed times are equal
    pub fn record(&self, source_id: &SourceId, timestamp: i64) {
        self.record_entry(
            source_id,
            EntryTimes {
                date: timestamp,
                last_seen: timestamp,
            },
        );
    }

    pub fn entry_count(&self, source_id: &SourceId) -> usize {
        self.entries
            .read()
            .get(source_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl TimestampSource for MemorySource {
    fn fetch_recent_timestamps(
        &self,
        source_id: &SourceId,
        field: TimeField,
        limit: usize,
    ) -> Result<Vec<i64>> {
        let entries = self.entries.read();
        let mut timestamps: Vec<i64> = entries
            .get(source_id)
            .map(|list| list.iter().map(|e| e.get(field)).collect())
            .unwrap_or_default();

        timestamps.sort_unstable_by(|a, b| b.cmp(a));
        timestamps.truncate(limit);
        Ok(timestamps)
    }
}

impl FeedCatalog for MemorySource {
    fn feeds(&self) -> Result<Vec<FeedRecord>> {
        Ok(self.feeds.read().clone())
    }
}
