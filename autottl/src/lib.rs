//! Adaptive refresh intervals for periodically updated sources
//!
//! Given the timestamps of the most recent items published by a source,
//! this crate estimates how often the source actually publishes and derives
//! a refresh TTL from it, bounded by configured minimum and maximum
//! intervals.
//!
//! # Features
//!
//! - **Robust estimation**: trimmed median of the gaps between timestamps
//! - **Bounded adjustment**: TTLs stay within `[min_interval, max_interval]`
//!   and quiet sources fall back to the maximum
//! - **Burst detection**: hysteresis pins bursting sources to the minimum
//!   interval until they calm down for several windows
//! - **Batch ranking**: list sources most-active first for statistics views
//!
//! # Quick Start
//!
//! ```rust
//! use autottl::{AutoTtl, AutoTtlConfig, MemorySessionStore, MemorySource, SourceId};
//!
//! let source = MemorySource::new();
//! let id = SourceId::new("feed-1");
//! for ts in [1_000, 1_900, 2_800, 3_700] {
//!     source.record(&id, ts);
//! }
//!
//! let auto = AutoTtl::new(
//!     AutoTtlConfig::new().with_intervals(3_600, 300, 86_400),
//!     source,
//!     MemorySessionStore::new(),
//! )?;
//!
//! assert_eq!(auto.adjusted_ttl_at(&id, 4_000)?, 900);
//! # Ok::<(), autottl::AutoTtlError>(())
//! ```
//!
//! # Collaborators
//!
//! Storage stays outside the crate. [`TimestampSource`] supplies timestamp
//! windows, [`FeedCatalog`] lists sources for ranking and [`SessionStore`]
//! keeps burst state between calls. In-memory and file-backed versions are
//! provided for tests and the command-line tool.

pub mod adjuster;
pub mod burst;
pub mod config;
pub mod error;
pub mod estimator;
pub mod humanize;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod ranking;
pub mod session;
pub mod source;

pub use adjuster::TtlAdjuster;
pub use burst::BurstDetector;
pub use config::AutoTtlConfig;
pub use error::{AutoTtlError, Result};
pub use estimator::IntervalEstimator;
pub use humanize::{human_interval, CalendarSpan};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use model::{BurstState, FeedRecord, SourceId, SourceStatus, SourceSummary, TimeField};
pub use orchestrator::{unix_now, AutoTtl};
pub use ranking::{mean_interval, FeedStats};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use source::{EntryTimes, FeedCatalog, Fixture, FixtureFeed, MemorySource, TimestampSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::AutoTtlConfig;
    pub use crate::error::{AutoTtlError, Result};
    pub use crate::model::{SourceId, SourceStatus, TimeField};
    pub use crate::orchestrator::AutoTtl;
    pub use crate::ranking::FeedStats;
    pub use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
    pub use crate::source::{FeedCatalog, MemorySource, TimestampSource};
}
