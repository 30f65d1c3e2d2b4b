//! Per-source adjusted TTL
//!
//! [`AutoTtl`] ties the pieces together for one source:
//!
//! ```text
//! fetch window ──▶ IntervalEstimator ──▶ TtlAdjuster ──┐
//!      │                                               ├──▶ adjusted TTL
//!      └──▶ BurstDetector ──▶ SessionStore ───(burst)──┘    (burst forces min)
//! ```

use tracing::debug;

use crate::adjuster::TtlAdjuster;
use crate::burst::BurstDetector;
use crate::config::AutoTtlConfig;
use crate::error::Result;
use crate::estimator::IntervalEstimator;
use crate::model::{SourceId, SourceStatus, SourceSummary};
use crate::session::SessionStore;
use crate::source::TimestampSource;

/// Current wall-clock time in Unix seconds
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Adaptive TTL service for a set of sources
///
/// # Example
///
/// ```rust
/// use autottl::{AutoTtl, AutoTtlConfig, MemorySessionStore, MemorySource, SourceId};
///
/// let source = MemorySource::new();
/// let id = SourceId::new("feed-1");
/// for ts in [1_000, 1_600, 2_200, 2_800] {
///     source.record(&id, ts);
/// }
///
/// let config = AutoTtlConfig::new().with_intervals(3_600, 60, 86_400);
/// let auto = AutoTtl::new(config, source, MemorySessionStore::new()).unwrap();
///
/// assert_eq!(auto.adjusted_ttl_at(&id, 3_000).unwrap(), 600);
/// ```
pub struct AutoTtl<T, S> {
    config: AutoTtlConfig,
    source: T,
    estimator: IntervalEstimator,
    adjuster: TtlAdjuster,
    burst: BurstDetector<S>,
}

impl<T, S> AutoTtl<T, S>
where
    T: TimestampSource,
    S: SessionStore,
{
    /// Build the service after validating `config`
    pub fn new(config: AutoTtlConfig, source: T, sessions: S) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            estimator: IntervalEstimator::new(&config),
            adjuster: TtlAdjuster::new(&config),
            burst: BurstDetector::new(&config, sessions),
            config,
            source,
        })
    }

    /// Adjusted TTL for a source, evaluated against the current time
    pub fn adjusted_ttl(&self, source_id: &SourceId) -> Result<i64> {
        self.adjusted_ttl_at(source_id, unix_now())
    }

    /// Adjusted TTL for a source as of `now`
    ///
    /// Records the window in the burst detector as a side effect. A source
    /// in burst always gets the minimum interval.
    pub fn adjusted_ttl_at(&self, source_id: &SourceId, now: i64) -> Result<i64> {
        let timestamps = self.fetch_window(source_id)?;
        let estimate = self.estimator.estimate(&timestamps);

        if self.burst.update(source_id, timestamps.len())? {
            debug!(source = %source_id, ttl = self.config.min_interval, "source in burst");
            return Ok(self.config.min_interval);
        }

        let most_recent = timestamps.iter().copied().max();
        let ttl = self.adjuster.adjust(estimate, most_recent, now);

        debug!(
            source = %source_id,
            window = timestamps.len(),
            estimate,
            ttl,
            "adjusted ttl"
        );
        Ok(ttl)
    }

    /// Display status of a source as of `now`, without recording a window
    ///
    /// Burst takes precedence over the active/idle classification.
    pub fn status_at(&self, source_id: &SourceId, now: i64) -> Result<SourceStatus> {
        if self.burst.peek(source_id)?.burst {
            return Ok(SourceStatus::Burst);
        }

        let timestamps = self.fetch_window(source_id)?;
        let most_recent = timestamps.iter().copied().max();
        Ok(self.classify(most_recent, now))
    }

    pub fn status(&self, source_id: &SourceId) -> Result<SourceStatus> {
        self.status_at(source_id, unix_now())
    }

    /// Display status for a row produced by batch ranking
    pub fn summary_status(&self, summary: &SourceSummary, now: i64) -> Result<SourceStatus> {
        if self.burst.peek(&summary.id)?.burst {
            return Ok(SourceStatus::Burst);
        }
        Ok(self.classify(summary.date_max, now))
    }

    /// Robust period estimate for a source, without side effects
    pub fn estimate(&self, source_id: &SourceId) -> Result<i64> {
        let timestamps = self.fetch_window(source_id)?;
        Ok(self.estimator.estimate(&timestamps))
    }

    fn fetch_window(&self, source_id: &SourceId) -> Result<Vec<i64>> {
        self.source.fetch_recent_timestamps(
            source_id,
            self.config.time_field,
            self.config.sample_count,
        )
    }

    fn classify(&self, most_recent: Option<i64>, now: i64) -> SourceStatus {
        if self.adjuster.is_active(most_recent, now) {
            SourceStatus::Active
        } else {
            SourceStatus::Idle
        }
    }

    pub fn config(&self) -> &AutoTtlConfig {
        &self.config
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    pub fn burst_detector(&self) -> &BurstDetector<S> {
        &self.burst
    }
}

impl<T, S> std::fmt::Debug for AutoTtl<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoTtl")
            .field("config", &self.config)
            .field("burst", &self.burst)
            .finish()
    }
}
