//! Batch ranking of sources for the statistics listing
//!
//! Ranking uses a cheap, non-robust mean (`(max - min) / count`) instead of
//! the trimmed median used for single-source queries. The two estimates are
//! kept separate on purpose: switching the listing to the robust estimator
//! would change its order.
//!
//! The pipeline runs in distinct stages so that ranking and truncation only
//! see final values:
//!
//! ```text
//! catalog ─▶ filter by ttl mode ─▶ mean (primary field)
//!         ─▶ re-estimate zero means (alternate field) ─▶ sort ─▶ truncate
//! ```

use tracing::debug;

use crate::config::AutoTtlConfig;
use crate::error::Result;
use crate::model::{FeedRecord, SourceSummary, TimeField};
use crate::source::{FeedCatalog, TimestampSource};

/// Mean spacing of a window: `(max - min) / count`, 0 for an empty window
pub fn mean_interval(window: &[i64]) -> i64 {
    let (Some(max), Some(min)) = (window.iter().max(), window.iter().min()) else {
        return 0;
    };
    max.saturating_sub(*min) / window.len() as i64
}

/// Produces the ranked statistics listing
pub struct FeedStats<C, T> {
    catalog: C,
    source: T,
    sample_count: usize,
    time_field: TimeField,
    fallback: bool,
}

impl<C, T> FeedStats<C, T>
where
    C: FeedCatalog,
    T: TimestampSource,
{
    pub fn new(config: &AutoTtlConfig, catalog: C, source: T) -> Self {
        Self {
            catalog,
            source,
            sample_count: config.sample_count,
            time_field: config.time_field,
            fallback: config.ranking_fallback,
        }
    }

    /// Sources ordered most-active first, capped at the sample count
    ///
    /// `auto_ttl_only` selects sources whose TTL is managed automatically
    /// (`ttl == 0`); otherwise only sources with an explicit TTL are listed.
    pub fn list_sources(&self, auto_ttl_only: bool) -> Result<Vec<SourceSummary>> {
        let feeds = self
            .catalog
            .feeds()?
            .into_iter()
            .filter(|feed| feed.is_auto_ttl() == auto_ttl_only);

        let mut summaries = feeds
            .map(|feed| self.summarize(feed, self.time_field))
            .collect::<Result<Vec<_>>>()?;

        if self.fallback {
            self.apply_fallback(&mut summaries)?;
        }

        summaries.sort_by_key(|s| s.avg_ttl);
        summaries.truncate(self.sample_count);
        Ok(summaries)
    }

    fn summarize(&self, feed: FeedRecord, field: TimeField) -> Result<SourceSummary> {
        let window = self
            .source
            .fetch_recent_timestamps(&feed.id, field, self.sample_count)?;

        Ok(SourceSummary {
            avg_ttl: mean_interval(&window),
            date_max: window.iter().copied().max(),
            id: feed.id,
            name: feed.name,
            last_update: feed.last_update,
            ttl: feed.ttl,
        })
    }

    /// Re-estimate every zero mean with the alternate time field
    fn apply_fallback(&self, summaries: &mut [SourceSummary]) -> Result<()> {
        let alternate = self.time_field.alternate();

        for summary in summaries.iter_mut().filter(|s| s.avg_ttl == 0) {
            let window =
                self.source
                    .fetch_recent_timestamps(&summary.id, alternate, self.sample_count)?;
            if window.is_empty() {
                continue;
            }

            summary.avg_ttl = mean_interval(&window);
            summary.date_max = window.iter().copied().max();
            debug!(
                source = %summary.id,
                field = %alternate,
                avg_ttl = summary.avg_ttl,
                "ranking fell back to alternate time field"
            );
        }

        Ok(())
    }
}
