//! Translation of an estimated period into the polling interval to apply
//!
//! The checks run in a fixed order and the first match wins:
//!
//! ```text
//! default > max                         -> default   (configured override)
//! estimate > max || elapsed > 2 * max   -> max       (quiet source)
//! estimate == 0                         -> default   (no usable signal)
//! estimate < min                        -> min
//! otherwise                             -> estimate
//! ```

use crate::config::AutoTtlConfig;

/// Bounds an estimated period into the TTL applied to a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlAdjuster {
    default_interval: i64,
    min_interval: i64,
    max_interval: i64,
}

impl TtlAdjuster {
    pub fn new(config: &AutoTtlConfig) -> Self {
        Self {
            default_interval: config.default_interval,
            min_interval: config.min_interval,
            max_interval: config.max_interval,
        }
    }

    /// Adjusted TTL for a source
    ///
    /// `most_recent` is the newest observation of the source. `None` means
    /// the source has no observations at all and counts as quiet for an
    /// unbounded time.
    pub fn adjust(&self, estimated: i64, most_recent: Option<i64>, now: i64) -> i64 {
        if self.default_interval > self.max_interval {
            return self.default_interval;
        }

        let quiet = !is_recent(most_recent, now, self.max_interval);

        if estimated > self.max_interval || quiet {
            self.max_interval
        } else if estimated == 0 {
            self.default_interval
        } else if estimated < self.min_interval {
            self.min_interval
        } else {
            estimated
        }
    }

    /// Whether the source produced something within twice the max interval
    pub fn is_active(&self, most_recent: Option<i64>, now: i64) -> bool {
        is_recent(most_recent, now, self.max_interval)
    }
}

/// `now - most_recent <= 2 * max_interval`; a missing timestamp is never
/// recent
pub(crate) fn is_recent(most_recent: Option<i64>, now: i64, max_interval: i64) -> bool {
    match most_recent {
        Some(latest) => now.saturating_sub(latest) <= max_interval.saturating_mul(2),
        None => false,
    }
}
