//! Robust inter-arrival period estimation
//!
//! Turns a noisy window of observation timestamps into one representative
//! period: consecutive gaps, a symmetric 10% trim, then the median, clamped
//! into the configured interval bounds.

use tracing::trace;

use crate::config::AutoTtlConfig;

/// Fraction of gaps dropped from each end before taking the median
const TRIM_DIVISOR: usize = 10;

/// Estimates the typical period between observations of one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalEstimator {
    default_interval: i64,
    min_interval: i64,
    max_interval: i64,
}

impl IntervalEstimator {
    pub fn new(config: &AutoTtlConfig) -> Self {
        Self {
            default_interval: config.default_interval,
            min_interval: config.min_interval,
            max_interval: config.max_interval,
        }
    }

    /// Estimate the period in seconds from a window of timestamps
    ///
    /// Fewer than two timestamps carry no signal and yield the default
    /// interval. Otherwise the result always lies in `[min, max]`.
    pub fn estimate(&self, timestamps: &[i64]) -> i64 {
        if timestamps.len() < 2 {
            return self.default_interval;
        }

        let mut diffs = gaps(timestamps);
        diffs.sort_unstable();

        let kept = trim_outliers(&diffs);
        trace!(
            gaps = diffs.len(),
            kept = kept.len(),
            "trimmed inter-arrival gaps"
        );

        // kept is never empty: at least one gap exists and trimming never
        // removes every element
        let Some(period) = median(kept) else {
            return self.default_interval;
        };

        if period < self.min_interval as f64 {
            self.min_interval
        } else if period > self.max_interval as f64 {
            self.max_interval
        } else {
            period.round() as i64
        }
    }
}

/// Consecutive gaps of the window sorted newest first
///
/// Duplicate timestamps produce zero gaps, which are kept.
pub fn gaps(timestamps: &[i64]) -> Vec<i64> {
    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .windows(2)
        .map(|pair| pair[0].saturating_sub(pair[1]))
        .collect()
}

/// Drop `floor(len / 10)` values from each end of an ascending slice
///
/// The slice is returned untouched when trimming would leave nothing.
pub fn trim_outliers(sorted: &[i64]) -> &[i64] {
    let trim = sorted.len() / TRIM_DIVISOR;
    if trim == 0 || sorted.len() <= 2 * trim {
        return sorted;
    }
    &sorted[trim..sorted.len() - trim]
}

/// Median of an ascending slice; the mean of the two central values for
/// even lengths
pub fn median(sorted: &[i64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}
