//! Configuration for the adaptive TTL estimator
//!
//! All intervals are in seconds. The configuration is immutable once handed
//! to [`AutoTtl`](crate::AutoTtl); build it with the `with_*` methods or
//! deserialize it from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{AutoTtlError, Result};
use crate::model::TimeField;

/// Configuration for interval estimation, adjustment and burst detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoTtlConfig {
    /// Fallback period used when no reliable signal exists
    /// Default: 3600 (1 hour)
    pub default_interval: i64,

    /// Upper bound on the adjusted polling interval
    /// Default: 86400 (1 day)
    pub max_interval: i64,

    /// Lower bound on the adjusted polling interval, also forced during burst
    /// Default: 300 (5 minutes)
    pub min_interval: i64,

    /// Maximum number of most-recent timestamps considered per estimate
    /// Default: 100
    pub sample_count: usize,

    /// Which timestamp semantic the timestamp source is queried with
    /// Default: observed-at
    pub time_field: TimeField,

    /// New items within one window above which a source enters burst
    /// Default: 15
    pub burst_threshold: usize,

    /// Consecutive quiet windows required to leave burst
    /// Default: 3
    pub burst_max_miss: u32,

    /// Re-estimate zero-average sources with the alternate time field
    /// when ranking
    /// Default: true
    pub ranking_fallback: bool,
}

impl Default for AutoTtlConfig {
    fn default() -> Self {
        Self {
            default_interval: 3_600,
            max_interval: 86_400,
            min_interval: 300,
            sample_count: 100,
            time_field: TimeField::ObservedAt,
            burst_threshold: 15,
            burst_max_miss: 3,
            ranking_fallback: true,
        }
    }
}

impl AutoTtlConfig {
    /// Create a new AutoTtlConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for high-volume sources: tight bounds, quick to leave burst
    pub fn responsive() -> Self {
        Self {
            default_interval: 900,
            max_interval: 14_400,
            min_interval: 60,
            burst_max_miss: 2,
            ..Default::default()
        }
    }

    /// Preset that polls conservatively and samples fewer entries
    pub fn conservative() -> Self {
        Self {
            default_interval: 7_200,
            max_interval: 172_800,
            min_interval: 1_800,
            sample_count: 50,
            burst_threshold: 30,
            ..Default::default()
        }
    }

    /// Validate the configuration and return the first issue found
    ///
    /// `default_interval > max_interval` is accepted: the adjuster treats it
    /// as an explicit override and always returns `default_interval`.
    pub fn validate(&self) -> Result<()> {
        if self.min_interval < 0 || self.max_interval < 0 || self.default_interval < 0 {
            return Err(AutoTtlError::Configuration(
                "Intervals must not be negative".to_string(),
            ));
        }

        if self.min_interval > self.max_interval {
            return Err(AutoTtlError::Configuration(format!(
                "Invalid interval bounds: min ({}) must not exceed max ({})",
                self.min_interval, self.max_interval
            )));
        }

        if self.sample_count == 0 {
            return Err(AutoTtlError::Configuration(
                "Sample count must be greater than 0".to_string(),
            ));
        }

        if self.burst_max_miss == 0 {
            return Err(AutoTtlError::Configuration(
                "Burst max miss must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the override condition `default_interval > max_interval` holds
    pub fn default_overrides(&self) -> bool {
        self.default_interval > self.max_interval
    }

    pub fn with_intervals(mut self, default: i64, min: i64, max: i64) -> Self {
        self.default_interval = default;
        self.min_interval = min;
        self.max_interval = max;
        self
    }

    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    pub fn with_time_field(mut self, field: TimeField) -> Self {
        self.time_field = field;
        self
    }

    pub fn with_burst(mut self, threshold: usize, max_miss: u32) -> Self {
        self.burst_threshold = threshold;
        self.burst_max_miss = max_miss;
        self
    }

    pub fn with_ranking_fallback(mut self, enabled: bool) -> Self {
        self.ranking_fallback = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutoTtlConfig::default();
        assert_eq!(config.default_interval, 3_600);
        assert_eq!(config.burst_threshold, 15);
        assert_eq!(config.burst_max_miss, 3);
        assert_eq!(config.time_field, TimeField::ObservedAt);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let inverted = AutoTtlConfig::new().with_intervals(300, 600, 60);
        assert!(inverted.validate().is_err());

        let no_samples = AutoTtlConfig::new().with_sample_count(0);
        assert!(no_samples.validate().is_err());

        let negative = AutoTtlConfig::new().with_intervals(-1, 60, 3_600);
        assert!(negative.validate().is_err());

        let never_leaves_burst = AutoTtlConfig::new().with_burst(15, 0);
        assert!(never_leaves_burst.validate().is_err());
    }

    #[test]
    fn test_default_above_max_is_accepted() {
        let config = AutoTtlConfig::new().with_intervals(7_200, 60, 3_600);
        assert!(config.validate().is_ok());
        assert!(config.default_overrides());
    }

    #[test]
    fn test_config_presets() {
        let responsive = AutoTtlConfig::responsive();
        assert_eq!(responsive.min_interval, 60);
        assert!(responsive.validate().is_ok());

        let conservative = AutoTtlConfig::conservative();
        assert_eq!(conservative.sample_count, 50);
        assert!(conservative.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = AutoTtlConfig::new()
            .with_intervals(300, 60, 3_600)
            .with_sample_count(20)
            .with_time_field(TimeField::DeclaredAt)
            .with_burst(10, 4)
            .with_ranking_fallback(false);

        assert_eq!(config.max_interval, 3_600);
        assert_eq!(config.sample_count, 20);
        assert_eq!(config.time_field, TimeField::DeclaredAt);
        assert_eq!(config.burst_threshold, 10);
        assert!(!config.ranking_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AutoTtlConfig =
            serde_json::from_str(r#"{"max_interval": 7200, "time_field": "date"}"#).unwrap();
        assert_eq!(config.max_interval, 7_200);
        assert_eq!(config.min_interval, 300);
        assert_eq!(config.time_field, TimeField::DeclaredAt);
    }
}
