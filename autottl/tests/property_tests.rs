//! Property-based tests for estimation, adjustment and burst detection

use proptest::prelude::*;
use std::sync::Arc;

use autottl::{
    AutoTtlConfig, BurstDetector, BurstState, FeedRecord, FeedStats, IntervalEstimator,
    MemorySessionStore, MemorySource, SourceId, TtlAdjuster,
};

// ============================================================================
// Strategies
// ============================================================================

/// Configs with `min <= default <= max`
fn bounded_config_strategy() -> impl Strategy<Value = AutoTtlConfig> {
    (1i64..1_000, 0i64..100_000, 0i64..=100)
        .prop_map(|(min, span, pct)| {
            let max = min + span;
            let default = min + span * pct / 100;
            AutoTtlConfig::new().with_intervals(default, min, max)
        })
}

fn timestamp_strategy() -> impl Strategy<Value = i64> {
    0i64..2_000_000_000
}

fn burst_state_strategy() -> impl Strategy<Value = BurstState> {
    (any::<bool>(), 0u32..10).prop_map(|(burst, miss)| BurstState {
        burst,
        miss_count: if burst { miss } else { 0 },
    })
}

// ============================================================================
// Estimator
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Fewer than two timestamps always yield the default interval
    #[test]
    fn prop_short_window_yields_default(
        config in bounded_config_strategy(),
        window in prop::collection::vec(timestamp_strategy(), 0..2),
    ) {
        let estimator = IntervalEstimator::new(&config);
        prop_assert_eq!(estimator.estimate(&window), config.default_interval);
    }

    /// Any window of two or more timestamps lands within the bounds
    #[test]
    fn prop_estimate_within_bounds(
        config in bounded_config_strategy(),
        window in prop::collection::vec(timestamp_strategy(), 2..150),
    ) {
        let estimate = IntervalEstimator::new(&config).estimate(&window);
        prop_assert!(estimate >= config.min_interval);
        prop_assert!(estimate <= config.max_interval);
    }

    /// Window order does not matter
    #[test]
    fn prop_estimate_ignores_order(
        config in bounded_config_strategy(),
        mut window in prop::collection::vec(timestamp_strategy(), 2..50),
    ) {
        let estimator = IntervalEstimator::new(&config);
        let original = estimator.estimate(&window);
        window.reverse();
        prop_assert_eq!(estimator.estimate(&window), original);
    }
}

// ============================================================================
// Adjuster
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A default above the max overrides every other rule
    #[test]
    fn prop_default_override_wins(
        max in 1i64..100_000,
        extra in 1i64..100_000,
        estimated in any::<i64>(),
        most_recent in prop::option::of(timestamp_strategy()),
        now in timestamp_strategy(),
    ) {
        let config = AutoTtlConfig::new().with_intervals(max + extra, 1, max);
        let adjuster = TtlAdjuster::new(&config);
        prop_assert_eq!(adjuster.adjust(estimated, most_recent, now), max + extra);
    }

    /// With a default inside the bounds the result stays inside them
    #[test]
    fn prop_adjusted_within_bounds(
        config in bounded_config_strategy(),
        estimated in any::<i64>(),
        most_recent in prop::option::of(timestamp_strategy()),
        now in timestamp_strategy(),
    ) {
        let ttl = TtlAdjuster::new(&config).adjust(estimated, most_recent, now);
        prop_assert!(ttl >= config.min_interval);
        prop_assert!(ttl <= config.max_interval);
    }

    /// Quiet sources always get the max interval
    #[test]
    fn prop_quiet_source_gets_max(
        config in bounded_config_strategy(),
        estimated in any::<i64>(),
        now in 1_000_000_000i64..2_000_000_000,
    ) {
        let adjuster = TtlAdjuster::new(&config);
        let stale = now - 2 * config.max_interval - 1;

        prop_assert_eq!(adjuster.adjust(estimated, Some(stale), now), config.max_interval);
        prop_assert_eq!(adjuster.adjust(estimated, None, now), config.max_interval);
    }
}

// ============================================================================
// Burst Detection
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The miss counter never reaches max_miss while in burst, and is zero
    /// whenever the source is idle
    #[test]
    fn prop_burst_state_stays_consistent(
        threshold in 0usize..50,
        max_miss in 1u32..6,
        state in burst_state_strategy(),
        counts in prop::collection::vec(0usize..100, 1..40),
    ) {
        let config = AutoTtlConfig::new().with_burst(threshold, max_miss);
        let detector = BurstDetector::new(&config, MemorySessionStore::new());

        let mut state = BurstState {
            burst: state.burst,
            miss_count: state.miss_count.min(max_miss - 1),
        };
        for count in counts {
            state = detector.transition(state, count);
            if state.burst {
                prop_assert!(state.miss_count < max_miss);
            } else {
                prop_assert_eq!(state.miss_count, 0);
            }
            if count > threshold {
                prop_assert_eq!(state, BurstState::ARMED);
            }
        }
    }
}

// ============================================================================
// Ranking
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Rankings are sorted ascending and capped at the sample count
    #[test]
    fn prop_ranking_sorted_and_capped(
        sample_count in 1usize..8,
        feeds in prop::collection::vec(
            prop::collection::vec(timestamp_strategy(), 0..12),
            0..12,
        ),
    ) {
        let source = Arc::new(MemorySource::new());
        for (i, entries) in feeds.iter().enumerate() {
            let id = SourceId::from(i as u64);
            source.add_feed(FeedRecord {
                id: id.clone(),
                name: format!("Feed {}", i),
                last_update: 0,
                ttl: 0,
            });
            for ts in entries {
                source.record(&id, *ts);
            }
        }

        let config = AutoTtlConfig::new().with_sample_count(sample_count);
        let ranked = FeedStats::new(&config, Arc::clone(&source), Arc::clone(&source))
            .list_sources(true)
            .unwrap();

        prop_assert!(ranked.len() <= sample_count);
        prop_assert_eq!(ranked.len(), feeds.len().min(sample_count));
        prop_assert!(ranked.windows(2).all(|pair| pair[0].avg_ttl <= pair[1].avg_ttl));
    }
}
