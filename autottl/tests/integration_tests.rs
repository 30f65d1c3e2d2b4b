//! End-to-end behavior over the bundled fixture and shared session stores

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use autottl::{
    AutoTtl, AutoTtlConfig, BurstDetector, BurstState, FeedStats, FileSessionStore,
    MemorySessionStore, MemorySource, SessionStore, SourceId, SourceStatus,
};

const NOW: i64 = 1_700_000_000;

// ============================================================================
// Test Helpers
// ============================================================================

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("feeds.json")
}

fn fixture_source() -> Arc<MemorySource> {
    Arc::new(MemorySource::from_path(fixture_path()).unwrap())
}

fn ids(rows: &[autottl::SourceSummary]) -> Vec<&str> {
    rows.iter().map(|row| row.id.as_str()).collect()
}

// ============================================================================
// Adjusted TTL
// ============================================================================

#[test]
fn test_fixture_ttls() {
    let auto = AutoTtl::new(
        AutoTtlConfig::new(),
        fixture_source(),
        MemorySessionStore::new(),
    )
    .unwrap();

    assert_eq!(auto.adjusted_ttl_at(&"news".into(), NOW).unwrap(), 900);
    // last entry is older than twice the max interval
    assert_eq!(auto.adjusted_ttl_at(&"blog".into(), NOW).unwrap(), 86_400);
    // identical observation times collapse to a zero period, clamped to min
    assert_eq!(auto.adjusted_ttl_at(&"import".into(), NOW).unwrap(), 300);
    assert_eq!(auto.adjusted_ttl_at(&"unknown".into(), NOW).unwrap(), 86_400);
}

#[test]
fn test_burst_lifecycle_through_service() {
    let source = Arc::new(MemorySource::new());
    let id = SourceId::new("flood");
    for i in 0..20 {
        source.record(&id, NOW - i * 30);
    }

    let config = AutoTtlConfig::new()
        .with_intervals(3_600, 300, 86_400)
        .with_sample_count(100)
        .with_burst(15, 3);
    let sessions = MemorySessionStore::new();
    let auto = AutoTtl::new(config.clone(), Arc::clone(&source), sessions.clone()).unwrap();

    assert_eq!(auto.adjusted_ttl_at(&id, NOW).unwrap(), 300);
    assert_eq!(auto.status_at(&id, NOW).unwrap(), SourceStatus::Burst);

    // a smaller window now stays under the threshold
    let calm = AutoTtl::new(config.with_sample_count(5), source, sessions).unwrap();
    assert_eq!(calm.adjusted_ttl_at(&id, NOW).unwrap(), 300);
    assert_eq!(calm.adjusted_ttl_at(&id, NOW).unwrap(), 300);
    assert_eq!(calm.burst_detector().peek(&id).unwrap().miss_count, 2);

    // third quiet window leaves burst; the period is clamped to min anyway
    assert_eq!(calm.adjusted_ttl_at(&id, NOW).unwrap(), 300);
    assert_eq!(calm.status_at(&id, NOW).unwrap(), SourceStatus::Active);
}

// ============================================================================
// Session Stores
// ============================================================================

#[test]
fn test_concurrent_updates_do_not_lose_misses() {
    let config = AutoTtlConfig::new().with_burst(15, 1_000);
    let detector = Arc::new(BurstDetector::new(&config, MemorySessionStore::new()));
    let id = SourceId::new("shared");

    assert!(detector.update(&id, 50).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let detector = Arc::clone(&detector);
            let id = id.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    detector.update(&id, 0).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        detector.peek(&id).unwrap(),
        BurstState {
            burst: true,
            miss_count: 80
        }
    );
}

#[test]
fn test_concurrent_updates_on_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = AutoTtlConfig::new().with_burst(15, 1_000);
    let detector = Arc::new(BurstDetector::new(
        &config,
        FileSessionStore::new(dir.path().join("sessions.json")),
    ));
    let id = SourceId::new("shared");

    detector.update(&id, 50).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let detector = Arc::clone(&detector);
            let id = id.clone();
            thread::spawn(move || {
                for _ in 0..5 {
                    detector.update(&id, 0).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(detector.peek(&id).unwrap().miss_count, 20);
}

#[test]
fn test_detectors_sharing_a_session_file_lose_no_misses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    let config = AutoTtlConfig::new().with_burst(15, 1_000);
    let id = SourceId::new("shared");

    // One detector per scheduler run, each with its own store and lock table
    let detectors: Vec<_> = (0..2)
        .map(|_| Arc::new(BurstDetector::new(&config, FileSessionStore::new(&path))))
        .collect();
    assert!(detectors[0].update(&id, 50).unwrap());

    let handles: Vec<_> = detectors
        .iter()
        .flat_map(|detector| (0..2).map(move |_| Arc::clone(detector)))
        .map(|detector| {
            let id = id.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    detector.update(&id, 0).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        FileSessionStore::new(&path).load_burst_state(&id).unwrap(),
        Some(BurstState { burst: true, miss_count: 200 })
    );
}

#[test]
fn test_file_store_carries_burst_across_processes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    let source = Arc::new(MemorySource::new());
    let id = SourceId::new("flood");
    for i in 0..20 {
        source.record(&id, NOW - i * 30);
    }

    let config = AutoTtlConfig::new().with_burst(15, 3);

    let first = AutoTtl::new(config.clone(), Arc::clone(&source), FileSessionStore::new(&path))
        .unwrap();
    first.adjusted_ttl_at(&id, NOW).unwrap();
    drop(first);

    let second = AutoTtl::new(config, source, FileSessionStore::new(&path)).unwrap();
    assert_eq!(second.status_at(&id, NOW).unwrap(), SourceStatus::Burst);
    assert_eq!(
        FileSessionStore::new(&path).load_burst_state(&id).unwrap(),
        Some(BurstState::ARMED)
    );
}

// ============================================================================
// Ranking
// ============================================================================

#[test]
fn test_fixture_ranking_with_fallback() {
    let source = fixture_source();
    let config = AutoTtlConfig::new();
    let stats = FeedStats::new(&config, Arc::clone(&source), Arc::clone(&source));

    let ranked = stats.list_sources(true).unwrap();
    assert_eq!(ids(&ranked), vec!["news", "import", "blog"]);
    assert_eq!(ranked[0].avg_ttl, 720);
    assert_eq!(ranked[1].avg_ttl, 5_400);
    assert_eq!(ranked[2].avg_ttl, 57_600);

    let manual = stats.list_sources(false).unwrap();
    assert_eq!(ids(&manual), vec!["manual"]);
    assert_eq!(manual[0].ttl, 1_800);
}

#[test]
fn test_fixture_ranking_without_fallback() {
    let source = fixture_source();
    let config = AutoTtlConfig::new().with_ranking_fallback(false);
    let stats = FeedStats::new(&config, Arc::clone(&source), Arc::clone(&source));

    let ranked = stats.list_sources(true).unwrap();
    assert_eq!(ids(&ranked), vec!["import", "news", "blog"]);
    assert_eq!(ranked[0].avg_ttl, 0);
}

#[test]
fn test_ranking_rows_get_status() {
    let source = fixture_source();
    let config = AutoTtlConfig::new();
    let stats = FeedStats::new(&config, Arc::clone(&source), Arc::clone(&source));
    let auto = AutoTtl::new(config, Arc::clone(&source), MemorySessionStore::new()).unwrap();

    let statuses: Vec<_> = stats
        .list_sources(true)
        .unwrap()
        .iter()
        .map(|row| auto.summary_status(row, NOW).unwrap())
        .collect();

    assert_eq!(
        statuses,
        vec![SourceStatus::Active, SourceStatus::Active, SourceStatus::Idle]
    );
}
