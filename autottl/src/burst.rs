//! Hysteresis-based burst detection
//!
//! Each source is either idle or bursting. A window with more new items than
//! the threshold enters burst (or re-arms it); leaving burst takes
//! `burst_max_miss` consecutive windows at or below the threshold.
//!
//! ```text
//!            count > threshold
//!   ┌──────┐ ───────────────────▶ ┌───────┐ ◀─┐ count > threshold
//!   │ Idle │                      │ Burst │ ──┘ (miss = 0)
//!   └──────┘ ◀─────────────────── └───────┘
//!            miss >= max_miss       count <= threshold: miss += 1
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::AutoTtlConfig;
use crate::error::Result;
use crate::model::{BurstState, SourceId};
use crate::session::SessionStore;

/// Burst state machine over an injected session store
///
/// Load-modify-save for one source is serialized through a per-source lock,
/// so overlapping updates never lose a miss increment. Updates for
/// different sources do not contend. A lock entry lives only while some
/// update for its source is running. Exclusion across processes is up to
/// the store's [`update_burst_state`](SessionStore::update_burst_state).
pub struct BurstDetector<S> {
    store: S,
    threshold: usize,
    max_miss: u32,
    locks: DashMap<SourceId, Arc<Mutex<()>>>,
}

impl<S: SessionStore> BurstDetector<S> {
    pub fn new(config: &AutoTtlConfig, store: S) -> Self {
        Self {
            store,
            threshold: config.burst_threshold,
            max_miss: config.burst_max_miss,
            locks: DashMap::new(),
        }
    }

    /// Feed one window's new-item count and return whether the source is
    /// now bursting
    pub fn update(&self, source_id: &SourceId, new_items: usize) -> Result<bool> {
        let outcome = {
            let lock = Arc::clone(self.locks.entry(source_id.clone()).or_default().value());
            let _guard = lock.lock();
            self.apply(source_id, new_items)
        };

        self.locks
            .remove_if(source_id, |_, lock| Arc::strong_count(lock) == 1);

        outcome
    }

    fn apply(&self, source_id: &SourceId, new_items: usize) -> Result<bool> {
        let mut previous = BurstState::default();
        let next = self.store.update_burst_state(source_id, &mut |stored| {
            previous = stored.unwrap_or_default();
            self.transition(previous, new_items)
        })?;

        if next.burst != previous.burst {
            debug!(
                source = %source_id,
                new_items,
                burst = next.burst,
                "burst state changed"
            );
        }

        Ok(next.burst)
    }

    /// Current state without recording a window
    pub fn peek(&self, source_id: &SourceId) -> Result<BurstState> {
        Ok(self.store.load_burst_state(source_id)?.unwrap_or_default())
    }

    /// The next state for one window, without touching the store
    pub fn transition(&self, state: BurstState, new_items: usize) -> BurstState {
        if new_items > self.threshold {
            return BurstState::ARMED;
        }

        if !state.burst {
            return state;
        }

        let miss_count = state.miss_count.saturating_add(1);
        if miss_count >= self.max_miss {
            BurstState::IDLE
        } else {
            BurstState {
                burst: true,
                miss_count,
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> BurstDetector<S> {
    /// Sources with an update in flight
    pub fn tracked_sources(&self) -> usize {
        self.locks.len()
    }
}

impl<S> std::fmt::Debug for BurstDetector<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BurstDetector")
            .field("threshold", &self.threshold)
            .field("max_miss", &self.max_miss)
            .field("tracked_sources", &self.tracked_sources())
            .finish()
    }
}
