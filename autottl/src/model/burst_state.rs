//! Per-source burst detector state

use serde::{Deserialize, Serialize};
use state_store::Property;

/// Persisted burst flag plus consecutive quiet windows seen while bursting
///
/// `miss_count` is only meaningful while `burst` is set; leaving burst
/// resets it to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BurstState {
    pub burst: bool,
    #[serde(rename = "miss")]
    pub miss_count: u32,
}

impl BurstState {
    /// The state a source starts in before its first observation
    pub const IDLE: BurstState = BurstState {
        burst: false,
        miss_count: 0,
    };

    /// Freshly triggered burst with a re-armed miss counter
    pub const ARMED: BurstState = BurstState {
        burst: true,
        miss_count: 0,
    };
}

impl Property for BurstState {
    const KEY: &'static str = "autottl_burst";
}
