/*!
 * Tracker Configuration
 * Construction-time snapshot of the cache tuning knobs
 */

use serde::{Deserialize, Serialize};

/// Configuration snapshot read once at tracker construction.
///
/// Passed by value instead of living in process-global state, so trackers
/// can be tuned independently (and deterministically under test).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackerConfig {
    /// Whether the decision cache starts enabled for this pip.
    pub cache_enabled: bool,
    /// Entry count the cache must exceed before it can be declared
    /// unproductive.
    pub min_cache_entries: usize,
    /// Hit percentage below which an oversized cache is abandoned.
    pub max_hit_percent: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            min_cache_entries: 20_000,
            max_hit_percent: 20,
        }
    }
}
