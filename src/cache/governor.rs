/*!
 * Cache Governor
 * Hit/miss accounting and the one-way decision to abandon caching
 *
 * A large cache with a low hit rate costs more than it saves. Once that
 * state is observed, caching is abandoned for the remainder of the pip;
 * the flag never reverses. Counters are approximate (relaxed atomics) and
 * feed only the hit-rate check and diagnostics, never correctness.
 */

use crate::core::config::TrackerConfig;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CounterSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub hit_percent: u32,
}

/// Adaptive cache policy for one pip.
///
/// # Performance
/// - Cache-line aligned to prevent false sharing of the hit/miss counters
///   (touched on every resolve)
#[repr(C, align(64))]
pub struct CacheGovernor {
    hits: AtomicU64,
    misses: AtomicU64,
    disabled: AtomicBool,
    min_entries: usize,
    max_hit_percent: u32,
}

impl CacheGovernor {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            disabled: AtomicBool::new(!config.cache_enabled),
            min_entries: config.min_cache_entries,
            max_hit_percent: config.max_hit_percent,
        }
    }

    /// A probe answered without consulting the manifest.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A probe that required a manifest query.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether caching has been abandoned for this pip.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Rounded percentage of probes answered from a cache; 100 before the
    /// first probe is recorded.
    pub fn hit_percentage(&self) -> u32 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            return 100;
        }
        ((hits as f64 / total as f64) * 100.0).round() as u32
    }

    /// True when the cache has grown past `min_entries` while the hit rate
    /// sits below `max_hit_percent`. Always false once disabled.
    pub fn should_disable(&self, entry_count: usize) -> bool {
        !self.is_disabled()
            && entry_count > self.min_entries
            && self.hit_percentage() < self.max_hit_percent
    }

    /// One-way transition; idempotent. The tracker's compare-and-swap of
    /// the active-cache handle picks the single winner among concurrent
    /// disable attempts.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Release);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            hit_percent: self.hit_percentage(),
        }
    }
}
