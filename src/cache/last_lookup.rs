/*!
 * Per-Thread Last Lookup
 * Single-slot memo of the most recent (path, decision) pair per thread
 *
 * Amortizes repeated queries for the same path from one thread, e.g. the
 * existence checks a compiler issues in a tight loop. A thread only ever
 * reads and writes its own slot, so slots never contend; the table itself
 * is a sharded map keyed by thread id. Slots are created lazily and
 * retained for the lifetime of the owning tracker.
 */

use crate::manifest::AccessDecision;
use crate::path::CanonicalPath;
use ahash::RandomState;
use dashmap::DashMap;
use std::thread::{self, ThreadId};

struct LastLookup {
    path: CanonicalPath,
    decision: AccessDecision,
}

/// Lazily allocated one-slot cache per calling thread.
pub struct ThreadLastLookup {
    slots: DashMap<ThreadId, LastLookup, RandomState>,
}

impl ThreadLastLookup {
    pub fn new() -> Self {
        Self {
            slots: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Decision the calling thread memoized for exactly `path`, if its
    /// most recent lookup was for that path.
    pub fn get(&self, path: &CanonicalPath) -> Option<AccessDecision> {
        self.slots
            .get(&thread::current().id())
            .and_then(|slot| (slot.path == *path).then_some(slot.decision))
    }

    /// Overwrites the calling thread's slot.
    pub fn record(&self, path: CanonicalPath, decision: AccessDecision) {
        self.slots
            .insert(thread::current().id(), LastLookup { path, decision });
    }

    /// Number of slots allocated so far (diagnostic only).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for ThreadLastLookup {
    fn default() -> Self {
        Self::new()
    }
}
