/*!
 * Pip Tracker
 * State for one monitored build step and its process tree
 *
 * Owns the parsed manifest, the decision caches, and the live process
 * count for one pip. `resolve` is called concurrently from every thread of
 * every process in the tree; it never blocks on another resolve and never
 * fails. The active decision cache is held behind an RCU-style atomic
 * handle so the governor's disable transition can replace it wholesale
 * under concurrent readers.
 */

use crate::cache::{CacheGovernor, CounterSnapshot, DecisionTrie, ThreadLastLookup};
use crate::core::config::TrackerConfig;
use crate::core::errors::TrackerError;
use crate::core::types::{Pid, PipId};
use crate::manifest::{AccessDecision, PolicyManifest};
use crate::path::CanonicalPath;
use arc_swap::ArcSwap;
use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Diagnostic snapshot of one tracker. Best effort: the fields are read
/// without mutual synchronization and may be mutually inconsistent with
/// concurrent resolves.
#[derive(Debug, Clone, Serialize)]
pub struct PipInfo {
    pub process_id: Pid,
    pub client_pid: Pid,
    pub pip_id: PipId,
    pub cache_size: usize,
    pub tree_size: u32,
    pub last_lookup_slots: usize,
    pub counters: CounterSnapshot,
}

/// Tracks one pip: manifest, decision caches, counters, and tree size.
pub struct PipTracker {
    /// Process id of the client tracking this pip.
    client_pid: Pid,
    /// Process id of the root process of this pip.
    process_id: Pid,
    manifest: PolicyManifest,
    /// Active decision cache. Read by many threads; replaced by at most
    /// one winning compare-and-swap when caching is abandoned.
    cache: ArcSwap<DecisionTrie>,
    /// Outgoing cache parked by the winner of the disable swap. Readers
    /// that pinned it via the handle keep it alive regardless; this slot
    /// holds the final reference until teardown.
    retired: Mutex<Option<Arc<DecisionTrie>>>,
    last_lookup: ThreadLastLookup,
    governor: CacheGovernor,
    /// Number of live processes in this pip's tree. At least 1 until the
    /// root and every descendant have been detached.
    tree_size: AtomicU32,
}

impl std::fmt::Debug for PipTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipTracker")
            .field("client_pid", &self.client_pid)
            .field("process_id", &self.process_id)
            .field("tree_size", &self.tree_size.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl PipTracker {
    /// Parses the manifest payload and builds the tracker. A malformed
    /// payload fails the construction and leaves no partial object.
    pub fn new(
        client_pid: Pid,
        process_id: Pid,
        payload: &[u8],
        config: TrackerConfig,
    ) -> Result<Self, TrackerError> {
        let manifest = match PolicyManifest::parse(payload) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(
                    "Could not parse access manifest for PID {} (client {}): {}",
                    process_id, client_pid, err
                );
                return Err(err.into());
            }
        };

        let cache = if config.cache_enabled {
            DecisionTrie::new()
        } else {
            DecisionTrie::sealed()
        };

        Ok(Self {
            client_pid,
            process_id,
            manifest,
            cache: ArcSwap::from_pointee(cache),
            retired: Mutex::new(None),
            last_lookup: ThreadLastLookup::new(),
            governor: CacheGovernor::new(&config),
            tree_size: AtomicU32::new(1),
        })
    }

    /// Process id of the client tracking this pip.
    pub fn client_pid(&self) -> Pid {
        self.client_pid
    }

    /// Process id of the root process of this pip.
    pub fn process_id(&self) -> Pid {
        self.process_id
    }

    /// Unique identifier of this pip, carried by its manifest.
    pub fn pip_id(&self) -> PipId {
        self.manifest.pip_id()
    }

    /// The parsed access-policy manifest.
    pub fn manifest(&self) -> &PolicyManifest {
        &self.manifest
    }

    /// Decision for one intercepted file operation. Never fails: a path
    /// that cannot be canonicalized is answered with the manifest default,
    /// and the manifest always yields a decision for everything else.
    pub fn resolve(&self, raw: &str) -> AccessDecision {
        let path = CanonicalPath::canonicalize(raw);
        if path.is_null() {
            return self.manifest.default_decision();
        }

        if let Some(decision) = self.last_lookup.get(&path) {
            self.governor.record_hit();
            return decision;
        }

        let decision = if self.governor.is_disabled() {
            self.governor.record_miss();
            self.manifest.query(&path)
        } else {
            let cache = self.cache.load();
            match cache.lookup(&path) {
                Some(decision) => {
                    self.governor.record_hit();
                    decision
                }
                None => {
                    let decision = self.manifest.query(&path);
                    cache.insert(&path, decision);
                    self.governor.record_miss();
                    self.maybe_disable(&cache);
                    decision
                }
            }
        };

        self.last_lookup.record(path, decision);
        decision
    }

    /// Governor evaluation after a cache miss. The winning caller swaps in
    /// a fresh (sealed) instance and parks the outgoing one until
    /// teardown; concurrent losers drop their speculative replacement
    /// without side effects.
    fn maybe_disable(&self, probed: &Arc<DecisionTrie>) {
        if !self.governor.should_disable(probed.len()) {
            return;
        }
        self.governor.disable();

        let fresh = Arc::new(DecisionTrie::sealed());
        let prior = self.cache.compare_and_swap(probed, fresh);
        if Arc::ptr_eq(&*prior, probed) {
            *self.retired.lock() = Some(Arc::clone(probed));
            debug!(
                "Disabled decision caching for pip {:#x} (PID {}): {} entries at {}% hit rate",
                self.pip_id(),
                self.process_id,
                probed.len(),
                self.governor.hit_percentage()
            );
        }
    }

    /// Registers one more live process in this pip's tree; returns the new
    /// tree size.
    pub fn attach_child(&self) -> u32 {
        self.tree_size.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Unregisters an exited process; returns the new tree size. Teardown
    /// is permitted only once this reaches zero.
    pub fn detach_child(&self) -> u32 {
        self.tree_size.fetch_sub(1, Ordering::AcqRel) - 1
    }

    /// Number of live processes currently in this pip's tree.
    pub fn tree_size(&self) -> u32 {
        self.tree_size.load(Ordering::Acquire)
    }

    /// Whether every process in the tree has exited, making it safe to
    /// release the tracker.
    pub fn can_teardown(&self) -> bool {
        self.tree_size() == 0
    }

    /// Diagnostic snapshot for logging and monitoring.
    pub fn introspect(&self) -> PipInfo {
        PipInfo {
            process_id: self.process_id,
            client_pid: self.client_pid,
            pip_id: self.pip_id(),
            cache_size: self.cache.load().len(),
            tree_size: self.tree_size(),
            last_lookup_slots: self.last_lookup.len(),
            counters: self.governor.snapshot(),
        }
    }
}

impl Drop for PipTracker {
    fn drop(&mut self) {
        let counters = self.governor.snapshot();
        debug!(
            "Pip {:#x} stats PID({}): {} cache hits, {} cache misses, cache size {}, {} last-lookup slots",
            self.manifest.pip_id(),
            self.process_id,
            counters.hits,
            counters.misses,
            self.cache.load().len(),
            self.last_lookup.len()
        );
    }
}
