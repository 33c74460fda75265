/*!
 * Decision Trie
 * Prefix tree keyed by path components, mapping a path to a resolved
 * decision
 *
 * Sibling paths under one process tree share prefix nodes, so memory is
 * bounded by shared components rather than by unique full paths. Entries
 * are add-only: nothing is ever evicted, and the only reset is replacing
 * the whole instance. Lookups from many threads proceed concurrently with
 * a bounded stream of inserts; contention is limited to `DashMap` shards
 * inside a single node, so independent subtrees never serialize on a
 * common lock.
 */

use crate::manifest::AccessDecision;
use crate::path::CanonicalPath;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct TrieNode {
    /// Child nodes keyed by the next path component.
    children: DashMap<Box<str>, Arc<TrieNode>, RandomState>,
    /// Encoded decision; zero means no decision is recorded at this node.
    slot: AtomicU8,
}

/// Concurrent path → decision cache.
pub struct DecisionTrie {
    root: Arc<TrieNode>,
    entries: AtomicUsize,
    nodes: AtomicUsize,
    /// A sealed instance refuses inserts. The replacement swapped in when
    /// caching is abandoned is sealed, so stragglers racing the disable
    /// transition cannot repopulate it.
    sealed: bool,
}

impl DecisionTrie {
    pub fn new() -> Self {
        Self::with_sealed(false)
    }

    /// An instance that accepts lookups but silently drops inserts.
    pub fn sealed() -> Self {
        Self::with_sealed(true)
    }

    fn with_sealed(sealed: bool) -> Self {
        Self {
            root: Arc::new(TrieNode::default()),
            entries: AtomicUsize::new(0),
            nodes: AtomicUsize::new(1),
            sealed,
        }
    }

    /// Decision previously recorded for `path`, if any.
    pub fn lookup(&self, path: &CanonicalPath) -> Option<AccessDecision> {
        if path.is_null() {
            return None;
        }
        let mut node = Arc::clone(&self.root);
        for component in path.components() {
            let child = match node.children.get(component) {
                Some(entry) => Arc::clone(entry.value()),
                None => return None,
            };
            node = child;
        }
        AccessDecision::from_bits(node.slot.load(Ordering::Acquire))
    }

    /// Records `path → decision`. Add-only: when two inserts race on the
    /// same path, the first recorded decision is kept. Null paths and
    /// sealed instances are no-ops.
    pub fn insert(&self, path: &CanonicalPath, decision: AccessDecision) {
        if self.sealed || path.is_null() {
            return;
        }
        let mut node = Arc::clone(&self.root);
        for component in path.components() {
            let existing = node
                .children
                .get(component)
                .map(|entry| Arc::clone(entry.value()));
            let child = match existing {
                Some(child) => child,
                None => {
                    let entry = node.children.entry(component.into()).or_insert_with(|| {
                        self.nodes.fetch_add(1, Ordering::Relaxed);
                        Arc::new(TrieNode::default())
                    });
                    Arc::clone(entry.value())
                }
            };
            node = child;
        }
        if node
            .slot
            .compare_exchange(0, decision.to_bits(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.entries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of decisions stored (not the number of trie nodes).
    pub fn len(&self) -> usize {
        self.entries.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of trie nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.load(Ordering::Relaxed)
    }
}

impl Default for DecisionTrie {
    fn default() -> Self {
        Self::new()
    }
}
