/*!
 * Pip Registry
 * Routes intercepted operations to the tracker owning the calling process
 *
 * Every live process of every tracked tree has an entry mapping its pid to
 * the shared tracker for that tree. The hook layer registers the root when
 * a pip launches, maps descendants as they fork, and unregisters each
 * process as it exits; the tracker is released when its tree empties.
 * Different pips are fully independent.
 */

use crate::core::config::TrackerConfig;
use crate::core::errors::TrackerError;
use crate::core::types::Pid;
use crate::tracker::pip::PipTracker;
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use std::sync::Arc;

/// Concurrent pid → tracker map shared with the hook layer.
#[derive(Clone, Default)]
pub struct PipRegistry {
    pips: Arc<DashMap<Pid, Arc<PipTracker>, RandomState>>,
}

impl PipRegistry {
    pub fn new() -> Self {
        Self {
            pips: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Starts tracking a pip rooted at `process_id`. Fails without side
    /// effects when the manifest payload is malformed or the pid already
    /// belongs to a tracked tree.
    pub fn track_root(
        &self,
        client_pid: Pid,
        process_id: Pid,
        payload: &[u8],
        config: TrackerConfig,
    ) -> Result<Arc<PipTracker>, TrackerError> {
        if self.pips.contains_key(&process_id) {
            return Err(TrackerError::AlreadyTracked(process_id));
        }

        let tracker = Arc::new(PipTracker::new(client_pid, process_id, payload, config)?);
        match self.pips.entry(process_id) {
            Entry::Occupied(_) => Err(TrackerError::AlreadyTracked(process_id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&tracker));
                debug!(
                    "Tracking pip {:#x} rooted at PID {} for client {}",
                    tracker.pip_id(),
                    process_id,
                    client_pid
                );
                Ok(tracker)
            }
        }
    }

    /// Maps a newly spawned descendant to its parent's tracker and grows
    /// the tree. None when the parent is not tracked or the child pid is
    /// already taken.
    pub fn track_child(&self, parent_pid: Pid, child_pid: Pid) -> Option<Arc<PipTracker>> {
        let tracker = self.find(parent_pid)?;
        match self.pips.entry(child_pid) {
            Entry::Occupied(_) => {
                warn!(
                    "PID {} is already tracked; ignoring fork from PID {}",
                    child_pid, parent_pid
                );
                None
            }
            Entry::Vacant(slot) => {
                tracker.attach_child();
                slot.insert(Arc::clone(&tracker));
                Some(tracker)
            }
        }
    }

    /// Tracker for a pid, if it belongs to a tracked tree.
    pub fn find(&self, pid: Pid) -> Option<Arc<PipTracker>> {
        self.pips.get(&pid).map(|entry| Arc::clone(entry.value()))
    }

    /// Unregisters an exited process and shrinks its tree. Returns the
    /// tracker when this was the last live member, i.e. teardown is now
    /// permitted; the caller holds the final reference.
    pub fn untrack(&self, pid: Pid) -> Option<Arc<PipTracker>> {
        let (_, tracker) = self.pips.remove(&pid)?;
        let remaining = tracker.detach_child();
        if remaining == 0 {
            debug!(
                "Pip {:#x} process tree is empty; releasing tracker",
                tracker.pip_id()
            );
            Some(tracker)
        } else {
            None
        }
    }

    /// Number of tracked processes across all pips.
    pub fn len(&self) -> usize {
        self.pips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pips.is_empty()
    }
}
