/*!
 * Pip Sandbox Core
 * Per-pip file-access decision tracking for a sandboxed build engine
 *
 * A "pip" is one monitored build step together with the process tree it
 * spawns. The hook layer that intercepts file operations routes each one
 * here; the tracker canonicalizes the path, consults its per-thread memo
 * and decision trie, falls back to the pip's access-policy manifest, and
 * returns the allow/deny/report decision. An adaptive governor abandons
 * the decision cache for pips whose access patterns make it unproductive.
 */

pub mod cache;
pub mod core;
pub mod manifest;
pub mod path;
pub mod tracker;

// Re-exports
pub use crate::core::config::TrackerConfig;
pub use crate::core::errors::{ManifestError, TrackerError};
pub use crate::core::types::{Pid, PipId, TrackerResult};
pub use cache::{CacheGovernor, CounterSnapshot, DecisionTrie, ThreadLastLookup};
pub use manifest::{AccessDecision, AccessVerdict, ManifestBuilder, PolicyManifest};
pub use path::{CanonicalPath, PathKind};
pub use tracker::{PipInfo, PipRegistry, PipTracker};
