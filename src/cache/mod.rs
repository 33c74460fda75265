/*!
 * Decision Caching
 * Path-indexed decision cache, per-thread memo, and the adaptive governor
 */

pub mod governor;
pub mod last_lookup;
pub mod trie;

pub use governor::{CacheGovernor, CounterSnapshot};
pub use last_lookup::ThreadLastLookup;
pub use trie::DecisionTrie;
