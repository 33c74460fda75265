/*!
 * Path Handling
 * Canonical path values shared across the tracker
 */

pub mod canonical;

pub use canonical::{CanonicalPath, PathKind, MAX_PATH_LEN};
