/*!
 * Core Types
 * Common types used across the tracker
 */

/// Process ID type
pub type Pid = u32;

/// Unique identifier of a pip (one monitored build step)
pub type PipId = u64;

/// Common result type for tracker operations
pub type TrackerResult<T> = Result<T, super::errors::TrackerError>;
