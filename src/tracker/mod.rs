/*!
 * Pip Tracking
 * Per-pip state and the process-to-pip routing registry
 */

pub mod pip;
pub mod registry;

pub use pip::{PipInfo, PipTracker};
pub use registry::PipRegistry;
