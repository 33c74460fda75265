/*!
 * Manifest Wire Image
 * Versioned serde shape of the manifest payload
 */

use crate::core::types::PipId;
use crate::manifest::types::AccessDecision;
use serde::{Deserialize, Serialize};

/// Current payload format version. Bumped on any incompatible change.
pub(crate) const MANIFEST_VERSION: u32 = 1;

/// The bincode-encoded payload shape exchanged with the build engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ManifestImage {
    pub version: u32,
    pub pip_id: PipId,
    /// Applied to paths outside every rule scope.
    pub default_decision: AccessDecision,
    pub rules: Vec<RuleImage>,
}

/// One scope rule: the decision applies to the scope path and everything
/// under it, unless a deeper rule overrides it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RuleImage {
    pub scope: String,
    pub decision: AccessDecision,
}
