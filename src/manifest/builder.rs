/*!
 * Manifest Builder
 * Engine-side construction of manifest payload bytes
 */

use crate::core::errors::ManifestError;
use crate::core::types::PipId;
use crate::manifest::image::{ManifestImage, RuleImage, MANIFEST_VERSION};
use crate::manifest::types::AccessDecision;

/// Builds the byte payload consumed by
/// [`PolicyManifest::parse`](crate::manifest::PolicyManifest::parse).
///
/// The default decision starts as deny-and-report, the safe posture for a
/// pip whose manifest names no scope for a path.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    image: ManifestImage,
}

impl ManifestBuilder {
    pub fn new(pip_id: PipId) -> Self {
        Self {
            image: ManifestImage {
                version: MANIFEST_VERSION,
                pip_id,
                default_decision: AccessDecision::deny().with_report(true),
                rules: Vec::new(),
            },
        }
    }

    /// Decision applied to paths outside every rule scope.
    pub fn default_decision(mut self, decision: AccessDecision) -> Self {
        self.image.default_decision = decision;
        self
    }

    /// Adds a scope rule: `decision` applies to `scope` and everything
    /// under it unless a deeper rule overrides it. The scope must
    /// canonicalize to an absolute path; that is checked at parse time.
    pub fn rule(mut self, scope: impl Into<String>, decision: AccessDecision) -> Self {
        self.image.rules.push(RuleImage {
            scope: scope.into(),
            decision,
        });
        self
    }

    /// Serializes the payload image.
    pub fn build(&self) -> Result<Vec<u8>, ManifestError> {
        bincode::serialize(&self.image).map_err(|e| ManifestError::Encode(e.to_string()))
    }
}
