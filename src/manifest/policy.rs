/*!
 * Manifest Parsing and Queries
 * Scope-rule tree built from the payload, queried per canonical path
 */

use crate::core::errors::ManifestError;
use crate::core::types::PipId;
use crate::manifest::image::{ManifestImage, MANIFEST_VERSION};
use crate::manifest::types::AccessDecision;
use crate::path::CanonicalPath;
use ahash::RandomState;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RuleNode {
    decision: Option<AccessDecision>,
    children: HashMap<Box<str>, RuleNode, RandomState>,
}

/// Parsed access-policy ruleset for one pip.
///
/// Read-only after construction; queries are lock-free and take no shared
/// mutable state.
#[derive(Debug)]
pub struct PolicyManifest {
    pip_id: PipId,
    default_decision: AccessDecision,
    root: RuleNode,
    rule_count: usize,
}

impl PolicyManifest {
    /// Parses a manifest payload. A malformed payload yields an error and
    /// no manifest.
    pub fn parse(payload: &[u8]) -> Result<Self, ManifestError> {
        if payload.is_empty() {
            return Err(ManifestError::EmptyPayload);
        }

        let image: ManifestImage =
            bincode::deserialize(payload).map_err(|e| ManifestError::Decode(e.to_string()))?;
        if image.version != MANIFEST_VERSION {
            return Err(ManifestError::UnsupportedVersion {
                found: image.version,
                expected: MANIFEST_VERSION,
            });
        }

        let mut root = RuleNode::default();
        let mut rule_count = 0;
        for rule in &image.rules {
            let scope = CanonicalPath::canonicalize(&rule.scope);
            if scope.is_null() {
                return Err(ManifestError::InvalidScope(rule.scope.clone()));
            }
            let mut node = &mut root;
            for component in scope.components() {
                node = node.children.entry(component.into()).or_default();
            }
            if node.decision.replace(rule.decision).is_none() {
                rule_count += 1;
            }
        }

        Ok(Self {
            pip_id: image.pip_id,
            default_decision: image.default_decision,
            root,
            rule_count,
        })
    }

    /// Decision for a canonical path: the deepest scope with an explicit
    /// rule wins; paths outside every scope get the default decision.
    /// Always yields a decision.
    pub fn query(&self, path: &CanonicalPath) -> AccessDecision {
        let mut node = &self.root;
        let mut decision = self.default_decision;
        for component in path.components() {
            match node.children.get(component) {
                Some(child) => {
                    node = child;
                    if let Some(ruled) = node.decision {
                        decision = ruled;
                    }
                }
                None => break,
            }
        }
        decision
    }

    /// Decision applied to paths that match no scope, including paths
    /// that failed canonicalization.
    pub fn default_decision(&self) -> AccessDecision {
        self.default_decision
    }

    /// Unique identifier of the pip this manifest belongs to.
    pub fn pip_id(&self) -> PipId {
        self.pip_id
    }

    /// Number of distinct ruled scopes.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }
}
