/*!
 * Decision Types
 * Allow/deny verdicts and the report flag attached to file operations
 */

use serde::{Deserialize, Serialize};

/// Allow or deny verdict for a single file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessVerdict {
    Allow,
    Deny,
}

/// Manifest-derived decision for a single file operation: the verdict plus
/// whether the access must be reported back to the build engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessDecision {
    pub verdict: AccessVerdict,
    pub report: bool,
}

impl AccessDecision {
    /// Allowed, unreported.
    pub const fn allow() -> Self {
        Self {
            verdict: AccessVerdict::Allow,
            report: false,
        }
    }

    /// Denied, unreported.
    pub const fn deny() -> Self {
        Self {
            verdict: AccessVerdict::Deny,
            report: false,
        }
    }

    /// Same verdict with the report flag set as given.
    pub const fn with_report(self, report: bool) -> Self {
        Self {
            verdict: self.verdict,
            report,
        }
    }

    /// Whether the operation may proceed.
    pub const fn is_allowed(&self) -> bool {
        matches!(self.verdict, AccessVerdict::Allow)
    }

    /// Whether the access must be reported to the build engine.
    pub const fn must_report(&self) -> bool {
        self.report
    }

    /// Compact encoding for atomic decision slots. Never returns 0, which
    /// is reserved as the absent sentinel.
    pub(crate) const fn to_bits(self) -> u8 {
        let mut bits = 0b001;
        if matches!(self.verdict, AccessVerdict::Deny) {
            bits |= 0b010;
        }
        if self.report {
            bits |= 0b100;
        }
        bits
    }

    /// Inverse of [`Self::to_bits`]; None for the absent sentinel.
    pub(crate) const fn from_bits(bits: u8) -> Option<Self> {
        if bits & 0b001 == 0 {
            return None;
        }
        Some(Self {
            verdict: if bits & 0b010 != 0 {
                AccessVerdict::Deny
            } else {
                AccessVerdict::Allow
            },
            report: bits & 0b100 != 0,
        })
    }
}
