/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Manifest payload errors surfaced during tracker construction
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ManifestError {
    #[error("Manifest payload is empty")]
    #[diagnostic(
        code(manifest::empty_payload),
        help("The build engine must supply a non-empty manifest payload for every pip.")
    )]
    EmptyPayload,

    #[error("Unsupported manifest version {found} (expected {expected})")]
    #[diagnostic(
        code(manifest::unsupported_version),
        help("The build engine and the sandbox must come from matching releases.")
    )]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Failed to decode manifest payload: {0}")]
    #[diagnostic(
        code(manifest::decode_failed),
        help("The payload bytes do not form a valid manifest image.")
    )]
    Decode(String),

    #[error("Failed to encode manifest image: {0}")]
    #[diagnostic(
        code(manifest::encode_failed),
        help("The manifest image could not be serialized. Check rule contents.")
    )]
    Encode(String),

    #[error("Manifest scope is not an absolute path: {0}")]
    #[diagnostic(
        code(manifest::invalid_scope),
        help("Every rule scope must canonicalize to an absolute path.")
    )]
    InvalidScope(String),
}

/// Tracker lifecycle errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TrackerError {
    #[error("Rejected manifest: {0}")]
    #[diagnostic(
        code(tracker::manifest_rejected),
        help("The pip cannot be launched. Fix the manifest payload and retry the build step.")
    )]
    ManifestRejected(#[from] ManifestError),

    #[error("Process {0} is already tracked")]
    #[diagnostic(
        code(tracker::already_tracked),
        help("A process can belong to at most one pip at a time.")
    )]
    AlreadyTracked(Pid),
}
