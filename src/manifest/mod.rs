/*!
 * Access-Policy Manifest
 * Parsing and querying of the per-pip file-access policy payload
 *
 * Every pip is launched with a manifest: the declarative description of
 * which file accesses are permitted, which are denied, and which must be
 * reported back to the build engine. The payload is an opaque byte buffer
 * to everyone but this module.
 */

mod builder;
mod image;
mod policy;
mod types;

pub use builder::ManifestBuilder;
pub use policy::PolicyManifest;
pub use types::{AccessDecision, AccessVerdict};
