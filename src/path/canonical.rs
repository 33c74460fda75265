/*!
 * Canonical Paths
 * Immutable, normalized path values with a root-flavor tag
 *
 * A canonical path is absolute, free of `.`/`..` segments and duplicate
 * separators, and independent of process-global state such as the current
 * directory. The backing storage is shared between clones; derived
 * operations always produce new values and never mutate the receiver.
 *
 * Canonical form uses `/` as the sole separator for every flavor:
 * extended-prefix roots (`\\?\`) are stored as `//?/`, local-device roots
 * (`\\.\`) as `//./`, drive roots as `X:/`, and the POSIX root as `/`.
 * Comparisons are case-sensitive over the normalized text; callers on
 * case-folding filesystems must fold case before canonicalizing.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Longest accepted path, in bytes. Longer inputs fail canonicalization.
pub const MAX_PATH_LEN: usize = 4096;

/// Byte length of the `//?/` and `//./` root prefixes.
const TYPE_PREFIX_LEN: usize = 4;

/// Root flavor of a canonical path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Canonicalization failed; the value carries no path.
    Null,
    /// POSIX-rooted (`/...`) or drive-rooted (`X:/...`) path.
    Standard,
    /// Extended-prefix path (`\\?\...`, normalized to `//?/...`).
    ExtendedPrefix,
    /// Local-device path (`\\.\...`, normalized to `//./...`).
    DeviceLocal,
}

/// Immutable, normalized, shared-ownership path value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalPath {
    kind: PathKind,
    value: Option<Arc<str>>,
}

impl CanonicalPath {
    /// The Null path, carrying no value.
    pub const fn null() -> Self {
        Self {
            kind: PathKind::Null,
            value: None,
        }
    }

    /// Canonicalizes a raw path: classifies the root flavor, resolves
    /// `.`/`..` segments, and collapses duplicate separators. Returns the
    /// Null path when the input is relative, escapes above its root,
    /// exceeds [`MAX_PATH_LEN`], or embeds a NUL byte.
    pub fn canonicalize(raw: &str) -> Self {
        if raw.is_empty() || raw.len() > MAX_PATH_LEN || raw.contains('\0') {
            return Self::null();
        }

        let (kind, root, rest) = match classify_root(raw) {
            Some(parts) => parts,
            None => return Self::null(),
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in rest.split(is_separator) {
            match segment {
                "" | "." => continue,
                ".." => {
                    if segments.pop().is_none() {
                        // escape above the root
                        return Self::null();
                    }
                }
                _ => segments.push(segment),
            }
        }

        let mut value = String::with_capacity(root.len() + rest.len());
        value.push_str(&root);
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                value.push('/');
            }
            value.push_str(segment);
        }

        Self {
            kind,
            value: Some(value.into()),
        }
    }

    /// Whether canonicalization failed for this value.
    pub fn is_null(&self) -> bool {
        self.kind == PathKind::Null
    }

    /// Root flavor tag.
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// The full normalized path string, or None for the Null path.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Length of the normalized path string in bytes (0 for Null).
    pub fn len(&self) -> usize {
        self.value.as_deref().map_or(0, str::len)
    }

    /// Whether this value holds no path text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The path string with the `//?/` or `//./` root prefix omitted.
    pub fn without_type_prefix(&self) -> Option<&str> {
        let value = self.value.as_deref()?;
        match self.kind {
            PathKind::Null => None,
            PathKind::Standard => Some(value),
            PathKind::ExtendedPrefix | PathKind::DeviceLocal => Some(&value[TYPE_PREFIX_LEN..]),
        }
    }

    /// The final separator-delimited component, borrowed from this value's
    /// storage. None for the Null path or when already at the root.
    pub fn last_component(&self) -> Option<&str> {
        let value = self.value.as_deref()?;
        let tail = &value[self.root_len()..];
        if tail.is_empty() {
            return None;
        }
        Some(tail.rsplit('/').next().unwrap_or(tail))
    }

    /// Appends already-well-formed components, producing a new value that
    /// shares nothing with the receiver's tail. The caller guarantees
    /// `additional` contains no `.`/`..` segments; separators in it are
    /// normalized and collapsed. Returns Null when the receiver is Null or
    /// the result would exceed [`MAX_PATH_LEN`].
    pub fn extend(&self, additional: &str) -> CanonicalPath {
        let value = match self.value.as_deref() {
            Some(value) => value,
            None => return Self::null(),
        };

        let mut extended = String::with_capacity(value.len() + additional.len() + 1);
        extended.push_str(value);
        for segment in additional.split(is_separator).filter(|s| !s.is_empty()) {
            if !extended.ends_with('/') {
                extended.push('/');
            }
            extended.push_str(segment);
        }
        if extended.len() > MAX_PATH_LEN {
            return Self::null();
        }

        Self {
            kind: self.kind,
            value: Some(extended.into()),
        }
    }

    /// Strips the final component. Returns Null when no component can be
    /// removed (Null path or already at the root).
    pub fn remove_last_component(&self) -> CanonicalPath {
        let value = match self.value.as_deref() {
            Some(value) => value,
            None => return Self::null(),
        };
        let root_len = self.root_len();
        let tail = &value[root_len..];
        if tail.is_empty() {
            return Self::null();
        }

        let parent_len = match tail.rfind('/') {
            Some(idx) => root_len + idx,
            None => root_len,
        };
        Self {
            kind: self.kind,
            value: Some(value[..parent_len].into()),
        }
    }

    /// The root component: `/`, `X:/`, `//?/`, or `//./`. None for Null.
    pub fn root_component(&self) -> Option<&str> {
        let value = self.value.as_deref()?;
        Some(&value[..self.root_len()])
    }

    /// Path components below the root, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        let tail = match self.value.as_deref() {
            Some(value) => &value[self.root_len()..],
            None => "",
        };
        tail.split('/').filter(|s| !s.is_empty())
    }

    /// The root component followed by every segment. Distinct root flavors
    /// yield distinct leading components, so trie keys built from this
    /// never collide across flavors.
    pub fn components(&self) -> impl Iterator<Item = &str> + '_ {
        self.root_component().into_iter().chain(self.segments())
    }

    fn root_len(&self) -> usize {
        match (self.kind, self.value.as_deref()) {
            (PathKind::Null, _) | (_, None) => 0,
            (PathKind::ExtendedPrefix | PathKind::DeviceLocal, _) => TYPE_PREFIX_LEN,
            (PathKind::Standard, Some(value)) => {
                if value.starts_with('/') {
                    1
                } else {
                    // drive-rooted: "X:/"
                    3
                }
            }
        }
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value.as_deref().unwrap_or("<null>"))
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Splits a raw path into its kind, normalized root spelling, and the
/// remainder to segment. None when the root form is unrecognized.
fn classify_root(raw: &str) -> Option<(PathKind, String, &str)> {
    let bytes = raw.as_bytes();

    if bytes.len() >= TYPE_PREFIX_LEN
        && is_separator(bytes[0] as char)
        && is_separator(bytes[1] as char)
        && is_separator(bytes[3] as char)
    {
        match bytes[2] {
            b'?' => {
                return Some((
                    PathKind::ExtendedPrefix,
                    "//?/".to_string(),
                    &raw[TYPE_PREFIX_LEN..],
                ))
            }
            b'.' => {
                return Some((
                    PathKind::DeviceLocal,
                    "//./".to_string(),
                    &raw[TYPE_PREFIX_LEN..],
                ))
            }
            _ => {}
        }
    }

    if is_separator(bytes[0] as char) {
        return Some((PathKind::Standard, "/".to_string(), &raw[1..]));
    }

    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        // drive-rooted; "X:foo" (drive-relative) is not accepted
        if bytes.len() == 2 || is_separator(bytes[2] as char) {
            let root = format!("{}:/", bytes[0] as char);
            return Some((PathKind::Standard, root, &raw[2..]));
        }
    }

    None
}
