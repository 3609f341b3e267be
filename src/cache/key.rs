//! Cache key derivation
//!
//! Keys are plain strings so invalidation can match on substrings:
//! `figma:<resource>:<id>` with an optional `?name=value&...` suffix.

use std::fmt;

/// Namespace prefix shared by every key this crate writes
pub const NAMESPACE: &str = "figma";

/// Resource types that can appear in a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Metadata,
    /// Derived from metadata, never stored on its own
    Code,
    Screenshot,
    Variables,
    File,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Metadata => "metadata",
            ResourceKind::Code => "code",
            ResourceKind::Screenshot => "screenshot",
            ResourceKind::Variables => "variables",
            ResourceKind::File => "file",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a deterministic cache key for a resource.
///
/// Parameters are sorted by name before encoding, so callers may pass them
/// in any order and still land on the same slot.
pub fn cache_key(kind: ResourceKind, id: &str, params: &[(&str, &str)]) -> String {
    let mut key = format!("{}:{}:{}", NAMESPACE, kind, id);

    if params.is_empty() {
        return key;
    }

    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by_key(|(k, _)| *k);

    let encoded: Vec<String> = sorted_params
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    key.push('?');
    key.push_str(&encoded.join("&"));
    key
}
