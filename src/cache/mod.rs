//! In-process cache for Figma API responses
//!
//! A TTL map shared by every request in the process, plus the cached
//! client wrapper that routes each Figma resource through it.

pub mod client;
pub mod clock;
pub mod key;
pub mod storage;
pub mod sweeper;

use std::time::Duration;

use crate::config::{CacheSettings, minutes};

/// Default cache TTLs per resource type
pub struct CacheTtl;

impl CacheTtl {
    /// Used when a resource has no TTL of its own
    pub const DEFAULT: Duration = Duration::from_secs(15 * 60); // 15 min

    // Node trees change while designers work
    pub const METADATA: Duration = Duration::from_secs(10 * 60); // 10 min
    pub const VARIABLES: Duration = Duration::from_secs(20 * 60); // 20 min

    // File-level info and rendered images move slowly
    pub const FILE: Duration = Duration::from_secs(30 * 60); // 30 min
    pub const SCREENSHOT: Duration = Duration::from_secs(60 * 60); // 1 hr

    pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60); // 5 min
}

/// Effective TTL per resource, after config overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// TTL for entries stored without a resource-specific one
    pub default: Duration,
    pub metadata: Duration,
    pub file: Duration,
    pub screenshot: Duration,
    pub variables: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            default: CacheTtl::DEFAULT,
            metadata: CacheTtl::METADATA,
            file: CacheTtl::FILE,
            screenshot: CacheTtl::SCREENSHOT,
            variables: CacheTtl::VARIABLES,
        }
    }
}

impl From<&CacheSettings> for TtlPolicy {
    fn from(settings: &CacheSettings) -> Self {
        let ttl = &settings.ttl;
        Self {
            default: settings.default_ttl(),
            metadata: ttl.metadata.map(minutes).unwrap_or(CacheTtl::METADATA),
            file: ttl.file.map(minutes).unwrap_or(CacheTtl::FILE),
            screenshot: ttl.screenshot.map(minutes).unwrap_or(CacheTtl::SCREENSHOT),
            variables: ttl.variables.map(minutes).unwrap_or(CacheTtl::VARIABLES),
        }
    }
}

// Re-export main types
pub use client::CachedFigmaClient;
pub use key::{ResourceKind, cache_key};
pub use storage::{CacheStats, MemoryCache};
pub use sweeper::Sweeper;
