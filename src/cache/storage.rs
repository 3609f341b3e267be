//! In-memory TTL cache storage
//!
//! Entries expire lazily on read and in bulk via [`MemoryCache::sweep_expired`],
//! which the background sweeper calls on a timer. There is no size bound.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::clock::{Clock, SystemClock};

/// A cached value with its lifetime
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// Valid up to and including `expires_at`
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Process-local key/value cache with per-entry TTL.
///
/// Shared between tasks behind an `Arc`; every operation takes the internal
/// lock for the duration of a single map access and never across an await.
pub struct MemoryCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> MemoryCache<V> {
    /// Create a cache using the system clock
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite `key`, expiring after `ttl` (or the default TTL)
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let now = self.clock.now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.lock().insert(
            key.to_string(),
            CacheEntry { value, expires_at },
        );
    }

    /// Get a value if it has not expired.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            log::debug!("Cache entry expired: {}", key);
        }
        None
    }

    /// Remove a single entry, returning whether it existed
    #[allow(dead_code)]
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry whose key contains `pattern`
    pub fn delete_pattern(&self, pattern: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        before - entries.len()
    }

    /// Remove all entries
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Remove all entries that expired before now
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Point-in-time statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.lock();
        let total_entries = entries.len();
        let valid_entries = entries.values().filter(|e| !e.is_expired(now)).count();

        CacheStats {
            total_entries,
            valid_entries,
            expired_entries: total_entries - valid_entries,
            default_ttl_minutes: self.default_ttl.as_secs() / 60,
        }
    }

    /// Return the cached value for `key`, or run `producer` and cache its result.
    ///
    /// Errors from `producer` are returned as-is and leave the cache untouched.
    /// Two concurrent misses on the same key both run their producer; the
    /// later write wins.
    pub async fn wrap<F, Fut, E>(&self, key: &str, ttl: Option<Duration>, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            log::debug!("Cache hit: {}", key);
            return Ok(value);
        }

        log::debug!("Cache miss: {}", key);
        let value = producer().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }
}

/// Statistics about cache state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub default_ttl_minutes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_cache() -> (MemoryCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_clock(Duration::from_secs(15 * 60), clock.clone());
        (cache, clock)
    }

    fn minutes(m: u64) -> Option<Duration> {
        Some(Duration::from_secs(m * 60))
    }

    #[test]
    fn test_set_then_get() {
        let (cache, clock) = test_cache();

        cache.set("figma:metadata:123:456", "Hero".to_string(), minutes(10));
        clock.advance(chrono::Duration::minutes(9));

        assert_eq!(cache.get("figma:metadata:123:456"), Some("Hero".to_string()));
    }

    #[test]
    fn test_valid_at_exact_expiry() {
        let (cache, clock) = test_cache();

        cache.set("k", "v".to_string(), minutes(10));
        clock.advance(chrono::Duration::minutes(10));

        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_expired_read_removes_entry() {
        let (cache, clock) = test_cache();

        cache.set("figma:metadata:123:456", "Hero".to_string(), minutes(10));
        cache.set("other", "x".to_string(), minutes(60));
        let before = cache.stats().total_entries;

        clock.advance(chrono::Duration::minutes(11));

        assert_eq!(cache.get("figma:metadata:123:456"), None);
        assert_eq!(cache.stats().total_entries, before - 1);
    }

    #[test]
    fn test_default_ttl_applies() {
        let (cache, clock) = test_cache();

        cache.set("k", "v".to_string(), None);
        clock.advance(chrono::Duration::minutes(14));
        assert!(cache.get("k").is_some());

        clock.advance(chrono::Duration::minutes(2));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let (cache, _clock) = test_cache();

        cache.set("k", "old".to_string(), None);
        cache.set("k", "new".to_string(), None);

        assert_eq!(cache.get("k"), Some("new".to_string()));
        assert_eq!(cache.stats().total_entries, 1);
    }

    #[test]
    fn test_delete() {
        let (cache, _clock) = test_cache();

        cache.set("k", "v".to_string(), None);

        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_delete_pattern() {
        let (cache, _clock) = test_cache();

        cache.set("figma:metadata:123:456", "a".to_string(), None);
        cache.set("figma:code:123:456", "b".to_string(), None);
        cache.set("figma:metadata:999:000", "c".to_string(), None);

        let removed = cache.delete_pattern("123:456");

        assert_eq!(removed, 2);
        assert!(cache.get("figma:metadata:123:456").is_none());
        assert!(cache.get("figma:code:123:456").is_none());
        assert_eq!(cache.get("figma:metadata:999:000"), Some("c".to_string()));
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = test_cache();

        cache.set("k1", "a".to_string(), None);
        cache.set("k2", "b".to_string(), None);

        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_stats_counts_expired_until_sweep() {
        let (cache, clock) = test_cache();

        cache.set("short", "a".to_string(), minutes(1));
        cache.set("long", "b".to_string(), minutes(60));
        clock.advance(chrono::Duration::minutes(5));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.default_ttl_minutes, 15);

        assert_eq!(cache.sweep_expired(), 1);

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 0);
    }

    #[tokio::test]
    async fn test_wrap_calls_producer_once() {
        let (cache, _clock) = test_cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<String, String> = cache
                .wrap("k", minutes(10), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("fresh".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "fresh");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wrap_does_not_cache_errors() {
        let (cache, _clock) = test_cache();

        let failed: Result<String, String> = cache
            .wrap("k", minutes(10), || async { Err("upstream down".to_string()) })
            .await;
        assert_eq!(failed.unwrap_err(), "upstream down");
        assert_eq!(cache.stats().total_entries, 0);

        let calls = AtomicUsize::new(0);
        let recovered: Result<String, String> = cache
            .wrap("k", minutes(10), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("ok".to_string())
            })
            .await;

        assert_eq!(recovered.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wrap_refetches_after_expiry() {
        let (cache, clock) = test_cache();
        let calls = AtomicUsize::new(0);

        let produce = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("v".to_string())
        };

        cache.wrap("k", minutes(10), produce).await.unwrap();
        clock.advance(chrono::Duration::minutes(11));
        cache.wrap("k", minutes(10), produce).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
