//! Bounded TTL response cache with LRU eviction
//!
//! Every widget and integration fetch goes through one of these caches so
//! free upstream APIs are not hammered on every dashboard poll. Entries
//! carry the instant they were stored; an entry older than its TTL is a
//! miss for fresh reads but is retained and served as a fallback when the
//! refetch fails (serve-stale-on-error).
//!
//! The container is bounded: once `max_entries` is exceeded the
//! least-recently-used entry is evicted. Both reads and writes move the
//! touched entry to the most-recently-used position. Entries are never
//! destroyed by TTL alone.
//!
//! # Concurrency
//!
//! Lookup+reorder and insert+evict are mutually exclusive critical
//! sections, but the fetch future itself runs outside the lock so a slow
//! upstream does not serialize unrelated keys. There is no key-level
//! single-flight guarantee: two concurrent misses on the same key may both
//! invoke their fetch. That is a known limitation, acceptable at dashboard
//! request volumes.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default bound on the number of cached entries.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Thread-safe TTL cache with LRU eviction, keyed by string.
///
/// The backing store is a vector ordered from least- to most-recently
/// used; linear scans are fine at the configured bound (50 entries).
pub struct ResponseCache<V> {
    max_entries: usize,
    entries: Mutex<Vec<(String, CacheEntry<V>)>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache bounded to `max_entries`.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Look up `key`, invoking `fetch` on a miss or stale entry.
    ///
    /// - Fresh hit (younger than `ttl`): the cached value is returned and
    ///   the entry moves to the most-recently-used position. `fetch` is
    ///   not invoked.
    /// - Otherwise `fetch` runs outside the lock. On success the result
    ///   is stored with the current instant and LRU entries are evicted
    ///   until the bound holds. On failure any existing entry for `key`
    ///   (however stale) is returned unchanged; with no fallback the
    ///   result is `None`.
    ///
    /// Fetch failures are logged at `warn` and swallowed. Callers must
    /// treat `None` as "temporarily unavailable", not as an error to
    /// retry synchronously.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::error::Result<V>>,
    {
        {
            let mut entries = self.lock();
            if let Some(pos) = entries.iter().position(|(k, _)| k == key) {
                if entries[pos].1.stored_at.elapsed() < ttl {
                    let entry = entries.remove(pos);
                    let value = entry.1.value.clone();
                    entries.push(entry);
                    return Some(value);
                }
            }
        }

        match fetch().await {
            Ok(value) => {
                let mut entries = self.lock();
                if let Some(pos) = entries.iter().position(|(k, _)| k == key) {
                    entries.remove(pos);
                }
                entries.push((
                    key.to_string(),
                    CacheEntry {
                        value: value.clone(),
                        stored_at: Instant::now(),
                    },
                ));
                while entries.len() > self.max_entries {
                    let (evicted, _) = entries.remove(0);
                    tracing::debug!(key = %evicted, "evicted least-recently-used cache entry");
                }
                Some(value)
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "cache fetch failed, serving stale if available");
                let entries = self.lock();
                entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, entry)| entry.value.clone())
            }
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, CacheEntry<V>)>> {
        // A poisoned lock only means a panic mid-mutation elsewhere; the
        // vector is still structurally valid.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
