//! Time-bounded result cache with an injectable clock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tokio::sync::Mutex;

/// Default maximum entries before the oldest insertion is dropped.
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 1024;

/// Source of monotonic time for cache ages.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Used to test expiry.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

struct CacheEntry<V> {
    inserted_at: Instant,
    value: V,
}

/// A string-keyed cache whose entries expire a fixed time after insertion.
///
/// Expired entries are removed lazily when their key is next read. Reads do
/// not extend an entry's life. Concurrent inserts for one key are last-writer-wins.
pub struct TtlCache<V> {
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<IndexMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache using the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entries: DEFAULT_MAX_CACHE_ENTRIES,
            clock,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Set the entry cap.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if it is younger than the TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) < self.ttl {
            return Some(entry.value.clone());
        }

        entries.shift_remove(key);
        None
    }

    /// Insert or overwrite a value, stamping it with the current time.
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let inserted_at = self.clock.now();
        let mut entries = self.entries.lock().await;

        // Remove first so an overwrite moves to the newest position.
        entries.shift_remove(&key);
        entries.insert(key, CacheEntry { inserted_at, value });

        while entries.len() > self.max_entries {
            entries.shift_remove_index(0);
        }
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries, including expired ones not yet read.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_cache(ttl_secs: u64) -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let (cache, clock) = manual_cache(300);
        cache.insert("1.2.3.4", "Berlin".to_string()).await;

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get("1.2.3.4").await, Some("Berlin".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_read() {
        let (cache, clock) = manual_cache(300);
        cache.insert("1.2.3.4", "Berlin".to_string()).await;

        clock.advance(Duration::from_secs(300));
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("1.2.3.4").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_read_does_not_refresh() {
        let (cache, clock) = manual_cache(10);
        cache.insert("k", "v".to_string()).await;

        clock.advance(Duration::from_secs(6));
        assert!(cache.get("k").await.is_some());
        clock.advance(Duration::from_secs(6));
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_resets_age() {
        let (cache, clock) = manual_cache(10);
        cache.insert("k", "old".to_string()).await;
        clock.advance(Duration::from_secs(8));
        cache.insert("k", "new".to_string()).await;
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get("k").await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_cap_drops_oldest() {
        let cache = TtlCache::new(Duration::from_secs(60)).with_max_entries(2);
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        cache.insert("c", 3).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
