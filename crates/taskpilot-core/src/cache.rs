//! Time-bounded memoization map.
//!
//! A small TTL map with a hard capacity. When the map is full, expired
//! entries are purged first; if that frees nothing, the least recently used
//! entry is evicted by a linear scan. Capacities are expected to stay in the
//! tens to low hundreds, where a scan is cheaper than maintaining a list.
//!
//! Callers pass the current time explicitly, which keeps expiry
//! deterministic under test.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
    last_access: DateTime<Utc>,
}

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// TTL map with linear-scan LRU eviction.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache. A capacity of 0 disables storage entirely.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            ttl,
            capacity,
            stats: CacheStats::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.inserted_at >= self.ttl
    }

    /// Look up a live entry, refreshing its recency.
    ///
    /// Expired entries are dropped on access.
    pub fn get(&mut self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        let expired = match self.entries.get(key) {
            Some(entry) => self.is_expired(entry, now),
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.stats.misses += 1;
            return None;
        }

        self.stats.hits += 1;
        let entry = self.entries.get_mut(key)?;
        entry.last_access = now;
        Some(&entry.value)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        if self.capacity == 0 {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired(now);
            if self.entries.len() >= self.capacity {
                self.evict_lru();
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                last_access: now,
            },
        );
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, now: DateTime<Utc>, compute: F) -> V
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key, now) {
            return value.clone();
        }
        let value = compute();
        self.insert(key, value.clone(), now);
        value
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| now - entry.inserted_at < ttl);
        let purged = before - self.entries.len();
        if purged > 0 {
            tracing::trace!(purged, "purged expired cache entries");
        }
        purged
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_lru(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            self.entries.remove(&key);
            self.stats.evictions += 1;
            tracing::trace!(size = self.entries.len(), "evicted least recently used cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = TtlCache::new(Duration::seconds(60), 10);
        cache.insert("a", 1, t0());
        assert_eq!(cache.get(&"a", t0() + Duration::seconds(59)), Some(&1));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_expired_entry_is_removed_on_access() {
        let mut cache = TtlCache::new(Duration::seconds(60), 10);
        cache.insert("a", 1, t0());
        assert_eq!(cache.get(&"a", t0() + Duration::seconds(60)), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_lru_eviction_when_full() {
        let mut cache = TtlCache::new(Duration::minutes(10), 2);
        cache.insert("a", 1, t0());
        cache.insert("b", 2, t0() + Duration::seconds(1));
        // touch "a" so "b" becomes the least recently used
        cache.get(&"a", t0() + Duration::seconds(2));
        cache.insert("c", 3, t0() + Duration::seconds(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&"b", t0() + Duration::seconds(4)).is_none());
        assert_eq!(cache.get(&"a", t0() + Duration::seconds(4)), Some(&1));
        assert_eq!(cache.get(&"c", t0() + Duration::seconds(4)), Some(&3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_full_cache_prefers_purging_expired() {
        let mut cache = TtlCache::new(Duration::seconds(30), 2);
        cache.insert("old", 1, t0());
        cache.insert("fresh", 2, t0() + Duration::seconds(25));
        cache.insert("new", 3, t0() + Duration::seconds(40));

        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get(&"fresh", t0() + Duration::seconds(41)), Some(&2));
        assert_eq!(cache.get(&"new", t0() + Duration::seconds(41)), Some(&3));
    }

    #[test]
    fn test_replacing_key_does_not_evict() {
        let mut cache = TtlCache::new(Duration::seconds(30), 1);
        cache.insert("a", 1, t0());
        cache.insert("a", 2, t0());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a", t0()), Some(&2));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = TtlCache::new(Duration::seconds(30), 0);
        cache.insert("a", 1, t0());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_insert_with_memoizes() {
        let mut cache = TtlCache::new(Duration::seconds(30), 4);
        let mut calls = 0;
        let first = cache.get_or_insert_with("k", t0(), || {
            calls += 1;
            42
        });
        let second = cache.get_or_insert_with("k", t0() + Duration::seconds(5), || {
            calls += 1;
            0
        });
        assert_eq!((first, second), (42, 42));
        assert_eq!(calls, 1);

        let third = cache.get_or_insert_with("k", t0() + Duration::seconds(31), || 7);
        assert_eq!(third, 7);
    }

    #[test]
    fn test_purge_expired_counts() {
        let mut cache = TtlCache::new(Duration::seconds(10), 10);
        cache.insert(1, "a", t0());
        cache.insert(2, "b", t0() + Duration::seconds(8));
        assert_eq!(cache.purge_expired(t0() + Duration::seconds(12)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let mut cache = TtlCache::new(Duration::seconds(10), 10);
        assert_eq!(cache.stats().hit_rate(), 0.0);
        cache.insert(1, 1, t0());
        cache.get(&1, t0());
        cache.get(&2, t0());
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }
}
