use super::{lookup, CachePolicy, PutOutcome};
use crate::cache::{
    store::EntryStore,
    types::{CacheKey, CacheStats, CacheValue, PolicyKind, Timestamp},
};
use std::num::NonZeroUsize;
use tracing::debug;

/// Capacity-bounded least-recently-used cache
///
/// A hit makes the entry most recently used. Inserting into a full cache evicts
/// the least recently used entry first, so the entry count never exceeds the
/// capacity. Recency is a strict order, so eviction ties cannot occur.
#[derive(Debug)]
pub struct LruPolicy {
    capacity: NonZeroUsize,
    store: EntryStore,
    stats: CacheStats,
}

impl LruPolicy {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            store: EntryStore::with_capacity(capacity.get()),
            stats: CacheStats::default(),
        }
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.store.keys_by_recency()
    }
}

impl CachePolicy for LruPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }

    fn get(&mut self, key: &str, now: Timestamp) -> Option<CacheValue> {
        lookup(&mut self.store, &mut self.stats, key, now)
    }

    fn put(&mut self, key: CacheKey, value: CacheValue, now: Timestamp) -> PutOutcome {
        if self.store.contains_key(&key) {
            self.store.upsert(key, value, now, None);
            self.stats.updates += 1;
            return PutOutcome::updated();
        }

        let mut outcome = PutOutcome::inserted();
        if self.store.len() >= self.capacity.get() {
            if let Some(evicted) = self.store.pop_least_recent() {
                debug!("Evicting LRU entry: {}", evicted.key);
                self.stats.evictions += 1;
                outcome.evicted = Some(evicted.key);
            }
        }

        self.store.upsert(key, value, now, None);
        self.stats.inserts += 1;
        self.stats.observe_len(self.store.len());
        outcome
    }

    fn sweep_expired(&mut self, _now: Timestamp) -> usize {
        0
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity.get())
    }

    fn ttl(&self) -> Option<u64> {
        None
    }

    fn clear(&mut self) {
        self.store.clear();
    }

    fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn lru(capacity: usize) -> LruPolicy {
        LruPolicy::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn put(cache: &mut LruPolicy, key: &str, now: Timestamp) -> PutOutcome {
        cache.put(key.to_string(), Arc::from(key), now)
    }

    #[test]
    fn test_basic_put_and_get() {
        let mut cache = lru(10);
        put(&mut cache, "key1", 0);

        assert_eq!(cache.get("key1", 1).as_deref(), Some("key1"));
        assert!(cache.get("missing", 2).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
    }

    #[test]
    fn test_miss_does_not_insert() {
        let mut cache = lru(2);
        assert!(cache.get("key1", 0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = lru(3);
        put(&mut cache, "key1", 0);
        put(&mut cache, "key2", 1);
        put(&mut cache, "key3", 2);

        // Access key1 so key2 becomes least recently used
        cache.get("key1", 3);

        let outcome = put(&mut cache, "key4", 4);
        assert_eq!(outcome.evicted.as_deref(), Some("key2"));
        assert!(outcome.triggered_eviction());

        assert!(cache.get("key2", 5).is_none());
        assert!(cache.get("key1", 6).is_some());
        assert!(cache.get("key3", 7).is_some());
        assert!(cache.get("key4", 8).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_update_does_not_evict() {
        let mut cache = lru(2);
        put(&mut cache, "a", 0);
        put(&mut cache, "b", 1);

        let outcome = put(&mut cache, "a", 2);
        assert_eq!(outcome, PutOutcome::updated());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.keys_by_recency(), vec!["b", "a"]);
        assert_eq!(cache.stats().updates, 1);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut cache = lru(5);
        for i in 0..100u64 {
            let key = format!("key{}", i % 17);
            if cache.get(&key, i).is_none() {
                cache.put(key, Arc::from("v"), i);
            }
            assert!(cache.len() <= 5);
        }
        assert_eq!(cache.stats().peak_entries, 5);
    }

    #[test]
    fn test_sweep_is_noop() {
        let mut cache = lru(2);
        put(&mut cache, "a", 0);
        assert_eq!(cache.sweep_expired(u64::MAX), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_keeps_stats() {
        let mut cache = lru(2);
        put(&mut cache, "a", 0);
        cache.get("a", 1);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 1);
    }
}
