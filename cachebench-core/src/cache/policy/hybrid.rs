use super::{expire_if_stale, lookup, reclaim_expired, CachePolicy, PutOutcome};
use crate::cache::{
    store::EntryStore,
    types::{CacheKey, CacheStats, CacheValue, PolicyKind, Timestamp},
};
use std::num::{NonZeroU64, NonZeroUsize};
use tracing::debug;

/// Capacity-bounded and TTL-bounded cache
///
/// Expiry always takes precedence over recency: a lookup first drops an expired
/// entry (a miss), and only a live entry is promoted to most recently used.
/// When a put finds the cache full it first reclaims expired entries and only
/// evicts the least recently used live entry if that did not free a slot.
#[derive(Debug)]
pub struct TtlLruPolicy {
    capacity: NonZeroUsize,
    ttl: NonZeroU64,
    store: EntryStore,
    stats: CacheStats,
}

impl TtlLruPolicy {
    pub fn new(capacity: NonZeroUsize, ttl: NonZeroU64) -> Self {
        Self {
            capacity,
            ttl,
            store: EntryStore::with_capacity(capacity.get()),
            stats: CacheStats::default(),
        }
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.store.keys_by_recency()
    }
}

impl CachePolicy for TtlLruPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::TtlLru
    }

    fn get(&mut self, key: &str, now: Timestamp) -> Option<CacheValue> {
        if expire_if_stale(&mut self.store, &mut self.stats, key, now) {
            self.stats.misses += 1;
            return None;
        }
        lookup(&mut self.store, &mut self.stats, key, now)
    }

    fn put(&mut self, key: CacheKey, value: CacheValue, now: Timestamp) -> PutOutcome {
        let mut expired = usize::from(expire_if_stale(&mut self.store, &mut self.stats, &key, now));

        if self.store.contains_key(&key) {
            self.store.upsert(key, value, now, Some(self.ttl.get()));
            self.stats.updates += 1;
            let mut outcome = PutOutcome::updated();
            outcome.expired = expired;
            return outcome;
        }

        let mut outcome = PutOutcome::inserted();
        if self.store.len() >= self.capacity.get() {
            expired += reclaim_expired(&mut self.store, &mut self.stats, now);
        }
        if self.store.len() >= self.capacity.get() {
            if let Some(evicted) = self.store.pop_least_recent() {
                debug!("Evicting LRU entry: {}", evicted.key);
                self.stats.evictions += 1;
                outcome.evicted = Some(evicted.key);
            }
        }
        outcome.expired = expired;

        self.store.upsert(key, value, now, Some(self.ttl.get()));
        self.stats.inserts += 1;
        self.stats.observe_len(self.store.len());
        outcome
    }

    fn sweep_expired(&mut self, now: Timestamp) -> usize {
        reclaim_expired(&mut self.store, &mut self.stats, now)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity.get())
    }

    fn ttl(&self) -> Option<u64> {
        Some(self.ttl.get())
    }

    fn clear(&mut self) {
        self.store.clear();
    }

    fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
