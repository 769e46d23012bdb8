use super::{expire_if_stale, lookup, reclaim_expired, CachePolicy, PutOutcome};
use crate::cache::{
    store::EntryStore,
    types::{CacheKey, CacheStats, CacheValue, PolicyKind, Timestamp},
};
use std::num::NonZeroU64;

/// Time-to-live cache without a size bound
///
/// An entry written at `t0` expires at `t0 + ttl`; a lookup at or after that
/// time is a miss and drops the entry. Hits do not extend the lifetime.
#[derive(Debug)]
pub struct TtlPolicy {
    ttl: NonZeroU64,
    store: EntryStore,
    stats: CacheStats,
}

impl TtlPolicy {
    pub fn new(ttl: NonZeroU64) -> Self {
        Self {
            ttl,
            store: EntryStore::new(),
            stats: CacheStats::default(),
        }
    }
}

impl CachePolicy for TtlPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Ttl
    }

    fn get(&mut self, key: &str, now: Timestamp) -> Option<CacheValue> {
        if expire_if_stale(&mut self.store, &mut self.stats, key, now) {
            self.stats.misses += 1;
            return None;
        }
        lookup(&mut self.store, &mut self.stats, key, now)
    }

    fn put(&mut self, key: CacheKey, value: CacheValue, now: Timestamp) -> PutOutcome {
        let expired = expire_if_stale(&mut self.store, &mut self.stats, &key, now);
        let inserted = self.store.upsert(key, value, now, Some(self.ttl.get()));

        let mut outcome = if inserted {
            self.stats.inserts += 1;
            PutOutcome::inserted()
        } else {
            self.stats.updates += 1;
            PutOutcome::updated()
        };
        outcome.expired = usize::from(expired);
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
        None
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
