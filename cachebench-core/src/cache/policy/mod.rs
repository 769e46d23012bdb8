//! Eviction policies
//!
//! Each policy owns its entries exclusively and is driven by an explicit logical
//! clock: every call carries the `now` of the request being served. Expiry is
//! checked lazily on access; `sweep_expired` is an optional explicit reclaim that
//! never changes hit/miss outcomes. Nothing here runs on a timer.

mod hybrid;
mod lru;
mod ttl;

pub use hybrid::TtlLruPolicy;
pub use lru::LruPolicy;
pub use ttl::TtlPolicy;

use crate::cache::{
    config::PolicyConfig,
    store::EntryStore,
    types::{CacheKey, CacheStats, CacheValue, PolicyKind, Timestamp},
};
use crate::error::ConfigError;
use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};

/// Whether a put created or overwrote an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Inserted,
    Updated,
}

/// Effects of a single `put`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    pub write: WriteKind,

    /// Key evicted to make room, if the capacity bound forced one out
    pub evicted: Option<CacheKey>,

    /// Expired entries reclaimed while making room
    pub expired: usize,
}

impl PutOutcome {
    fn inserted() -> Self {
        Self {
            write: WriteKind::Inserted,
            evicted: None,
            expired: 0,
        }
    }

    fn updated() -> Self {
        Self {
            write: WriteKind::Updated,
            evicted: None,
            expired: 0,
        }
    }

    /// Whether this put forced a capacity eviction
    pub fn triggered_eviction(&self) -> bool {
        self.evicted.is_some()
    }
}

/// A single cache instance under one eviction policy
pub trait CachePolicy: Send + fmt::Debug {
    fn kind(&self) -> PolicyKind;

    /// Look up `key` at time `now`. Misses never insert.
    fn get(&mut self, key: &str, now: Timestamp) -> Option<CacheValue>;

    /// Insert or overwrite `key` at time `now`, evicting as the policy requires
    fn put(&mut self, key: CacheKey, value: CacheValue, now: Timestamp) -> PutOutcome;

    /// Reclaim entries already expired at `now`, returning how many were removed
    fn sweep_expired(&mut self, now: Timestamp) -> usize;

    /// Current entry count
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry-count bound, if any
    fn capacity(&self) -> Option<usize>;

    /// Time-to-live in ticks, if any
    fn ttl(&self) -> Option<u64>;

    /// Drop all entries. Counters are kept.
    fn clear(&mut self);

    fn stats(&self) -> &CacheStats;
}

/// Construct a fresh, empty policy instance for `config`
pub fn build_policy(config: &PolicyConfig) -> Result<Box<dyn CachePolicy>, ConfigError> {
    config.validate()?;

    let capacity = || {
        config
            .capacity
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| ConfigError::MissingParameter {
                name: config.name.clone(),
                parameter: "capacity",
            })
    };
    let ttl = || {
        config
            .ttl
            .and_then(NonZeroU64::new)
            .ok_or_else(|| ConfigError::MissingParameter {
                name: config.name.clone(),
                parameter: "ttl",
            })
    };

    let policy: Box<dyn CachePolicy> = match config.kind {
        PolicyKind::Lru => Box::new(LruPolicy::new(capacity()?)),
        PolicyKind::Ttl => Box::new(TtlPolicy::new(ttl()?)),
        PolicyKind::TtlLru => Box::new(TtlLruPolicy::new(capacity()?, ttl()?)),
    };
    Ok(policy)
}

/// Drop `key` if it is expired at `now`. Returns `true` when it was removed.
pub(crate) fn expire_if_stale(
    store: &mut EntryStore,
    stats: &mut CacheStats,
    key: &str,
    now: Timestamp,
) -> bool {
    let expired = store
        .get(key)
        .is_some_and(|entry| entry.is_expired_at(now));
    if expired {
        store.remove(key);
        stats.expirations += 1;
        tracing::trace!(key, now, "entry expired");
    }
    expired
}

/// Reclaim every entry that has expired at `now`
pub(crate) fn reclaim_expired(
    store: &mut EntryStore,
    stats: &mut CacheStats,
    now: Timestamp,
) -> usize {
    let mut reclaimed = 0;
    while store.pop_expired(now).is_some() {
        reclaimed += 1;
    }
    stats.expirations += reclaimed as u64;
    reclaimed
}

/// Shared hit/miss bookkeeping for a lookup on a live store
pub(crate) fn lookup(
    store: &mut EntryStore,
    stats: &mut CacheStats,
    key: &str,
    now: Timestamp,
) -> Option<CacheValue> {
    match store.touch(key, now) {
        Some(value) => {
            stats.hits += 1;
            Some(value)
        }
        None => {
            stats.misses += 1;
            None
        }
    }
}
