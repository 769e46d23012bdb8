//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Cache key type
pub type CacheKey = String;

/// Cache value type - an immutable shared payload, cheap to hand out on hits
pub type CacheValue = Arc<str>;

/// Logical timestamp. One tick is one second when traces carry wall-clock times.
pub type Timestamp = u64;

/// Eviction policy kinds under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Capacity-bounded least-recently-used
    #[serde(rename = "LRU", alias = "lru")]
    Lru,

    /// Time-to-live expiry, unbounded size
    #[serde(rename = "TTL", alias = "ttl")]
    Ttl,

    /// Capacity-bounded and TTL-bounded
    #[serde(rename = "TTL-LRU", alias = "ttl-lru", alias = "ttl_lru")]
    TtlLru,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Lru => "LRU",
            PolicyKind::Ttl => "TTL",
            PolicyKind::TtlLru => "TTL-LRU",
        }
    }

    /// Whether this kind enforces an entry-count bound
    pub fn is_capacity_bounded(&self) -> bool {
        matches!(self, PolicyKind::Lru | PolicyKind::TtlLru)
    }

    /// Whether this kind expires entries
    pub fn is_ttl_bounded(&self) -> bool {
        matches!(self, PolicyKind::Ttl | PolicyKind::TtlLru)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Counters kept by a single policy instance over its lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub hits: u64,

    /// Lookups that found nothing or an expired entry
    pub misses: u64,

    /// Puts that created a new entry
    pub inserts: u64,

    /// Puts that overwrote an existing entry
    pub updates: u64,

    /// Entries removed to satisfy the capacity bound
    pub evictions: u64,

    /// Entries removed because their TTL elapsed
    pub expirations: u64,

    /// Highest entry count observed
    pub peak_entries: usize,
}

impl CacheStats {
    /// Hit rate as a fraction in [0, 1]; 0 when no lookups happened
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Miss rate as a fraction in [0, 1]; 0 when no lookups happened
    pub fn miss_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.misses as f64 / total as f64
        }
    }

    /// Entries removed for any reason
    pub fn total_removals(&self) -> u64 {
        self.evictions + self.expirations
    }

    pub(crate) fn observe_len(&mut self, len: usize) {
        self.peak_entries = self.peak_entries.max(len);
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, inserts: {}, evictions: {}, expirations: {}, peak: {} }}",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.inserts,
            self.evictions,
            self.expirations,
            self.peak_entries
        )
    }
}
