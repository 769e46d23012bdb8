//! Cache entry management with TTL support

use crate::cache::types::{CacheKey, CacheValue, Timestamp};
use serde::{Deserialize, Serialize};

/// A cache entry with expiry and access metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cache key
    pub key: CacheKey,

    /// The cached value
    pub value: CacheValue,

    /// Entry metadata
    pub metadata: EntryMetadata,
}

impl CacheEntry {
    /// Create an entry inserted at `now`, expiring after `ttl` ticks if given
    pub fn new(key: CacheKey, value: CacheValue, now: Timestamp, ttl: Option<u64>) -> Self {
        Self {
            key,
            value,
            metadata: EntryMetadata {
                inserted_at: now,
                accessed_at: now,
                expires_at: ttl.map(|ttl| now.saturating_add(ttl)),
                access_count: 0,
            },
        }
    }

    /// An entry is expired once `now` reaches its expiry time
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.metadata
            .expires_at
            .is_some_and(|expires_at| now >= expires_at)
    }

    /// Ticks left before expiry; `None` for entries without a TTL or already expired
    pub fn time_to_live_at(&self, now: Timestamp) -> Option<u64> {
        let expires_at = self.metadata.expires_at?;
        if now >= expires_at {
            None
        } else {
            Some(expires_at - now)
        }
    }

    /// Record a hit at `now`
    pub fn mark_accessed(&mut self, now: Timestamp) {
        self.metadata.accessed_at = now;
        self.metadata.access_count += 1;
    }

    /// Replace the value, restarting the entry's lifetime at `now`
    pub fn replace(&mut self, value: CacheValue, now: Timestamp, ttl: Option<u64>) {
        self.value = value;
        self.metadata.inserted_at = now;
        self.metadata.accessed_at = now;
        self.metadata.expires_at = ttl.map(|ttl| now.saturating_add(ttl));
    }
}

/// Metadata associated with a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// When the entry was (last) written
    pub inserted_at: Timestamp,

    /// Last access time
    pub accessed_at: Timestamp,

    /// When the entry expires, if it has a TTL
    pub expires_at: Option<Timestamp>,

    /// Number of hits served by this entry
    pub access_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(now: Timestamp, ttl: Option<u64>) -> CacheEntry {
        CacheEntry::new("test_key".to_string(), Arc::from("test_value"), now, ttl)
    }

    #[test]
    fn test_cache_entry_creation() {
        let entry = entry(5, Some(10));

        assert_eq!(entry.key, "test_key");
        assert_eq!(&*entry.value, "test_value");
        assert_eq!(entry.metadata.inserted_at, 5);
        assert_eq!(entry.metadata.expires_at, Some(15));
        assert_eq!(entry.metadata.access_count, 0);
    }

    #[test]
    fn test_entry_expiration_boundary() {
        let entry = entry(0, Some(10));

        assert!(!entry.is_expired_at(0));
        assert!(!entry.is_expired_at(9));
        assert!(entry.is_expired_at(10));
        assert!(entry.is_expired_at(15));
    }

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = entry(0, None);
        assert!(!entry.is_expired_at(u64::MAX));
        assert_eq!(entry.time_to_live_at(100), None);
    }

    #[test]
    fn test_time_to_live() {
        let entry = entry(0, Some(10));
        assert_eq!(entry.time_to_live_at(4), Some(6));
        assert_eq!(entry.time_to_live_at(10), None);
    }

    #[test]
    fn test_mark_accessed() {
        let mut entry = entry(0, Some(10));
        entry.mark_accessed(3);
        entry.mark_accessed(7);

        assert_eq!(entry.metadata.access_count, 2);
        assert_eq!(entry.metadata.accessed_at, 7);
        assert_eq!(entry.metadata.inserted_at, 0);
    }

    #[test]
    fn test_replace_restarts_lifetime() {
        let mut entry = entry(0, Some(10));
        entry.replace(Arc::from("new_value"), 8, Some(10));

        assert_eq!(&*entry.value, "new_value");
        assert_eq!(entry.metadata.inserted_at, 8);
        assert_eq!(entry.metadata.expires_at, Some(18));
        assert!(!entry.is_expired_at(12));
    }

    #[test]
    fn test_expiry_saturates() {
        let entry = entry(u64::MAX - 1, Some(10));
        assert_eq!(entry.metadata.expires_at, Some(u64::MAX));
    }
}
