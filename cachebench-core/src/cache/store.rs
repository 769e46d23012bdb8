//! Slab-backed entry storage shared by every policy
//!
//! Entries live in a slot vector indexed by key. Two orderings run over the slots:
//! - recency order (front = least recently used), an intrusive doubly-linked
//!   list used for LRU eviction
//! - expiry order, a `(expires_at, slot)` set used for TTL reclamation
//!
//! Expiry order does not depend on the order writes arrive in, so reclamation
//! finds every expired entry even when timestamps go backwards. Recency
//! operations are O(1); anything touching expiry order is O(log n).

use crate::cache::{
    entry::CacheEntry,
    types::{CacheKey, CacheValue, Timestamp},
};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly-linked list over slot indices
#[derive(Debug, Default)]
struct OrderList {
    head: Option<usize>,
    tail: Option<usize>,
    links: Vec<Link>,
}

impl OrderList {
    fn push_back(&mut self, idx: usize) {
        if idx >= self.links.len() {
            self.links.resize(idx + 1, Link::default());
        }
        self.links[idx] = Link {
            prev: self.tail,
            next: None,
        };
        match self.tail {
            Some(tail) => self.links[tail].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    /// `idx` must currently be linked
    fn unlink(&mut self, idx: usize) {
        let Link { prev, next } = self.links[idx];
        match prev {
            Some(prev) => self.links[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.links[next].prev = prev,
            None => self.tail = prev,
        }
        self.links[idx] = Link::default();
    }

    fn move_to_back(&mut self, idx: usize) {
        if self.tail != Some(idx) {
            self.unlink(idx);
            self.push_back(idx);
        }
    }

    fn front(&self) -> Option<usize> {
        self.head
    }

    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&idx| self.links[idx].next)
    }

    fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.links.clear();
    }
}

/// Internal cache storage
#[derive(Debug, Default)]
pub(crate) struct EntryStore {
    /// key -> slot
    index: HashMap<CacheKey, usize>,

    slots: Vec<Option<CacheEntry>>,

    /// Vacated slots available for reuse
    free: Vec<usize>,

    recency: OrderList,

    /// `(expires_at, slot)` of every entry with a TTL
    expiry: BTreeSet<(Timestamp, usize)>,
}

impl EntryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&CacheEntry> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref()
    }

    /// Record a hit: mark the entry accessed and make it most recently used
    pub(crate) fn touch(&mut self, key: &str, now: Timestamp) -> Option<CacheValue> {
        let idx = *self.index.get(key)?;
        let entry = self.slots[idx].as_mut()?;
        entry.mark_accessed(now);
        let value = entry.value.clone();
        self.recency.move_to_back(idx);
        Some(value)
    }

    /// Insert or overwrite. Returns `true` when a new entry was created.
    ///
    /// Overwrites restart the entry's lifetime and make it most recently used.
    pub(crate) fn upsert(
        &mut self,
        key: CacheKey,
        value: CacheValue,
        now: Timestamp,
        ttl: Option<u64>,
    ) -> bool {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.slots[idx].as_mut() {
                if let Some(expires_at) = entry.metadata.expires_at {
                    self.expiry.remove(&(expires_at, idx));
                }
                entry.replace(value, now, ttl);
                if let Some(expires_at) = entry.metadata.expires_at {
                    self.expiry.insert((expires_at, idx));
                }
                self.recency.move_to_back(idx);
                return false;
            }
        }

        let entry = CacheEntry::new(key.clone(), value, now, ttl);
        let expires_at = entry.metadata.expires_at;
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.recency.push_back(idx);
        if let Some(expires_at) = expires_at {
            self.expiry.insert((expires_at, idx));
        }
        true
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let idx = self.index.remove(key)?;
        self.release(idx)
    }

    /// Remove the least recently used entry
    pub(crate) fn pop_least_recent(&mut self) -> Option<CacheEntry> {
        let idx = self.recency.front()?;
        let entry = self.release(idx)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    /// Remove the entry that expires soonest, if it has expired at `now`
    pub(crate) fn pop_expired(&mut self, now: Timestamp) -> Option<CacheEntry> {
        let &(expires_at, idx) = self.expiry.first()?;
        if expires_at > now {
            return None;
        }
        let entry = self.release(idx)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    /// Keys from least to most recently used
    pub(crate) fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.recency
            .iter()
            .filter_map(|idx| self.slots[idx].as_ref().map(|e| e.key.clone()))
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.recency.clear();
        self.expiry.clear();
    }

    fn release(&mut self, idx: usize) -> Option<CacheEntry> {
        let entry = self.slots[idx].take()?;
        self.recency.unlink(idx);
        if let Some(expires_at) = entry.metadata.expires_at {
            self.expiry.remove(&(expires_at, idx));
        }
        self.free.push(idx);
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn value(s: &str) -> CacheValue {
        Arc::from(s)
    }

    #[test]
    fn test_upsert_and_get() {
        let mut store = EntryStore::new();

        assert!(store.upsert("key1".to_string(), value("value1"), 0, None));
        assert!(!store.upsert("key1".to_string(), value("value2"), 1, None));

        assert_eq!(store.len(), 1);
        assert_eq!(&*store.get("key1").unwrap().value, "value2");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_recency_order() {
        let mut store = EntryStore::new();
        for key in ["a", "b", "c"] {
            store.upsert(key.to_string(), value(key), 0, None);
        }

        assert_eq!(store.keys_by_recency(), vec!["a", "b", "c"]);

        store.touch("a", 1);
        assert_eq!(store.keys_by_recency(), vec!["b", "c", "a"]);

        let evicted = store.pop_least_recent().unwrap();
        assert_eq!(evicted.key, "b");
        assert_eq!(store.keys_by_recency(), vec!["c", "a"]);
        assert!(!store.contains_key("b"));
    }

    #[test]
    fn test_touch_missing_key() {
        let mut store = EntryStore::new();
        assert!(store.touch("missing", 0).is_none());
    }

    #[test]
    fn test_slot_reuse() {
        let mut store = EntryStore::with_capacity(2);
        store.upsert("a".to_string(), value("a"), 0, None);
        store.upsert("b".to_string(), value("b"), 0, None);
        store.remove("a");
        store.upsert("c".to_string(), value("c"), 1, None);

        assert_eq!(store.slots.len(), 2);
        assert_eq!(store.keys_by_recency(), vec!["b", "c"]);
    }

    #[test]
    fn test_pop_expired_follows_expiry_order() {
        let mut store = EntryStore::new();
        store.upsert("a".to_string(), value("a"), 0, Some(10));
        store.upsert("b".to_string(), value("b"), 5, Some(10));
        store.upsert("c".to_string(), value("c"), 8, Some(10));

        // Recency does not affect expiry order
        store.touch("a", 9);

        assert!(store.pop_expired(9).is_none());
        assert_eq!(store.pop_expired(15).unwrap().key, "a");
        assert_eq!(store.pop_expired(15).unwrap().key, "b");
        assert!(store.pop_expired(15).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_pop_expired_with_out_of_order_writes() {
        let mut store = EntryStore::new();
        store.upsert("late".to_string(), value("late"), 20, Some(10));
        store.upsert("early".to_string(), value("early"), 0, Some(10));

        // "early" was written second but expires first
        assert_eq!(store.pop_expired(25).unwrap().key, "early");
        assert!(store.pop_expired(25).is_none());
        assert!(store.contains_key("late"));
    }

    #[test]
    fn test_entries_without_ttl_never_expire() {
        let mut store = EntryStore::new();
        store.upsert("a".to_string(), value("a"), 0, None);
        assert!(store.pop_expired(u64::MAX).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overwrite_restarts_expiry() {
        let mut store = EntryStore::new();
        store.upsert("a".to_string(), value("a"), 0, Some(10));
        store.upsert("b".to_string(), value("b"), 2, Some(10));
        store.upsert("a".to_string(), value("a2"), 4, Some(10));

        assert_eq!(store.pop_expired(12).unwrap().key, "b");
        assert!(store.pop_expired(12).is_none());
    }

    #[test]
    fn test_clear() {
        let mut store = EntryStore::new();
        store.upsert("a".to_string(), value("a"), 0, None);
        store.clear();

        assert_eq!(store.len(), 0);
        assert!(store.pop_least_recent().is_none());
    }
}
