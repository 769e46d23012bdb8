//! # Cache Policy Primitives
//!
//! This module implements the cache instances whose behaviour is being compared.
//!
//! ## Policies
//!
//! - **LRU**: capacity-bounded, evicts the least recently used entry
//! - **TTL**: entries expire a fixed number of ticks after they were written
//! - **TTL-LRU**: both bounds; expiry is checked before recency is updated
//!
//! ## Time
//!
//! Policies never read a clock. Every `get`/`put` carries the logical timestamp
//! of the request, which keeps replays deterministic.
//!
//! ## Example
//!
//! ```rust
//! use cachebench_core::cache::{build_policy, PolicyConfig};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), cachebench_core::ConfigError> {
//! let config = PolicyConfig::ttl_lru("hybrid", 2, 10);
//! let mut cache = build_policy(&config)?;
//!
//! assert!(cache.get("question:1", 0).is_none());
//! cache.put("question:1".to_string(), Arc::from("answer"), 0);
//!
//! assert!(cache.get("question:1", 5).is_some());
//! assert!(cache.get("question:1", 10).is_none()); // expired
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod entry;
pub mod policy;
mod store;
pub mod types;

pub use config::{PolicyConfig, PolicyConfigBuilder, RawPolicyConfig};
pub use entry::{CacheEntry, EntryMetadata};
pub use policy::{
    build_policy, CachePolicy, LruPolicy, PutOutcome, TtlLruPolicy, TtlPolicy, WriteKind,
};
pub use types::{CacheKey, CacheStats, CacheValue, PolicyKind, Timestamp};
