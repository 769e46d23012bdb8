//! # cachebench-core
//!
//! Comparison engine for cache eviction policies.
//!
//! A fixed request trace is replayed against several cache configurations
//! (LRU, TTL and TTL-LRU, each with its own capacity and/or TTL). Every run
//! gets a fresh cache, records a hit or miss and a latency for each request,
//! and is reduced to a summary. The summaries are then ranked by hit rate,
//! with mean latency as the tie-breaker.
//!
//! ## Features
//!
//! - Three eviction policies behind one [`CachePolicy`] trait
//! - Logical timestamps, so runs are deterministic and repeatable
//! - Pluggable [`Origin`] answering misses with a value and its latency
//! - Seeded synthetic traces with Zipf-like key popularity
//! - Sequential or parallel (tokio) sweeps over a [`ConfigRegistry`]
//!
//! ## Example
//!
//! ```
//! use cachebench_core::{Benchmark, ConfigRegistry, FixedLatencyOrigin, Trace, TraceRunner};
//! use std::time::Duration;
//!
//! let trace = Trace::from_pairs([("a", 0), ("b", 1), ("a", 2), ("c", 3), ("a", 4)]);
//! let origin = FixedLatencyOrigin::new(Duration::from_millis(50));
//!
//! let bench = Benchmark::new(ConfigRegistry::standard_catalog(), TraceRunner::new());
//! let result = bench.run(&trace, &origin);
//!
//! assert_eq!(result.len(), 15);
//! println!("{}", result);
//! ```

pub mod bench;
pub mod cache;
pub mod compare;
pub mod error;
pub mod origin;
pub mod registry;
pub mod runner;
pub mod settings;
pub mod summary;
pub mod trace;

// Re-export main types for convenience
pub use bench::Benchmark;
pub use cache::{
    build_policy, CachePolicy, CacheStats, LruPolicy, PolicyConfig, PolicyKind, TtlLruPolicy,
    TtlPolicy,
};
pub use compare::{compare, ComparisonResult};
pub use error::{BenchError, ConfigError, OriginError, Result, TraceError};
pub use origin::{Fetched, FixedLatencyOrigin, Origin, SimulatedOrigin};
pub use registry::ConfigRegistry;
pub use runner::{RunOutput, TraceRunner};
pub use settings::BenchSettings;
pub use summary::{summarize, Outcome, RequestRecord, RunStatus, RunSummary};
pub use trace::{Trace, TraceEvent, TraceGenerator};
