//! Trace replay against a single configuration

use crate::cache::{build_policy, CacheStats, PolicyConfig};
use crate::error::{BenchError, Result};
use crate::origin::Origin;
use crate::summary::{summarize, Outcome, RequestRecord, RunSummary};
use crate::trace::Trace;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Records and final counters of one completed run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<RequestRecord>,
    pub stats: CacheStats,
}

/// Replays a trace against a fresh policy instance
///
/// Each call builds its own cache, so runs never share state and can be executed
/// in any order or concurrently.
#[derive(Debug, Clone)]
pub struct TraceRunner {
    /// Cost recorded for a hit
    pub hit_latency: Duration,
    /// Sweep expired entries every N requests. Lazy expiry alone when `None`.
    pub sweep_every: Option<NonZeroUsize>,
    pub require_monotonic: bool,
}

impl Default for TraceRunner {
    fn default() -> Self {
        Self {
            hit_latency: Duration::from_micros(100),
            sweep_every: None,
            require_monotonic: true,
        }
    }
}

impl TraceRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hit_latency(mut self, latency: Duration) -> Self {
        self.hit_latency = latency;
        self
    }

    pub fn with_sweep_every(mut self, every: usize) -> Self {
        self.sweep_every = NonZeroUsize::new(every);
        self
    }

    pub fn with_require_monotonic(mut self, require: bool) -> Self {
        self.require_monotonic = require;
        self
    }

    /// Replay `trace` against a new cache built from `config`
    ///
    /// Every request is a `get`; a miss fetches from `origin` and `put`s the
    /// value. The trace is validated before the first request, so an invalid
    /// trace produces no records at all.
    pub fn run(
        &self,
        trace: &Trace,
        config: &PolicyConfig,
        origin: &dyn Origin,
    ) -> Result<RunOutput> {
        trace.validate(self.require_monotonic)?;
        let mut policy = build_policy(config)?;
        let mut records = Vec::with_capacity(trace.len());

        debug!("Replaying {} requests against {}", trace.len(), config);

        for (index, event) in trace.iter().enumerate() {
            let record = match policy.get(&event.key, event.at) {
                Some(_) => RequestRecord {
                    index,
                    key: event.key.clone(),
                    at: event.at,
                    outcome: Outcome::Hit,
                    latency: self.hit_latency,
                },
                None => {
                    let fetched = origin.fetch(&event.key).map_err(|source| {
                        BenchError::RunFailure {
                            config: config.name.clone(),
                            source,
                        }
                    })?;
                    policy.put(event.key.clone(), fetched.value, event.at);
                    RequestRecord {
                        index,
                        key: event.key.clone(),
                        at: event.at,
                        outcome: Outcome::Miss,
                        latency: fetched.latency,
                    }
                }
            };
            debug!(
                "{}: {:?} {} at {}",
                config.name, record.outcome, record.key, record.at
            );
            records.push(record);

            if let Some(every) = self.sweep_every {
                if (index + 1) % every.get() == 0 {
                    policy.sweep_expired(event.at);
                }
            }
        }

        Ok(RunOutput {
            records,
            stats: policy.stats().clone(),
        })
    }

    /// Run and summarize, turning any failure into a failed summary
    pub fn execute(
        &self,
        trace: &Trace,
        config: &PolicyConfig,
        origin: &dyn Origin,
    ) -> RunSummary {
        match self.run(trace, config, origin) {
            Ok(output) => {
                let summary = summarize(&output.records, config, &output.stats);
                info!(
                    "{}: hit rate {:.2}%, mean latency {:.3}ms over {} requests",
                    config.name,
                    summary.hit_rate * 100.0,
                    summary.mean_latency_ms,
                    summary.total_requests
                );
                summary
            }
            Err(err) => {
                warn!("Run '{}' failed: {}", config.name, err);
                RunSummary::failed(config, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheValue;
    use crate::error::{OriginError, TraceError};
    use crate::origin::{Fetched, FixedLatencyOrigin};
    use crate::summary::RunStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn origin() -> FixedLatencyOrigin {
        FixedLatencyOrigin::new(Duration::from_millis(50))
    }

    fn outcomes(output: &RunOutput) -> Vec<Outcome> {
        output.records.iter().map(|r| r.outcome).collect()
    }

    #[test]
    fn test_lru_replay() {
        use Outcome::*;
        let trace = Trace::from_pairs([("a", 0), ("b", 1), ("a", 2), ("c", 3), ("a", 4)]);
        let config = PolicyConfig::lru("lru-2", 2);

        let output = TraceRunner::new().run(&trace, &config, &origin()).unwrap();
        assert_eq!(outcomes(&output), vec![Miss, Miss, Hit, Miss, Hit]);

        let summary = summarize(&output.records, &config, &output.stats);
        assert_eq!(summary.hit_rate, 0.4);
        assert_eq!(summary.eviction_count, 1);
    }

    #[test]
    fn test_ttl_replay() {
        use Outcome::*;
        let trace = Trace::from_pairs([("x", 0), ("x", 5), ("x", 15)]);
        let config = PolicyConfig::ttl("ttl-10", 10);

        let output = TraceRunner::new().run(&trace, &config, &origin()).unwrap();
        assert_eq!(outcomes(&output), vec![Miss, Hit, Miss]);
        assert_eq!(output.stats.expirations, 1);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        use Outcome::*;
        let trace = Trace::from_pairs([("x", 0), ("x", 9), ("x", 10)]);
        let config = PolicyConfig::ttl_lru("hybrid", 4, 10);

        let output = TraceRunner::new().run(&trace, &config, &origin()).unwrap();
        assert_eq!(outcomes(&output), vec![Miss, Hit, Miss]);
    }

    #[test]
    fn test_latency_comes_from_origin() {
        let trace = Trace::from_pairs([("a", 0), ("a", 1)]);
        let runner = TraceRunner::new().with_hit_latency(Duration::from_micros(7));

        let output = runner
            .run(&trace, &PolicyConfig::lru("lru", 1), &origin())
            .unwrap();
        assert_eq!(output.records[0].latency, Duration::from_millis(50));
        assert_eq!(output.records[1].latency, Duration::from_micros(7));
    }

    #[test]
    fn test_origin_called_once_per_miss() {
        let calls = AtomicUsize::new(0);
        let counting = |key: &str| -> std::result::Result<Fetched, OriginError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Fetched {
                value: CacheValue::from(key),
                latency: Duration::from_millis(1),
            })
        };
        let trace = Trace::from_pairs([("a", 0), ("b", 1), ("a", 2), ("c", 3), ("a", 4)]);

        let output = TraceRunner::new()
            .run(&trace, &PolicyConfig::lru("lru-2", 2), &counting)
            .unwrap();
        let misses = output.records.iter().filter(|r| !r.is_hit()).count();
        assert_eq!(calls.load(Ordering::SeqCst), misses);
    }

    #[test]
    fn test_runs_are_independent_and_deterministic() {
        let trace = Trace::from_pairs((0..200).map(|i| (format!("k{}", (i * 7) % 13), i as u64)));
        let config = PolicyConfig::ttl_lru("hybrid", 5, 20);
        let runner = TraceRunner::new();

        let first = runner.execute(&trace, &config, &origin());
        let second = runner.execute(&trace, &config, &origin());
        assert_eq!(first, second);
        assert_eq!(first.hit_rate.to_bits(), second.hit_rate.to_bits());
        assert_eq!(first.mean_latency_ms.to_bits(), second.mean_latency_ms.to_bits());
    }

    #[test]
    fn test_periodic_sweep_keeps_outcomes() {
        let trace = Trace::from_pairs((0..300).map(|i| (format!("k{}", (i * 11) % 17), i as u64)));
        let config = PolicyConfig::ttl_lru("hybrid", 6, 15);

        let lazy = TraceRunner::new().run(&trace, &config, &origin()).unwrap();
        let swept = TraceRunner::new()
            .with_sweep_every(10)
            .run(&trace, &config, &origin())
            .unwrap();
        assert_eq!(lazy.records, swept.records);
    }

    #[test]
    fn test_invalid_trace_fails_before_any_request() {
        let trace = Trace::from_pairs([("a", 5), ("b", 2)]);
        let err = TraceRunner::new()
            .run(&trace, &PolicyConfig::lru("lru", 2), &origin())
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Trace(TraceError::NonMonotonic { index: 1, .. })
        ));

        let relaxed = TraceRunner::new().with_require_monotonic(false);
        assert!(relaxed
            .run(&trace, &PolicyConfig::lru("lru", 2), &origin())
            .is_ok());
    }

    #[test]
    fn test_unordered_trace_reclaims_expired_before_evicting() {
        use Outcome::*;
        let trace = Trace::from_pairs([("a", 20), ("b", 0), ("c", 25), ("a", 26)]);
        let config = PolicyConfig::ttl_lru("hybrid", 2, 10);

        let output = TraceRunner::new()
            .with_require_monotonic(false)
            .run(&trace, &config, &origin())
            .unwrap();
        assert_eq!(outcomes(&output), vec![Miss, Miss, Miss, Hit]);
        assert_eq!(output.stats.evictions, 0);
        assert_eq!(output.stats.expirations, 1);
    }

    #[test]
    fn test_origin_failure_becomes_failed_summary() {
        let failing = |key: &str| -> std::result::Result<Fetched, OriginError> {
            Err(OriginError::new(key, "connection refused"))
        };
        let trace = Trace::from_pairs([("a", 0)]);
        let config = PolicyConfig::lru("lru", 2);

        let summary = TraceRunner::new().execute(&trace, &config, &failing);
        assert!(summary.is_failed());
        match summary.status {
            RunStatus::Failed { reason } => assert!(reason.contains("connection refused")),
            RunStatus::Completed => panic!("expected failure"),
        }
    }

    #[test]
    fn test_empty_trace() {
        let summary = TraceRunner::new().execute(
            &Trace::default(),
            &PolicyConfig::ttl("ttl", 10),
            &origin(),
        );
        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.hit_rate, 0.0);
    }

    #[test]
    fn test_shared_origin() {
        let shared: Arc<dyn Origin> = Arc::new(origin());
        let trace = Trace::from_pairs([("a", 0)]);
        let output = TraceRunner::new()
            .run(&trace, &PolicyConfig::lru("lru", 1), shared.as_ref())
            .unwrap();
        assert_eq!(output.records.len(), 1);
    }
}
