//! Per-request records and per-run summaries

use crate::cache::{CacheKey, CacheStats, PolicyConfig, PolicyKind, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lookup result for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Hit,
    Miss,
}

/// One served request. Records are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Position in the trace
    pub index: usize,
    pub key: CacheKey,
    pub at: Timestamp,
    pub outcome: Outcome,
    /// Time to serve the request (lookup cost on hits, origin latency on misses)
    pub latency: Duration,
}

impl RequestRecord {
    pub fn is_hit(&self) -> bool {
        self.outcome == Outcome::Hit
    }
}

/// Whether a run completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed { reason: String },
}

/// Summary statistics for one (configuration, trace) run
///
/// Rates are fractions in [0, 1]. A run with no requests reports zero for both
/// rates and for the mean latency, whatever the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub config_name: String,
    pub policy_kind: PolicyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    pub capacity_or_ttl: String,
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub mean_latency_ms: f64,
    /// Puts that forced a capacity eviction
    pub eviction_count: u64,
    /// Entries dropped because their TTL elapsed
    pub expiration_count: u64,
    /// Highest entry count reached during the run
    pub peak_entries: usize,
    pub status: RunStatus,
}

impl RunSummary {
    /// Placeholder summary for a run that did not complete
    pub fn failed(config: &PolicyConfig, reason: impl Into<String>) -> Self {
        Self {
            config_name: config.name.clone(),
            policy_kind: config.kind,
            capacity: config.capacity,
            ttl: config.ttl,
            capacity_or_ttl: config.capacity_or_ttl(),
            total_requests: 0,
            hits: 0,
            misses: 0,
            hit_rate: 0.0,
            miss_rate: 0.0,
            mean_latency_ms: 0.0,
            eviction_count: 0,
            expiration_count: 0,
            peak_entries: 0,
            status: RunStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed { .. })
    }
}

/// Reduce the records of one run into its summary
///
/// Eviction, expiration and peak counts come from the policy's own counters
/// rather than being inferred from the records.
pub fn summarize(
    records: &[RequestRecord],
    config: &PolicyConfig,
    stats: &CacheStats,
) -> RunSummary {
    let total = records.len() as u64;
    let hits = records.iter().filter(|r| r.is_hit()).count() as u64;
    let misses = total - hits;

    let (hit_rate, miss_rate, mean_latency_ms) = if total == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let total_nanos: u128 = records.iter().map(|r| r.latency.as_nanos()).sum();
        (
            hits as f64 / total as f64,
            misses as f64 / total as f64,
            total_nanos as f64 / total as f64 / 1_000_000.0,
        )
    };

    RunSummary {
        config_name: config.name.clone(),
        policy_kind: config.kind,
        capacity: config.capacity,
        ttl: config.ttl,
        capacity_or_ttl: config.capacity_or_ttl(),
        total_requests: total,
        hits,
        misses,
        hit_rate,
        miss_rate,
        mean_latency_ms,
        eviction_count: stats.evictions,
        expiration_count: stats.expirations,
        peak_entries: stats.peak_entries,
        status: RunStatus::Completed,
    }
}
