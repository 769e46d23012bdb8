//! Ranking of run summaries into a comparison table

use crate::error::Result;
use crate::summary::RunSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Ranked summaries of one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub sweep_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Number of requests in the replayed trace
    pub trace_len: usize,
    /// Best configuration first
    pub entries: Vec<RunSummary>,
}

/// Order two summaries for the comparison table
///
/// Completed runs come before failed ones, then higher hit rate, then lower mean
/// latency, then configuration name.
pub fn rank(a: &RunSummary, b: &RunSummary) -> Ordering {
    a.is_failed()
        .cmp(&b.is_failed())
        .then_with(|| b.hit_rate.total_cmp(&a.hit_rate))
        .then_with(|| a.mean_latency_ms.total_cmp(&b.mean_latency_ms))
        .then_with(|| a.config_name.cmp(&b.config_name))
}

/// Rank the summaries of a sweep
///
/// The input order does not matter: the same set of summaries always produces
/// the same table.
pub fn compare(mut summaries: Vec<RunSummary>) -> ComparisonResult {
    summaries.sort_by(rank);
    let trace_len = summaries
        .iter()
        .map(|s| s.total_requests as usize)
        .max()
        .unwrap_or(0);

    ComparisonResult {
        sweep_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        trace_len,
        entries: summaries,
    }
}

impl ComparisonResult {
    pub fn with_trace_len(mut self, trace_len: usize) -> Self {
        self.trace_len = trace_len;
        self
    }

    /// Top-ranked completed run
    pub fn best(&self) -> Option<&RunSummary> {
        self.entries.first().filter(|s| !s.is_failed())
    }

    pub fn completed(&self) -> impl Iterator<Item = &RunSummary> {
        self.entries.iter().filter(|s| !s.is_failed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RunSummary> {
        self.entries.iter().filter(|s| s.is_failed())
    }

    pub fn get(&self, config_name: &str) -> Option<&RunSummary> {
        self.entries.iter().find(|s| s.config_name == config_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<4} {:<24} {:<8} {:<18} {:>9} {:>13} {:>10} {:>10}",
            "#",
            "config",
            "policy",
            "parameters",
            "hit rate",
            "mean latency",
            "evictions",
            "expired"
        )?;
        for (rank, summary) in self.entries.iter().enumerate() {
            if summary.is_failed() {
                writeln!(
                    f,
                    "{:<4} {:<24} {:<8} {:<18} {:>9}",
                    rank + 1,
                    summary.config_name,
                    summary.policy_kind,
                    summary.capacity_or_ttl,
                    "FAILED"
                )?;
                continue;
            }
            writeln!(
                f,
                "{:<4} {:<24} {:<8} {:<18} {:>8.2}% {:>11.3}ms {:>10} {:>10}",
                rank + 1,
                summary.config_name,
                summary.policy_kind,
                summary.capacity_or_ttl,
                summary.hit_rate * 100.0,
                summary.mean_latency_ms,
                summary.eviction_count,
                summary.expiration_count
            )?;
        }
        Ok(())
    }
}
