//! Engine settings loaded from the environment

use crate::cache::PolicyConfig;
use crate::error::{BenchError, Result};
use crate::origin::SimulatedOrigin;
use crate::runner::TraceRunner;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

/// Settings for a comparison sweep
///
/// Environment variables (a `.env` file is honoured):
/// - `CACHE_SIZE`: capacity of the baseline configurations (default 500)
/// - `CACHE_TTL`: TTL of the baseline configurations in ticks (default 3600)
/// - `CACHE_HIT_LATENCY_US`: cost recorded for a hit (default 100)
/// - `CACHE_MISS_LATENCY_MS`: simulated origin base latency (default 50)
/// - `CACHE_MISS_JITTER`: simulated origin latency spread, 0.0 - 1.0 (default 0.2)
/// - `CACHE_SWEEP_EVERY`: explicit expiry sweep every N requests (default: lazy only)
/// - `CACHE_PARALLEL`: run configurations in parallel (default false)
/// - `CACHE_REQUIRE_MONOTONIC`: reject traces whose timestamps go backwards (default true)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchSettings {
    pub cache_size: usize,
    pub cache_ttl: u64,
    pub hit_latency: Duration,
    pub miss_latency: Duration,
    pub miss_jitter: f64,
    pub sweep_every: Option<usize>,
    pub parallel: bool,
    pub require_monotonic: bool,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            cache_size: 500,
            cache_ttl: 3600,
            hit_latency: Duration::from_micros(100),
            miss_latency: Duration::from_millis(50),
            miss_jitter: 0.2,
            sweep_every: None,
            parallel: false,
            require_monotonic: true,
        }
    }
}

impl BenchSettings {
    /// Load settings from the process environment, after reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let settings = Self {
            cache_size: parse_var(&lookup, "CACHE_SIZE")?.unwrap_or(defaults.cache_size),
            cache_ttl: parse_var(&lookup, "CACHE_TTL")?.unwrap_or(defaults.cache_ttl),
            hit_latency: parse_var(&lookup, "CACHE_HIT_LATENCY_US")?
                .map(Duration::from_micros)
                .unwrap_or(defaults.hit_latency),
            miss_latency: parse_var(&lookup, "CACHE_MISS_LATENCY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.miss_latency),
            miss_jitter: parse_var(&lookup, "CACHE_MISS_JITTER")?.unwrap_or(defaults.miss_jitter),
            sweep_every: parse_var(&lookup, "CACHE_SWEEP_EVERY")?.or(defaults.sweep_every),
            parallel: parse_var(&lookup, "CACHE_PARALLEL")?.unwrap_or(defaults.parallel),
            require_monotonic: parse_var(&lookup, "CACHE_REQUIRE_MONOTONIC")?
                .unwrap_or(defaults.require_monotonic),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: u64) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_hit_latency(mut self, latency: Duration) -> Self {
        self.hit_latency = latency;
        self
    }

    pub fn with_miss_latency(mut self, latency: Duration) -> Self {
        self.miss_latency = latency;
        self
    }

    pub fn with_miss_jitter(mut self, jitter: f64) -> Self {
        self.miss_jitter = jitter;
        self
    }

    pub fn with_sweep_every(mut self, every: Option<usize>) -> Self {
        self.sweep_every = every;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.cache_size == 0 {
            return Err(BenchError::Settings(
                "CACHE_SIZE must be greater than 0".to_string(),
            ));
        }
        if self.cache_ttl == 0 {
            return Err(BenchError::Settings(
                "CACHE_TTL must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.miss_jitter) {
            return Err(BenchError::Settings(
                "CACHE_MISS_JITTER must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.sweep_every == Some(0) {
            return Err(BenchError::Settings(
                "CACHE_SWEEP_EVERY must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// One configuration per policy kind, sized from `cache_size` and `cache_ttl`
    pub fn baseline_configs(&self) -> Vec<PolicyConfig> {
        vec![
            PolicyConfig::lru(format!("lru-{}", self.cache_size), self.cache_size),
            PolicyConfig::ttl(format!("ttl-{}", self.cache_ttl), self.cache_ttl),
            PolicyConfig::ttl_lru(
                format!("ttl-lru-{}-{}", self.cache_size, self.cache_ttl),
                self.cache_size,
                self.cache_ttl,
            ),
        ]
    }

    pub fn runner(&self) -> TraceRunner {
        TraceRunner {
            hit_latency: self.hit_latency,
            sweep_every: self.sweep_every.and_then(NonZeroUsize::new),
            require_monotonic: self.require_monotonic,
        }
    }

    pub fn origin(&self) -> SimulatedOrigin {
        SimulatedOrigin::new(self.miss_latency, self.miss_jitter)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| BenchError::Settings(format!("{}={:?}: {}", name, raw, e))),
    }
}
