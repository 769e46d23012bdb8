//! Origin services that answer cache misses
//!
//! The runner never invents latency: on a miss it asks the origin for the value
//! and the time the origin took to produce it, and records exactly that.

use crate::cache::CacheValue;
use crate::error::OriginError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A value fetched from the origin and how long it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub value: CacheValue,
    pub latency: Duration,
}

/// Source of truth behind the cache
pub trait Origin: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Fetched, OriginError>;
}

impl<F> Origin for F
where
    F: Fn(&str) -> Result<Fetched, OriginError> + Send + Sync,
{
    fn fetch(&self, key: &str) -> Result<Fetched, OriginError> {
        self(key)
    }
}

/// Origin with a constant miss latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLatencyOrigin {
    pub latency: Duration,
}

impl FixedLatencyOrigin {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Origin for FixedLatencyOrigin {
    fn fetch(&self, key: &str) -> Result<Fetched, OriginError> {
        Ok(Fetched {
            value: Arc::from(format!("answer:{}", key)),
            latency: self.latency,
        })
    }
}

/// Simulated answer service with per-key latency variation
///
/// Each key gets a latency in `base * [1 - jitter, 1 + jitter]`, chosen by a
/// stable hash of the key, so the same key always costs the same and repeated
/// runs stay identical.
#[derive(Clone, PartialEq)]
pub struct SimulatedOrigin {
    pub base: Duration,
    pub jitter: f64,
}

impl SimulatedOrigin {
    pub fn new(base: Duration, jitter: f64) -> Self {
        Self {
            base,
            jitter: clamp_jitter(jitter),
        }
    }

    /// Latency assigned to `key`
    pub fn latency_for(&self, key: &str) -> Duration {
        let jitter = clamp_jitter(self.jitter);
        if jitter == 0.0 {
            return self.base;
        }
        // Map the hash onto [-1, 1]
        let unit = (fnv1a(key.as_bytes()) % 20_001) as f64 / 10_000.0 - 1.0;
        Duration::try_from_secs_f64(self.base.as_secs_f64() * (1.0 + unit * jitter))
            .unwrap_or(self.base)
    }
}

impl Default for SimulatedOrigin {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), 0.2)
    }
}

impl fmt::Debug for SimulatedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimulatedOrigin({:?} ±{:.0}%)", self.base, self.jitter * 100.0)
    }
}

impl Origin for SimulatedOrigin {
    fn fetch(&self, key: &str) -> Result<Fetched, OriginError> {
        Ok(Fetched {
            value: Arc::from(format!("answer:{}", key)),
            latency: self.latency_for(key),
        })
    }
}

/// Non-finite spreads count as none
fn clamp_jitter(jitter: f64) -> f64 {
    if jitter.is_finite() {
        jitter.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
