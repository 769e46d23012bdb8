//! Request traces: the fixed workload replayed against every configuration

use crate::cache::{CacheKey, Timestamp};
use crate::error::TraceError;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single lookup in a trace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceEvent {
    pub key: CacheKey,
    pub at: Timestamp,
}

impl TraceEvent {
    pub fn new(key: impl Into<CacheKey>, at: Timestamp) -> Self {
        Self {
            key: key.into(),
            at,
        }
    }
}

/// Ordered sequence of lookups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new(events: Vec<TraceEvent>) -> Self {
        Self { events }
    }

    /// Build a trace from `(key, timestamp)` pairs
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<CacheKey>,
        I: IntoIterator<Item = (K, Timestamp)>,
    {
        Self {
            events: pairs
                .into_iter()
                .map(|(key, at)| TraceEvent::new(key, at))
                .collect(),
        }
    }

    /// Check every entry has a key and, if required, that timestamps never go backwards
    pub fn validate(&self, require_monotonic: bool) -> Result<(), TraceError> {
        let mut previous: Option<Timestamp> = None;
        for (index, event) in self.events.iter().enumerate() {
            if event.key.is_empty() {
                return Err(TraceError::EmptyKey { index });
            }
            if require_monotonic {
                if let Some(previous) = previous {
                    if event.at < previous {
                        return Err(TraceError::NonMonotonic {
                            index,
                            previous,
                            current: event.at,
                        });
                    }
                }
            }
            previous = Some(event.at);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of distinct keys requested
    pub fn distinct_keys(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.key.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

impl FromIterator<TraceEvent> for Trace {
    fn from_iter<I: IntoIterator<Item = TraceEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceEvent;
    type IntoIter = std::slice::Iter<'a, TraceEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Seeded synthetic workload generator
///
/// Keys are drawn from a fixed key space with Zipf-like popularity: key `i` has
/// weight `1 / (i + 1)^skew`. A skew of 0 is uniform. The same seed always yields
/// the same trace.
#[derive(Debug, Clone)]
pub struct TraceGenerator {
    pub requests: usize,
    pub keys: usize,
    pub skew: f64,
    pub seed: u64,
    /// Ticks between consecutive requests
    pub step: u64,
    pub key_prefix: String,
}

impl Default for TraceGenerator {
    fn default() -> Self {
        Self {
            requests: 10_000,
            keys: 1_000,
            skew: 1.0,
            seed: 42,
            step: 1,
            key_prefix: "q".to_string(),
        }
    }
}

impl TraceGenerator {
    pub fn generate(&self) -> Result<Trace, TraceError> {
        if self.keys == 0 {
            return Err(TraceError::Generator(
                "key space must not be empty".to_string(),
            ));
        }
        if !self.skew.is_finite() || self.skew < 0.0 {
            return Err(TraceError::Generator(format!(
                "skew must be a non-negative number, got {}",
                self.skew
            )));
        }

        let weights = (0..self.keys).map(|i| 1.0 / ((i + 1) as f64).powf(self.skew));
        let distribution =
            WeightedIndex::new(weights).map_err(|e| TraceError::Generator(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        Ok((0..self.requests)
            .map(|i| {
                let key = distribution.sample(&mut rng);
                TraceEvent::new(
                    format!("{}{}", self.key_prefix, key),
                    (i as u64).saturating_mul(self.step),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let trace = Trace::from_pairs([("a", 0), ("b", 1), ("a", 2)]);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.distinct_keys(), 2);
        assert_eq!(trace.events()[2], TraceEvent::new("a", 2));
    }

    #[test]
    fn test_validate_empty_key() {
        let trace = Trace::from_pairs([("a", 0), ("", 1)]);
        assert_eq!(trace.validate(false), Err(TraceError::EmptyKey { index: 1 }));
    }

    #[test]
    fn test_validate_monotonic() {
        let trace = Trace::from_pairs([("a", 5), ("b", 5), ("c", 3)]);
        assert_eq!(
            trace.validate(true),
            Err(TraceError::NonMonotonic {
                index: 2,
                previous: 5,
                current: 3
            })
        );
        assert!(trace.validate(false).is_ok());
    }

    #[test]
    fn test_empty_trace_is_valid() {
        let trace = Trace::default();
        assert!(trace.validate(true).is_ok());
        assert!(trace.is_empty());
    }

    #[test]
    fn test_serde_shape() {
        let trace = Trace::from_pairs([("a", 1)]);
        let json = serde_json::to_string(&trace).unwrap();
        assert_eq!(json, r#"[{"key":"a","at":1}]"#);
    }

    #[test]
    fn test_generator_is_deterministic() {
        let generator = TraceGenerator {
            requests: 500,
            keys: 50,
            ..Default::default()
        };

        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 500);
        assert!(first.validate(true).is_ok());
        assert!(first.distinct_keys() <= 50);
    }

    #[test]
    fn test_generator_skew_concentrates_requests() {
        let skewed = TraceGenerator {
            requests: 2_000,
            keys: 100,
            skew: 1.5,
            ..Default::default()
        }
        .generate()
        .unwrap();

        let hottest = skewed.iter().filter(|e| e.key == "q0").count();
        assert!(hottest > 2_000 / 100);
    }

    #[test]
    fn test_generator_rejects_bad_parameters() {
        let empty = TraceGenerator {
            keys: 0,
            ..Default::default()
        };
        assert!(matches!(empty.generate(), Err(TraceError::Generator(_))));

        let negative = TraceGenerator {
            skew: -1.0,
            ..Default::default()
        };
        assert!(negative.generate().is_err());
    }
}
