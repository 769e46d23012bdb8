//! Policy configurations under comparison

use crate::cache::types::PolicyKind;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named policy configuration
///
/// Capacity applies to LRU and TTL-LRU; TTL (in ticks) applies to TTL and
/// TTL-LRU. Parameters that the kind does not use are rejected by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicyConfig")]
pub struct PolicyConfig {
    /// Unique name within a registry
    pub name: String,

    /// Eviction policy kind
    pub kind: PolicyKind,

    /// Maximum entry count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,

    /// Time-to-live in ticks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl PolicyConfig {
    /// Capacity-bounded LRU
    pub fn lru(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            kind: PolicyKind::Lru,
            capacity: Some(capacity),
            ttl: None,
        }
    }

    /// TTL expiry without a size bound
    pub fn ttl(name: impl Into<String>, ttl: u64) -> Self {
        Self {
            name: name.into(),
            kind: PolicyKind::Ttl,
            capacity: None,
            ttl: Some(ttl),
        }
    }

    /// Capacity-bounded LRU with TTL expiry
    pub fn ttl_lru(name: impl Into<String>, capacity: usize, ttl: u64) -> Self {
        Self {
            name: name.into(),
            kind: PolicyKind::TtlLru,
            capacity: Some(capacity),
            ttl: Some(ttl),
        }
    }

    /// Create a new builder for a policy configuration
    pub fn builder(name: impl Into<String>, kind: PolicyKind) -> PolicyConfigBuilder {
        PolicyConfigBuilder {
            name: name.into(),
            kind,
            capacity: None,
            ttl: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        RawPolicyConfig::from(self.clone()).check().map(|_| ())
    }

    /// Short parameter label, e.g. `cap=100`, `ttl=300` or `cap=100,ttl=300`
    pub fn capacity_or_ttl(&self) -> String {
        match (self.capacity, self.ttl) {
            (Some(capacity), Some(ttl)) => format!("cap={},ttl={}", capacity, ttl),
            (Some(capacity), None) => format!("cap={}", capacity),
            (None, Some(ttl)) => format!("ttl={}", ttl),
            (None, None) => "-".to_string(),
        }
    }
}

impl fmt::Display for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.kind, self.capacity_or_ttl())
    }
}

/// Unvalidated configuration as it appears in catalog files
///
/// Parameters are signed so that negative values reach validation and are
/// reported as `ConfigError` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPolicyConfig {
    pub name: String,
    pub kind: PolicyKind,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl RawPolicyConfig {
    fn check(self) -> Result<PolicyConfig, ConfigError> {
        let name = self.name;
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }

        let capacity = match (self.kind.is_capacity_bounded(), self.capacity) {
            (true, None) => {
                return Err(ConfigError::MissingParameter {
                    name,
                    parameter: "capacity",
                })
            }
            (true, Some(value)) => match usize::try_from(value) {
                Ok(capacity) if capacity > 0 => Some(capacity),
                _ => return Err(ConfigError::InvalidCapacity { name, value }),
            },
            (false, None) => None,
            (false, Some(_)) => {
                return Err(ConfigError::UnexpectedParameter {
                    name,
                    parameter: "capacity",
                    kind: self.kind.as_str(),
                })
            }
        };

        let ttl = match (self.kind.is_ttl_bounded(), self.ttl) {
            (true, None) => {
                return Err(ConfigError::MissingParameter {
                    name,
                    parameter: "ttl",
                })
            }
            (true, Some(value)) => match u64::try_from(value) {
                Ok(ttl) if ttl > 0 => Some(ttl),
                _ => return Err(ConfigError::InvalidTtl { name, value }),
            },
            (false, None) => None,
            (false, Some(_)) => {
                return Err(ConfigError::UnexpectedParameter {
                    name,
                    parameter: "ttl",
                    kind: self.kind.as_str(),
                })
            }
        };

        Ok(PolicyConfig {
            name,
            kind: self.kind,
            capacity,
            ttl,
        })
    }
}

impl TryFrom<RawPolicyConfig> for PolicyConfig {
    type Error = ConfigError;

    fn try_from(raw: RawPolicyConfig) -> Result<Self, Self::Error> {
        raw.check()
    }
}

impl From<PolicyConfig> for RawPolicyConfig {
    fn from(config: PolicyConfig) -> Self {
        Self {
            name: config.name,
            kind: config.kind,
            capacity: config
                .capacity
                .map(|c| i64::try_from(c).unwrap_or(i64::MAX)),
            ttl: config.ttl.map(|t| i64::try_from(t).unwrap_or(i64::MAX)),
        }
    }
}

/// Builder for policy configurations with validation
#[derive(Debug)]
pub struct PolicyConfigBuilder {
    name: String,
    kind: PolicyKind,
    capacity: Option<usize>,
    ttl: Option<u64>,
}

impl PolicyConfigBuilder {
    /// Set the maximum entry count
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the time-to-live in ticks
    pub fn ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<PolicyConfig, ConfigError> {
        let config = PolicyConfig {
            name: self.name,
            kind: self.kind,
            capacity: self.capacity,
            ttl: self.ttl,
        };
        config.validate()?;
        Ok(config)
    }
}
