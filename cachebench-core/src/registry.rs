//! Registry of policy configurations to benchmark

use crate::cache::{PolicyConfig, RawPolicyConfig};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// LRU capacities of the standard catalog (entries)
pub const STANDARD_CAPACITIES: [usize; 5] = [50, 100, 250, 500, 1000];

/// TTL durations of the standard catalog (seconds)
pub const STANDARD_TTLS: [u64; 5] = [60, 300, 900, 1800, 3600];

/// Ordered set of validated configurations with unique names
///
/// Iteration follows registration order so sweeps run in a reproducible order.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: Vec<PolicyConfig>,
    names: HashSet<String>,
}

/// Catalog document: either a bare list or `{ configs: [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<RawPolicyConfig>),
    Wrapped { configs: Vec<RawPolicyConfig> },
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configuration, rejecting duplicates and invalid parameters
    pub fn register(&mut self, config: PolicyConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.names.contains(&config.name) {
            return Err(ConfigError::DuplicateName(config.name));
        }

        debug!("Registered configuration {}", config);
        self.names.insert(config.name.clone());
        self.configs.push(config);
        Ok(())
    }

    /// Register every configuration, keeping the valid ones
    ///
    /// Returns the errors of the rejected configurations.
    pub fn register_all<I>(&mut self, configs: I) -> Vec<ConfigError>
    where
        I: IntoIterator<Item = PolicyConfig>,
    {
        configs
            .into_iter()
            .filter_map(|config| self.register(config).err())
            .inspect(|err| warn!("Rejected configuration: {}", err))
            .collect()
    }

    /// Register unvalidated catalog entries, keeping the valid ones
    pub fn register_raw<I>(&mut self, configs: I) -> Vec<ConfigError>
    where
        I: IntoIterator<Item = RawPolicyConfig>,
    {
        let mut rejected = Vec::new();
        for raw in configs {
            match PolicyConfig::try_from(raw) {
                Ok(config) => {
                    if let Err(err) = self.register(config) {
                        warn!("Rejected configuration: {}", err);
                        rejected.push(err);
                    }
                }
                Err(err) => {
                    warn!("Rejected configuration: {}", err);
                    rejected.push(err);
                }
            }
        }
        rejected
    }

    /// Parse a YAML (or JSON) catalog
    ///
    /// A document that cannot be parsed is an error. Individual invalid entries
    /// are rejected and returned alongside the registry of accepted ones.
    pub fn from_yaml_str(source: &str) -> Result<(Self, Vec<ConfigError>), ConfigError> {
        let document: CatalogDocument =
            serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let raw = match document {
            CatalogDocument::List(configs) => configs,
            CatalogDocument::Wrapped { configs } => configs,
        };

        let mut registry = Self::new();
        let rejected = registry.register_raw(raw);
        Ok((registry, rejected))
    }

    /// The fixed 15-configuration catalog: five LRU capacities, five TTL
    /// durations, and five TTL-LRU pairs combining them index by index
    pub fn standard_catalog() -> Self {
        let lru = STANDARD_CAPACITIES
            .iter()
            .map(|&capacity| PolicyConfig::lru(format!("lru-{}", capacity), capacity));
        let ttl = STANDARD_TTLS
            .iter()
            .map(|&ttl| PolicyConfig::ttl(format!("ttl-{}", ttl), ttl));
        let hybrid = STANDARD_CAPACITIES
            .iter()
            .zip(STANDARD_TTLS.iter())
            .map(|(&capacity, &ttl)| {
                PolicyConfig::ttl_lru(format!("ttl-lru-{}-{}", capacity, ttl), capacity, ttl)
            });

        let mut registry = Self::new();
        let rejected = registry.register_all(lru.chain(ttl).chain(hybrid));
        debug_assert!(rejected.is_empty());
        registry
    }

    /// Configurations in registration order
    pub fn list(&self) -> &[PolicyConfig] {
        &self.configs
    }

    pub fn get(&self, name: &str) -> Option<&PolicyConfig> {
        self.configs.iter().find(|config| config.name == name)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
