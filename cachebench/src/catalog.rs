//! Selecting the configurations to compare

use anyhow::{bail, Context, Result};
use cachebench_core::{BenchSettings, ConfigRegistry, PolicyConfig};
use std::fmt::Write;
use std::path::Path;

/// Where the configurations of a sweep come from
#[derive(Debug, Clone, Copy)]
pub enum CatalogSource<'a> {
    /// The fixed 15-configuration catalog
    Standard,
    /// One configuration per policy kind, sized from the settings
    Baseline(&'a BenchSettings),
    /// A YAML or JSON catalog file
    File(&'a Path),
}

pub fn load_catalog(source: CatalogSource<'_>) -> Result<ConfigRegistry> {
    match source {
        CatalogSource::Standard => Ok(ConfigRegistry::standard_catalog()),
        CatalogSource::Baseline(settings) => {
            let mut registry = ConfigRegistry::new();
            let rejected = registry.register_all(settings.baseline_configs());
            if let Some(err) = rejected.into_iter().next() {
                return Err(err).context("Invalid baseline configuration");
            }
            Ok(registry)
        }
        CatalogSource::File(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read catalog {:?}", path))?;
            let (registry, rejected) = ConfigRegistry::from_yaml_str(&source)
                .with_context(|| format!("Invalid catalog {:?}", path))?;

            if !rejected.is_empty() {
                tracing::warn!(
                    "Skipped {} invalid configuration(s) in {:?}",
                    rejected.len(),
                    path
                );
            }
            if registry.is_empty() {
                bail!("Catalog {:?} contains no valid configurations", path);
            }
            Ok(registry)
        }
    }
}

/// Render configurations as a fixed-width table
pub fn render_catalog(configs: &[PolicyConfig]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<4} {:<24} {:<8} {:<18}", "#", "config", "policy", "parameters");
    for (i, config) in configs.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<24} {:<8} {:<18}",
            i + 1,
            config.name,
            config.kind,
            config.capacity_or_ttl()
        );
    }
    out
}
