//! Sweep orchestration: one run per registered configuration, then ranking

use crate::compare::{compare, ComparisonResult};
use crate::origin::Origin;
use crate::registry::ConfigRegistry;
use crate::runner::TraceRunner;
use crate::summary::RunSummary;
use crate::trace::Trace;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{info, warn};

/// Replays one trace against every configuration of a registry
#[derive(Debug, Clone)]
pub struct Benchmark {
    registry: ConfigRegistry,
    runner: TraceRunner,
}

impl Benchmark {
    pub fn new(registry: ConfigRegistry, runner: TraceRunner) -> Self {
        Self { registry, runner }
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub fn runner(&self) -> &TraceRunner {
        &self.runner
    }

    /// Run every configuration in registration order
    ///
    /// A run that panics becomes a failed summary; the other runs still complete.
    pub fn run(&self, trace: &Trace, origin: &dyn Origin) -> ComparisonResult {
        info!(
            "Running {} configurations over {} requests",
            self.registry.len(),
            trace.len()
        );

        let summaries = self
            .registry
            .list()
            .iter()
            .map(|config| {
                catch_unwind(AssertUnwindSafe(|| self.runner.execute(trace, config, origin)))
                    .unwrap_or_else(|_| {
                        warn!("Run '{}' panicked", config.name);
                        RunSummary::failed(config, "run panicked")
                    })
            })
            .collect();

        self.finish(summaries, trace.len())
    }

    /// Run every configuration concurrently, one blocking task each
    ///
    /// Runs share only the immutable trace and origin, so the result is the
    /// same as [`Benchmark::run`] apart from the sweep id and timestamp.
    pub async fn run_parallel(
        &self,
        trace: Arc<Trace>,
        origin: Arc<dyn Origin>,
    ) -> ComparisonResult {
        use futures::future::join_all;

        info!(
            "Running {} configurations in parallel over {} requests",
            self.registry.len(),
            trace.len()
        );

        let configs = self.registry.list().to_vec();
        let mut handles = vec![];
        for config in configs.iter().cloned() {
            let runner = self.runner.clone();
            let trace = Arc::clone(&trace);
            let origin = Arc::clone(&origin);

            let handle = tokio::task::spawn_blocking(move || {
                runner.execute(&trace, &config, origin.as_ref())
            });
            handles.push(handle);
        }

        let results = join_all(handles).await;

        let summaries = results
            .into_iter()
            .zip(configs.iter())
            .map(|(result, config)| {
                result.unwrap_or_else(|e| {
                    warn!("Run '{}' task failed: {}", config.name, e);
                    RunSummary::failed(config, format!("run task failed: {}", e))
                })
            })
            .collect();

        self.finish(summaries, trace.len())
    }

    fn finish(&self, summaries: Vec<RunSummary>, trace_len: usize) -> ComparisonResult {
        let result = compare(summaries).with_trace_len(trace_len);
        match result.best() {
            Some(best) => info!(
                "Best configuration: {} ({:.2}% hit rate)",
                best.config_name,
                best.hit_rate * 100.0
            ),
            None => warn!("No configuration completed"),
        }
        result
    }
}
