//! Compare the standard catalog over a synthetic workload
//!
//! Run with: cargo run -p cachebench-core --example compare_policies

use cachebench_core::{BenchSettings, Benchmark, ConfigRegistry, Origin, TraceGenerator};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cachebench_core=info".into()),
        ))
        .init();

    let settings = BenchSettings::from_env()?;

    let trace = TraceGenerator {
        requests: 20_000,
        keys: 1_500,
        skew: 0.9,
        step: 2,
        ..Default::default()
    }
    .generate()?;
    println!(
        "Trace: {} requests over {} distinct keys",
        trace.len(),
        trace.distinct_keys()
    );

    let bench = Benchmark::new(ConfigRegistry::standard_catalog(), settings.runner());
    let origin: Arc<dyn Origin> = Arc::new(settings.origin());
    let result = bench.run_parallel(Arc::new(trace), origin).await;

    println!("\n{}", result);
    if let Some(best) = result.best() {
        println!(
            "Best: {} ({:.2}% hit rate, {:.3}ms mean latency)",
            best.config_name,
            best.hit_rate * 100.0,
            best.mean_latency_ms
        );
    }

    Ok(())
}
