use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachebench::{
    load_catalog, load_trace, render_catalog, render_comparison, save_trace, write_output,
    write_trace, CatalogSource, ReportFormat,
};
use cachebench_core::{BenchSettings, Benchmark, Origin, TraceGenerator};

#[derive(Parser)]
#[command(name = "cachebench")]
#[command(about = "Compare cache eviction policies over a request trace", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configurations a sweep would run
    Catalog {
        /// YAML or JSON catalog file (defaults to the standard catalog)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Use one configuration per policy sized from CACHE_SIZE / CACHE_TTL
        #[arg(long, conflicts_with = "catalog")]
        baseline: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a synthetic trace
    Generate {
        /// Number of requests
        #[arg(short, long, default_value = "10000")]
        requests: usize,

        /// Size of the key space
        #[arg(short, long, default_value = "1000")]
        keys: usize,

        /// Popularity skew (0 = uniform)
        #[arg(long, default_value = "1.0")]
        skew: f64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Ticks between requests
        #[arg(long, default_value = "1")]
        step: u64,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a trace against every configuration and rank them
    Run {
        /// Trace file (JSON lines)
        #[arg(short, long)]
        trace: PathBuf,

        /// YAML or JSON catalog file (defaults to the standard catalog)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Use one configuration per policy sized from CACHE_SIZE / CACHE_TTL
        #[arg(long, conflicts_with = "catalog")]
        baseline: bool,

        /// Run configurations in parallel
        #[arg(long)]
        parallel: bool,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Origin base latency for misses
        #[arg(long)]
        miss_latency_ms: Option<u64>,

        /// Latency recorded for hits
        #[arg(long)]
        hit_latency_us: Option<u64>,

        /// Origin latency spread (0.0 - 1.0)
        #[arg(long)]
        jitter: Option<f64>,

        /// Sweep expired entries every N requests
        #[arg(long)]
        sweep_every: Option<usize>,

        /// Accept traces whose timestamps go backwards
        #[arg(long)]
        allow_unordered: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cachebench=info,cachebench_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut settings = BenchSettings::from_env().context("Failed to load settings")?;

    match cli.command {
        Commands::Catalog { ref catalog, baseline, json } => {
            let registry = load_catalog(catalog_source(catalog, baseline, &settings))?;
            if json {
                println!("{}", serde_json::to_string_pretty(registry.list())?);
            } else {
                print!("{}", render_catalog(registry.list()));
            }
        }

        Commands::Generate { requests, keys, skew, seed, step, ref output } => {
            let generator = TraceGenerator {
                requests,
                keys,
                skew,
                seed,
                step,
                ..Default::default()
            };
            let trace = generator.generate()?;

            match output {
                Some(path) => {
                    save_trace(&trace, path)?;
                    println!(
                        "Wrote {} requests over {} distinct keys to {:?}",
                        trace.len(),
                        trace.distinct_keys(),
                        path
                    );
                }
                None => write_trace(&trace, std::io::stdout().lock())?,
            }
        }

        Commands::Run {
            ref trace,
            ref catalog,
            baseline,
            parallel,
            json,
            ref output,
            miss_latency_ms,
            hit_latency_us,
            jitter,
            sweep_every,
            allow_unordered,
        } => {
            if let Some(ms) = miss_latency_ms {
                settings = settings.with_miss_latency(Duration::from_millis(ms));
            }
            if let Some(us) = hit_latency_us {
                settings = settings.with_hit_latency(Duration::from_micros(us));
            }
            if let Some(jitter) = jitter {
                settings = settings.with_miss_jitter(jitter);
            }
            if sweep_every.is_some() {
                settings = settings.with_sweep_every(sweep_every);
            }
            if parallel {
                settings = settings.with_parallel(true);
            }
            if allow_unordered {
                settings.require_monotonic = false;
            }
            settings.validate()?;

            let registry = load_catalog(catalog_source(catalog, baseline, &settings))?;
            let trace = load_trace(trace)?;
            let bench = Benchmark::new(registry, settings.runner());

            let result = if settings.parallel {
                let origin: Arc<dyn Origin> = Arc::new(settings.origin());
                bench.run_parallel(Arc::new(trace), origin).await
            } else {
                bench.run(&trace, &settings.origin())
            };

            let rendered = render_comparison(&result, ReportFormat::from_json_flag(json))?;
            write_output(&rendered, output.as_deref())?;
        }
    }

    Ok(())
}

fn catalog_source<'a>(
    catalog: &'a Option<PathBuf>,
    baseline: bool,
    settings: &'a BenchSettings,
) -> CatalogSource<'a> {
    match catalog {
        Some(path) => CatalogSource::File(path),
        None if baseline => CatalogSource::Baseline(settings),
        None => CatalogSource::Standard,
    }
}
