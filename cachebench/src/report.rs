//! Rendering and writing comparison results

use anyhow::{Context, Result};
use cachebench_core::ComparisonResult;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Json,
}

impl ReportFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

pub fn render_comparison(result: &ComparisonResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => Ok(result.to_json()?),
        ReportFormat::Table => {
            let mut out = format!(
                "Sweep {} ({} requests, {})\n\n",
                result.sweep_id,
                result.trace_len,
                result.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            out.push_str(&result.to_string());
            if let Some(best) = result.best() {
                out.push_str(&format!(
                    "\nBest: {} ({:.2}% hit rate, {:.3}ms mean latency)\n",
                    best.config_name,
                    best.hit_rate * 100.0,
                    best.mean_latency_ms
                ));
            }
            for failed in result.failed() {
                if let cachebench_core::RunStatus::Failed { reason } = &failed.status {
                    out.push_str(&format!("Failed: {} ({})\n", failed.config_name, reason));
                }
            }
            Ok(out)
        }
    }
}

/// Write to `path`, or to stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachebench_core::{compare, summarize, CacheStats, PolicyConfig, RunSummary};

    fn result() -> ComparisonResult {
        compare(vec![
            summarize(&[], &PolicyConfig::lru("lru-2", 2), &CacheStats::default()),
            RunSummary::failed(&PolicyConfig::ttl("ttl-5", 5), "origin down"),
        ])
    }

    #[test]
    fn test_table_report() {
        let text = render_comparison(&result(), ReportFormat::Table).unwrap();
        assert!(text.contains("Best: lru-2"));
        assert!(text.contains("Failed: ttl-5 (origin down)"));
    }

    #[test]
    fn test_json_report() {
        let text = render_comparison(&result(), ReportFormat::from_json_flag(true)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["entries"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_output("hello\n", Some(path.as_path())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
