//! JSON-lines trace files
//!
//! Each non-blank line holds one request, either with a logical tick:
//!
//! ```text
//! {"key": "q17", "at": 12}
//! ```
//!
//! or with a wall-clock timestamp, converted to whole seconds since the epoch:
//!
//! ```text
//! {"key": "q17", "timestamp": "2024-01-01T00:00:12Z"}
//! ```

use anyhow::{Context, Result};
use cachebench_core::{Trace, TraceError, TraceEvent};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TraceLine {
    key: String,
    #[serde(default)]
    at: Option<u64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

impl TraceLine {
    fn into_event(self, line: usize) -> Result<TraceEvent, TraceError> {
        let at = match (self.at, self.timestamp) {
            (Some(at), None) => at,
            (None, Some(timestamp)) => u64::try_from(timestamp.timestamp()).map_err(|_| {
                TraceError::Parse {
                    line,
                    message: format!("timestamp {} is before the epoch", timestamp),
                }
            })?,
            (Some(_), Some(_)) => {
                return Err(TraceError::Parse {
                    line,
                    message: "both `at` and `timestamp` are set".to_string(),
                })
            }
            (None, None) => {
                return Err(TraceError::Parse {
                    line,
                    message: "missing `at` or `timestamp`".to_string(),
                })
            }
        };
        Ok(TraceEvent::new(self.key, at))
    }
}

/// Parse a JSON-lines trace. Blank lines are skipped; line numbers are 1-based.
pub fn parse_trace(source: &str) -> Result<Trace, TraceError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| {
            let line = index + 1;
            serde_json::from_str::<TraceLine>(text)
                .map_err(|e| TraceError::Parse {
                    line,
                    message: e.to_string(),
                })
                .and_then(|parsed| parsed.into_event(line))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Trace::new)
}

pub fn load_trace(path: &Path) -> Result<Trace> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| TraceError::Io(e.to_string()))
        .with_context(|| format!("Failed to read trace {:?}", path))?;
    let trace = parse_trace(&source).with_context(|| format!("Invalid trace {:?}", path))?;
    tracing::info!("Loaded {} requests from {:?}", trace.len(), path);
    Ok(trace)
}

/// Write a trace as JSON lines using logical ticks
pub fn write_trace<W: Write>(trace: &Trace, mut writer: W) -> Result<()> {
    for event in trace {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_trace(trace: &Trace, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_trace(trace, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticks_and_blank_lines() {
        let source = "{\"key\":\"a\",\"at\":0}\n\n  \n{\"key\":\"b\",\"at\":3}\n";
        let trace = parse_trace(source).unwrap();
        assert_eq!(trace, Trace::from_pairs([("a", 0), ("b", 3)]));
    }

    #[test]
    fn test_parse_timestamps() {
        let source = r#"{"key":"a","timestamp":"1970-01-01T00:01:00Z"}
{"key":"a","timestamp":"1970-01-01T00:01:30+00:00"}"#;
        let trace = parse_trace(source).unwrap();
        assert_eq!(trace, Trace::from_pairs([("a", 60), ("a", 90)]));
    }

    #[test]
    fn test_parse_errors_report_line() {
        let source = "{\"key\":\"a\",\"at\":0}\n\n{\"key\":\"b\"}\n";
        match parse_trace(source) {
            Err(TraceError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("missing"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            parse_trace("not json"),
            Err(TraceError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_trace(r#"{"key":"a","at":1,"timestamp":"2024-01-01T00:00:00Z"}"#),
            Err(TraceError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_pre_epoch_timestamp_rejected() {
        let result = parse_trace(r#"{"key":"a","timestamp":"1969-12-31T23:59:59Z"}"#);
        assert!(matches!(result, Err(TraceError::Parse { .. })));
    }

    #[test]
    fn test_write_then_parse() {
        let trace = Trace::from_pairs([("a", 0), ("b", 7)]);
        let mut buffer = Vec::new();
        write_trace(&trace, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(parse_trace(&text).unwrap(), trace);
    }
}
