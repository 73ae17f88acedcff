use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use sweepr_core::{BenchConfig, BenchReport, LevelSummary, ProgressEvent};

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _config_path: &Path, _cfg: &BenchConfig) {}

    fn progress(&self) -> Option<sweepr_core::ProgressFn> {
        Some(Arc::new(|event| match event {
            ProgressEvent::ContextReady { context } => {
                emit_json_line(&JsonContextLine {
                    kind: "context",
                    context: context.into_iter().collect(),
                });
            }
            ProgressEvent::RunStarted { name, method, url } => {
                emit_json_line(&JsonRunLine {
                    kind: "run",
                    name,
                    method: method.to_string(),
                    url,
                });
            }
            ProgressEvent::LevelFinished { summary } => {
                emit_json_line(&JsonLevelLine {
                    kind: "level",
                    level: JsonLevel::from(&summary),
                });
            }
        }))
    }

    fn print_report(&self, report: &BenchReport) -> anyhow::Result<()> {
        emit_json_line(&JsonSummaryLine {
            kind: "summary",
            interrupted: report.interrupted,
            levels: report.levels.iter().map(JsonLevel::from).collect(),
        });
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonContextLine {
    kind: &'static str,
    context: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct JsonRunLine {
    kind: &'static str,
    name: String,
    method: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct JsonLevelLine {
    kind: &'static str,
    level: JsonLevel,
}

#[derive(Debug, Serialize)]
struct JsonSummaryLine {
    kind: &'static str,
    interrupted: bool,
    levels: Vec<JsonLevel>,
}

/// NaN latency fields serialize as `null`.
#[derive(Debug, Serialize)]
struct JsonLevel {
    run_label: String,
    concurrency: u32,
    requests: u64,
    ok: u64,
    errors: u64,
    elapsed_s: f64,
    throughput_rps: f64,
    latency_avg_ms: Option<f64>,
    latency_p50_ms: Option<f64>,
    latency_p95_ms: Option<f64>,
    latency_p99_ms: Option<f64>,
}

impl From<&LevelSummary> for JsonLevel {
    fn from(s: &LevelSummary) -> Self {
        let opt = |v: f64| if v.is_nan() { None } else { Some(v) };
        Self {
            run_label: s.run_label.clone(),
            concurrency: s.concurrency,
            requests: s.requests,
            ok: s.ok,
            errors: s.errors,
            elapsed_s: s.elapsed_s,
            throughput_rps: s.throughput_rps,
            latency_avg_ms: opt(s.latency_avg_ms),
            latency_p50_ms: opt(s.latency_p50_ms),
            latency_p95_ms: opt(s.latency_p95_ms),
            latency_p99_ms: opt(s.latency_p99_ms),
        }
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::Value;

    fn sample_summary() -> LevelSummary {
        LevelSummary {
            run_label: "submit".to_string(),
            concurrency: 4,
            requests: 10,
            ok: 9,
            errors: 1,
            elapsed_s: 0.5,
            throughput_rps: 18.0,
            latency_avg_ms: 12.0,
            latency_p50_ms: 11.0,
            latency_p95_ms: 20.0,
            latency_p99_ms: 25.0,
        }
    }

    #[test]
    fn level_line_has_kind_and_fields() {
        let line = JsonLevelLine {
            kind: "level",
            level: JsonLevel::from(&sample_summary()),
        };

        let v: Value = serde_json::to_value(&line).unwrap();
        assert_eq!(v.get("kind").and_then(Value::as_str), Some("level"));
        assert_eq!(
            v.pointer("/level/run_label").and_then(Value::as_str),
            Some("submit")
        );
        assert_eq!(v.pointer("/level/ok").and_then(Value::as_u64), Some(9));
    }

    #[test]
    fn nan_latency_serializes_as_null() {
        let mut s = sample_summary();
        s.latency_avg_ms = f64::NAN;
        s.latency_p50_ms = f64::NAN;

        let v: Value = serde_json::to_value(JsonLevel::from(&s)).unwrap();
        assert!(v.get("latency_avg_ms").unwrap().is_null());
        assert!(v.get("latency_p50_ms").unwrap().is_null());
        assert_eq!(
            v.get("latency_p95_ms").and_then(Value::as_f64),
            Some(20.0)
        );
    }
}
