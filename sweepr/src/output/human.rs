use std::path::Path;
use std::sync::Arc;

use sweepr_core::{BenchConfig, BenchReport, ProgressEvent};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, config_path: &Path, cfg: &BenchConfig) {
        println!("config: {}", config_path.display());
        println!("target: {}", cfg.base_url);
        for run in &cfg.runs {
            println!(
                "run: {} {} {} levels={:?} requests_per_level={}",
                run.name, run.method, run.path, run.concurrency_levels, run.requests_per_level
            );
        }
        println!();
    }

    fn progress(&self) -> Option<sweepr_core::ProgressFn> {
        Some(Arc::new(|event| match event {
            ProgressEvent::ContextReady { context } => {
                let pairs: Vec<String> = context
                    .iter()
                    .map(|(k, v)| {
                        if v.is_empty() {
                            format!("{k}=<empty>")
                        } else {
                            format!("{k}={v}")
                        }
                    })
                    .collect();
                println!("[prepare] context: {}", pairs.join(" "));
            }
            ProgressEvent::RunStarted { name, method, url } => {
                println!("[run:{name}] {method} {url}");
            }
            ProgressEvent::LevelFinished { summary } => {
                println!(
                    "  [c={}] ok={}/{} throughput={:.2} rps p95={:.1} ms",
                    summary.concurrency,
                    summary.ok,
                    summary.requests,
                    summary.throughput_rps,
                    summary.latency_p95_ms
                );
            }
        }))
    }

    fn print_report(&self, report: &BenchReport) -> anyhow::Result<()> {
        println!("\nsummary");
        println!(
            "{:<16} {:>5} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "run", "c", "ok", "errors", "elapsed", "rps", "avg_ms", "p95_ms", "p99_ms"
        );
        for s in &report.levels {
            println!(
                "{:<16} {:>5} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
                s.run_label,
                s.concurrency,
                s.ok,
                s.errors,
                format_seconds(s.elapsed_s),
                format_float(s.throughput_rps, 2),
                format_float(s.latency_avg_ms, 1),
                format_float(s.latency_p95_ms, 1),
                format_float(s.latency_p99_ms, 1),
            );
        }

        if report.interrupted {
            eprintln!("\ninterrupted: sweep stopped early, results above are partial");
        }

        Ok(())
    }
}

fn format_seconds(v: f64) -> String {
    format!("{v:.2}s")
}

fn format_float(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        "-".to_string()
    } else {
        format!("{v:.decimals$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepr_core::LevelSummary;

    #[test]
    fn nan_fields_render_as_dash() {
        assert_eq!(format_float(f64::NAN, 1), "-");
        assert_eq!(format_float(12.345, 2), "12.35");
    }

    #[test]
    fn report_printing_handles_empty_and_nan_rows() {
        let report = BenchReport {
            levels: vec![LevelSummary {
                run_label: "empty".to_string(),
                concurrency: 1,
                requests: 0,
                ok: 0,
                errors: 0,
                elapsed_s: 0.0,
                throughput_rps: 0.0,
                latency_avg_ms: f64::NAN,
                latency_p50_ms: f64::NAN,
                latency_p95_ms: f64::NAN,
                latency_p99_ms: f64::NAN,
            }],
            interrupted: false,
        };

        let out = HumanReadableOutput;
        assert!(out.print_report(&report).is_ok());
    }
}
