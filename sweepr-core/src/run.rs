use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use sweepr_http::{HttpClient, HttpRequest};

use crate::config::{BenchConfig, Method, RunSpec};
use crate::context::{BenchContext, prepare_context};
use crate::error::{Error, Result};
use crate::invoker::invoke;
use crate::level::{ShutdownFlag, run_level};
use crate::outcome::LevelSummary;
use crate::sink::{RawSink, SummaryWriter};
use crate::template::resolve;

/// Engine progress notifications, consumed by the CLI's output formatters.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    ContextReady {
        context: BenchContext,
    },
    RunStarted {
        name: String,
        method: Method,
        url: String,
    },
    LevelFinished {
        summary: LevelSummary,
    },
}

pub type ProgressFn = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Everything a finished (or interrupted) invocation produced, beyond the
/// files already on disk.
#[derive(Debug, Clone, Default)]
pub struct BenchReport {
    pub levels: Vec<LevelSummary>,
    pub interrupted: bool,
}

/// Execute the configured runs in order, strictly sequentially.
///
/// The bootstrap context is built once and shared read-only by every run.
/// Levels within a run never overlap, and runs never overlap: each level's
/// throughput measurement owns the full concurrency budget. Raw rows stream
/// to `<name>_raw.csv` as requests complete; each level appends its summary
/// row to `<name>_summary.csv` and `combined_summary.csv`.
pub async fn run_benchmark(
    cfg: &BenchConfig,
    shutdown: Arc<ShutdownFlag>,
    progress: Option<ProgressFn>,
) -> Result<BenchReport> {
    cfg.validate()?;

    std::fs::create_dir_all(&cfg.output_dir).map_err(|source| Error::OutputDir {
        path: cfg.output_dir.display().to_string(),
        source,
    })?;

    let emit = |event: ProgressEvent| {
        if let Some(p) = &progress {
            p(event);
        }
    };

    let client = Arc::new(HttpClient::default());

    let ctx = prepare_context(&client, &cfg.base_url, &cfg.headers, cfg.timeout).await;
    emit(ProgressEvent::ContextReady {
        context: ctx.clone(),
    });

    let mut combined = SummaryWriter::create(&cfg.output_dir.join("combined_summary.csv"))?;

    let mut report = BenchReport::default();

    for run in &cfg.runs {
        if shutdown.is_triggered() {
            break;
        }

        let request = prepare_request(cfg, run, &ctx);
        emit(ProgressEvent::RunStarted {
            name: run.name.clone(),
            method: run.method,
            url: request.url.clone(),
        });

        run_warmup(&client, &request, run.warmup_requests).await;

        let raw_path = cfg.output_dir.join(format!("{}_raw.csv", run.name));
        let raw = RawSink::create(&raw_path, raw_channel_capacity(run))?;
        let mut per_run = SummaryWriter::create(
            &cfg.output_dir.join(format!("{}_summary.csv", run.name)),
        )?;

        let mut level_error = None;
        for &concurrency in &run.concurrency_levels {
            if shutdown.is_triggered() {
                break;
            }

            let summary = match run_level(
                &client,
                &request,
                concurrency,
                run.requests_per_level,
                &run.name,
                raw.sender(),
                &shutdown,
            )
            .await
            {
                Ok(summary) => summary,
                Err(err) => {
                    level_error = Some(err);
                    break;
                }
            };

            per_run.write(&summary)?;
            combined.write(&summary)?;
            emit(ProgressEvent::LevelFinished {
                summary: summary.clone(),
            });
            report.levels.push(summary);
        }

        // Drain the raw writer before surfacing any level failure so the
        // rows that did complete are on disk.
        raw.finish().await?;
        if let Some(err) = level_error {
            return Err(err);
        }
    }

    report.interrupted = shutdown.is_triggered();
    Ok(report)
}

/// Unmeasured traffic to prime connections and caches on the target: fire
/// everything at once, discard outcomes, ignore errors.
async fn run_warmup(client: &Arc<HttpClient>, request: &HttpRequest, warmup_requests: u32) {
    if warmup_requests == 0 {
        return;
    }

    let mut handles = Vec::with_capacity(warmup_requests as usize);
    for _ in 0..warmup_requests {
        let client = client.clone();
        let request = request.clone();
        handles.push(tokio::spawn(async move {
            let _ = invoke(&client, request).await;
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }
}

/// Raw-row channel capacity: a couple of slots per gate unit keeps memory
/// bounded by in-flight concurrency while the writer catches up.
fn raw_channel_capacity(run: &RunSpec) -> usize {
    let max_level = run.concurrency_levels.iter().copied().max().unwrap_or(1);
    (max_level as usize).saturating_mul(2).max(16)
}

/// Build the one request this run repeats: templates resolved against the
/// context, GET queries urlencoded, POST bodies serialized once.
fn prepare_request(cfg: &BenchConfig, run: &RunSpec, ctx: &BenchContext) -> HttpRequest {
    let mut url = if run.path.starts_with("http://") || run.path.starts_with("https://") {
        run.path.clone()
    } else {
        let base = cfg.base_url.trim_end_matches('/');
        let path = run.path.as_str();
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    };

    let mut headers = cfg.headers.clone();
    let mut body = Bytes::new();

    match run.method {
        Method::Get => {
            if let Some(query) = run.query.as_ref().map(|q| resolve(q, ctx))
                && let Value::Object(pairs) = &query
                && !pairs.is_empty()
            {
                let mut encoded = url::form_urlencoded::Serializer::new(String::new());
                for (k, v) in pairs {
                    encoded.append_pair(k, &scalar_str(v));
                }
                url = format!("{url}?{}", encoded.finish());
            }
        }
        Method::Post => {
            if let Some(tpl) = &run.json_body {
                let resolved = resolve(tpl, ctx);
                body = Bytes::from(serde_json::to_vec(&resolved).unwrap_or_default());
                headers.push(("content-type".to_string(), "application/json".to_string()));
            }
        }
    }

    HttpRequest {
        method: run.method.as_http(),
        url,
        headers,
        body,
        timeout: Some(cfg.timeout),
    }
}

fn scalar_str(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::Duration;

    fn base_config() -> BenchConfig {
        BenchConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            headers: vec![("x-bench".to_string(), "1".to_string())],
            timeout: Duration::from_secs(5),
            output_dir: PathBuf::from("./bench_runs"),
            runs: Vec::new(),
        }
    }

    fn ctx(pairs: &[(&str, &str)]) -> BenchContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn post_request_resolves_body_and_sets_content_type() {
        let cfg = base_config();
        let mut run = RunSpec::new("submit", Method::Post, "/submit");
        run.json_body = Some(json!({"token": "${TOKEN}", "artifact": "m"}));

        let req = prepare_request(&cfg, &run, &ctx(&[("TOKEN", "abc")]));

        assert_eq!(req.method, http::Method::POST);
        assert_eq!(req.url, "http://127.0.0.1:8080/submit");
        let body: Value = serde_json::from_slice(&req.body).unwrap();
        assert_eq!(body, json!({"token": "abc", "artifact": "m"}));
        assert!(
            req.headers
                .iter()
                .any(|(k, v)| k == "content-type" && v == "application/json")
        );
        assert!(req.headers.iter().any(|(k, _)| k == "x-bench"));
    }

    #[test]
    fn get_request_encodes_resolved_query() {
        let cfg = base_config();
        let mut run = RunSpec::new("leaderboard", Method::Get, "/leaderboard");
        run.query = Some(json!({"challenge_id": "${CHALLENGE_ID}", "top": 10}));

        let req = prepare_request(&cfg, &run, &ctx(&[("CHALLENGE_ID", "ch 1")]));

        assert_eq!(req.method, http::Method::GET);
        assert!(req.body.is_empty());
        assert!(req.url.starts_with("http://127.0.0.1:8080/leaderboard?"));
        assert!(req.url.contains("challenge_id=ch+1"));
        assert!(req.url.contains("top=10"));
    }

    #[test]
    fn get_without_query_keeps_plain_url() {
        let cfg = base_config();
        let run = RunSpec::new("health", Method::Get, "health");

        let req = prepare_request(&cfg, &run, &ctx(&[]));
        assert_eq!(req.url, "http://127.0.0.1:8080/health");
    }

    #[test]
    fn absolute_run_path_bypasses_base_url() {
        let cfg = base_config();
        let run = RunSpec::new("ext", Method::Get, "http://other:9999/x");

        let req = prepare_request(&cfg, &run, &ctx(&[]));
        assert_eq!(req.url, "http://other:9999/x");
    }
}
