use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use sweepr_core::{BenchConfig, Method, RunSpec};

const DEFAULT_TIMEOUT_SECONDS: f64 = 30.0;
const DEFAULT_OUTPUT_DIR: &str = "./bench_runs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SuiteYaml {
    pub base_url: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub headers: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_seconds: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub runs: Vec<RunYaml>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RunYaml {
    pub name: String,

    /// GET or POST; defaults to POST like the measured workflow steps.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,

    /// Accepted as an alias for `path`; useful for absolute targets.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub json_body: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub query: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub concurrency_levels: Option<Vec<u32>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub requests_per_level: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warmup_requests: Option<u32>,
}

pub(crate) async fn load_config(path: &Path) -> anyhow::Result<BenchConfig> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read config: {}", path.display()))?;

    let doc: SuiteYaml = serde_yaml::from_slice(&bytes)
        .with_context(|| format!("failed to parse YAML: {}", path.display()))?;

    suite_yaml_into_config(doc)
}

fn suite_yaml_into_config(doc: SuiteYaml) -> anyhow::Result<BenchConfig> {
    let timeout_seconds = doc.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
    if !timeout_seconds.is_finite() || timeout_seconds <= 0.0 {
        anyhow::bail!("`timeout_seconds` must be a positive number, got {timeout_seconds}");
    }

    let output_dir = doc
        .output_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let mut runs = Vec::with_capacity(doc.runs.len());
    for run in doc.runs {
        let name = run.name;

        let method: Method = match run.method.as_deref() {
            None => Method::default(),
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("run `{name}`: invalid method `{raw}` (expected GET or POST)"))?,
        };

        let path = run
            .path
            .or(run.url)
            .with_context(|| format!("run `{name}`: missing `path` (or `url`)"))?;

        let mut spec = RunSpec::new(name, method, path);
        spec.json_body = run.json_body;
        spec.query = run.query;
        if let Some(levels) = run.concurrency_levels {
            spec.concurrency_levels = levels;
        }
        if let Some(n) = run.requests_per_level {
            spec.requests_per_level = n;
        }
        if let Some(n) = run.warmup_requests {
            spec.warmup_requests = n;
        }
        runs.push(spec);
    }

    Ok(BenchConfig {
        base_url: doc.base_url,
        headers: doc.headers.into_iter().collect(),
        timeout: Duration::from_secs_f64(timeout_seconds),
        output_dir,
        runs,
    })
}

/// Render the fully resolved config back as YAML (`sweepr config`).
pub(crate) fn build_doc(cfg: &BenchConfig) -> SuiteYaml {
    SuiteYaml {
        base_url: cfg.base_url.clone(),
        headers: cfg.headers.iter().cloned().collect(),
        timeout_seconds: Some(cfg.timeout.as_secs_f64()),
        output_dir: Some(cfg.output_dir.clone()),
        runs: cfg
            .runs
            .iter()
            .map(|run| RunYaml {
                name: run.name.clone(),
                method: Some(run.method.to_string()),
                path: Some(run.path.clone()),
                url: None,
                json_body: run.json_body.clone(),
                query: run.query.clone(),
                concurrency_levels: Some(run.concurrency_levels.clone()),
                requests_per_level: Some(run.requests_per_level),
                warmup_requests: Some(run.warmup_requests),
            })
            .collect(),
    }
}
