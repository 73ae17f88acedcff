use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// HTTP method of a benchmark run (the string form used by config files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum Method {
    #[strum(serialize = "GET")]
    Get,

    #[default]
    #[strum(serialize = "POST")]
    Post,
}

impl Method {
    #[must_use]
    pub fn as_http(self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
        }
    }
}

/// One named benchmark target: an endpoint plus templates, swept across a
/// list of concurrency levels.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub json_body: Option<serde_json::Value>,
    pub query: Option<serde_json::Value>,
    pub concurrency_levels: Vec<u32>,
    pub requests_per_level: u32,
    pub warmup_requests: u32,
}

impl RunSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            json_body: None,
            query: None,
            concurrency_levels: default_concurrency_levels(),
            requests_per_level: default_requests_per_level(),
            warmup_requests: 0,
        }
    }
}

#[must_use]
pub(crate) fn default_concurrency_levels() -> Vec<u32> {
    vec![1, 2, 4, 8]
}

#[must_use]
pub(crate) fn default_requests_per_level() -> u32 {
    100
}

/// Fully resolved benchmark configuration. Read once at startup, immutable
/// for the rest of the invocation.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub runs: Vec<RunSpec>,
}

impl BenchConfig {
    /// Semantic validation, fatal before any measurement begins.
    pub fn validate(&self) -> Result<()> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty()
            || !(trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        {
            return Err(Error::InvalidBaseUrl);
        }

        if self.timeout <= Duration::ZERO {
            return Err(Error::InvalidTimeout);
        }

        if self.runs.is_empty() {
            return Err(Error::NoRuns);
        }

        let mut seen = std::collections::BTreeSet::new();
        for run in &self.runs {
            if run.name.trim().is_empty() {
                return Err(Error::EmptyRunName);
            }
            if !seen.insert(run.name.as_str()) {
                return Err(Error::DuplicateRunName(run.name.clone()));
            }
            if run.concurrency_levels.is_empty() {
                return Err(Error::NoConcurrencyLevels(run.name.clone()));
            }
            if run.concurrency_levels.iter().any(|&c| c == 0) {
                return Err(Error::InvalidConcurrencyLevel(run.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn config_with_runs(runs: Vec<RunSpec>) -> BenchConfig {
        BenchConfig {
            base_url: "http://127.0.0.1:8080".to_string(),
            headers: Vec::new(),
            timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("./bench_runs"),
            runs,
        }
    }

    #[test]
    fn method_parses_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert!("PATCH".parse::<Method>().is_err());
    }

    #[test]
    fn validate_accepts_minimal_config() {
        let cfg = config_with_runs(vec![RunSpec::new("submit", Method::Post, "/submit")]);
        cfg.validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut cfg = config_with_runs(vec![RunSpec::new("a", Method::Post, "/a")]);
        cfg.base_url = "ftp://example.com".to_string();
        assert!(matches!(cfg.validate(), Err(Error::InvalidBaseUrl)));

        cfg.base_url = String::new();
        assert!(matches!(cfg.validate(), Err(Error::InvalidBaseUrl)));
    }

    #[test]
    fn validate_rejects_duplicate_and_empty_run_names() {
        let cfg = config_with_runs(vec![
            RunSpec::new("a", Method::Post, "/a"),
            RunSpec::new("a", Method::Get, "/b"),
        ]);
        assert!(matches!(cfg.validate(), Err(Error::DuplicateRunName(_))));

        let cfg = config_with_runs(vec![RunSpec::new("  ", Method::Post, "/a")]);
        assert!(matches!(cfg.validate(), Err(Error::EmptyRunName)));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut run = RunSpec::new("a", Method::Post, "/a");
        run.concurrency_levels = vec![1, 0, 4];
        let cfg = config_with_runs(vec![run]);
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidConcurrencyLevel(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_runs() {
        let cfg = config_with_runs(Vec::new());
        assert!(matches!(cfg.validate(), Err(Error::NoRuns)));
    }
}
