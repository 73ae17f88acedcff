/// Result of a single timed request. Produced by the invoker, consumed by
/// exactly one level runner; never shared across levels.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub success: bool,
    /// HTTP status, or -1 when the request failed before a status existed
    /// (connect error, timeout, protocol error).
    pub status: i32,
    pub latency_ms: f64,
    pub resp_len: u64,
    pub error: Option<String>,
}

/// Aggregated statistics for one (run, concurrency) level.
///
/// `ok + errors == requests` always holds; latency fields are NaN iff the
/// level produced no outcomes.
#[derive(Debug, Clone)]
pub struct LevelSummary {
    pub run_label: String,
    pub concurrency: u32,
    pub requests: u64,
    pub ok: u64,
    pub errors: u64,
    pub elapsed_s: f64,
    pub throughput_rps: f64,
    pub latency_avg_ms: f64,
    pub latency_p50_ms: f64,
    pub latency_p95_ms: f64,
    pub latency_p99_ms: f64,
}
