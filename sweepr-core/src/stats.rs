use crate::outcome::{LevelSummary, RequestOutcome};

/// Percentile by linear interpolation on the sorted sample.
///
/// `k = (n-1) * p/100`; the value is interpolated between the floor and
/// ceiling ranks, so the result is a continuous function of the sample and
/// `percentile(s, 0) == min`, `percentile(s, 100) == max`. Returns NaN for an
/// empty sample.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let k = (sorted.len() - 1) as f64 * (p / 100.0);
    let f = k.floor() as usize;
    let c = (f + 1).min(sorted.len() - 1);
    if f == c {
        return sorted[f];
    }

    sorted[f] + (sorted[c] - sorted[f]) * (k - f as f64)
}

/// Fold a level's outcomes into its summary row.
///
/// Throughput counts successful requests over the level's own wall-clock
/// window (0 when the window is degenerate); latency aggregates are NaN for
/// an empty level rather than a division error.
#[must_use]
pub fn summarize_level(
    run_label: &str,
    concurrency: u32,
    outcomes: &[RequestOutcome],
    elapsed_s: f64,
) -> LevelSummary {
    let requests = outcomes.len() as u64;
    let ok = outcomes.iter().filter(|o| o.success).count() as u64;
    let errors = requests - ok;

    let mut latencies: Vec<f64> = outcomes.iter().map(|o| o.latency_ms).collect();
    latencies.sort_by(f64::total_cmp);

    let latency_avg_ms = if latencies.is_empty() {
        f64::NAN
    } else {
        latencies.iter().sum::<f64>() / latencies.len() as f64
    };

    let throughput_rps = if elapsed_s > 0.0 {
        ok as f64 / elapsed_s
    } else {
        0.0
    };

    LevelSummary {
        run_label: run_label.to_string(),
        concurrency,
        requests,
        ok,
        errors,
        elapsed_s,
        throughput_rps,
        latency_avg_ms,
        latency_p50_ms: percentile(&latencies, 50.0),
        latency_p95_ms: percentile(&latencies, 95.0),
        latency_p99_ms: percentile(&latencies, 99.0),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn outcome(success: bool, latency_ms: f64) -> RequestOutcome {
        RequestOutcome {
            success,
            status: if success { 200 } else { -1 },
            latency_ms,
            resp_len: 2,
            error: None,
        }
    }

    #[test]
    fn percentile_empty_sample_is_nan() {
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn percentile_bounds_are_min_and_max() {
        let sorted = [1.0, 3.0, 7.0, 20.0, 100.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 100.0);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        // n=4: k = 3 * 0.5 = 1.5 => halfway between ranks 1 and 2.
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 50.0), 25.0);
        // k = 3 * 0.95 = 2.85 => 30 + 0.85 * 10.
        assert!((percentile(&sorted, 95.0) - 38.5).abs() < 1e-9);
    }

    #[test]
    fn percentile_single_value() {
        assert_eq!(percentile(&[42.0], 50.0), 42.0);
        assert_eq!(percentile(&[42.0], 99.0), 42.0);
    }

    #[test]
    fn summary_counts_balance() {
        let outcomes = vec![
            outcome(true, 5.0),
            outcome(false, 9.0),
            outcome(true, 7.0),
        ];
        let s = summarize_level("run", 2, &outcomes, 0.5);

        assert_eq!(s.requests, 3);
        assert_eq!(s.ok, 2);
        assert_eq!(s.errors, 1);
        assert_eq!(s.ok + s.errors, s.requests);
        assert!((s.throughput_rps - 4.0).abs() < 1e-9);
        assert!((s.latency_avg_ms - 7.0).abs() < 1e-9);
        assert!(s.throughput_rps >= 0.0);
    }

    #[test]
    fn summary_of_empty_level_has_nan_latency_and_zero_counts() {
        let s = summarize_level("run", 4, &[], 0.001);

        assert_eq!(s.requests, 0);
        assert_eq!(s.ok, 0);
        assert_eq!(s.errors, 0);
        assert_eq!(s.throughput_rps, 0.0);
        assert!(s.latency_avg_ms.is_nan());
        assert!(s.latency_p50_ms.is_nan());
        assert!(s.latency_p95_ms.is_nan());
        assert!(s.latency_p99_ms.is_nan());
    }

    #[test]
    fn summary_degenerate_elapsed_yields_zero_throughput() {
        let s = summarize_level("run", 1, &[outcome(true, 1.0)], 0.0);
        assert_eq!(s.throughput_rps, 0.0);
    }

    #[test]
    fn summary_is_order_insensitive() {
        let a = vec![outcome(true, 3.0), outcome(true, 1.0), outcome(true, 2.0)];
        let b = vec![outcome(true, 1.0), outcome(true, 2.0), outcome(true, 3.0)];

        let sa = summarize_level("run", 1, &a, 1.0);
        let sb = summarize_level("run", 1, &b, 1.0);

        assert_eq!(sa.latency_p50_ms, sb.latency_p50_ms);
        assert_eq!(sa.latency_p95_ms, sb.latency_p95_ms);
        assert_eq!(sa.latency_p99_ms, sb.latency_p99_ms);
    }
}
