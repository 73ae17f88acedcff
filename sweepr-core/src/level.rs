use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::{Semaphore, mpsc};

use sweepr_http::{HttpClient, HttpRequest};

use crate::error::Result;
use crate::invoker::invoke;
use crate::outcome::LevelSummary;
use crate::sink::RawRow;
use crate::stats::summarize_level;

/// Cooperative stop signal shared by every request task of an invocation.
///
/// Once triggered, tasks that have not dispatched yet finish without issuing
/// their request; in-flight requests run to completion so already-acquired
/// measurements stay valid.
#[derive(Debug, Default)]
pub struct ShutdownFlag {
    triggered: AtomicBool,
}

impl ShutdownFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}

/// Run one (run, concurrency) level: N logical requests with at most C in
/// flight, bounded by a counting admission gate.
///
/// All N task units are spawned up front; the semaphore — not a work queue —
/// is what limits live concurrency, so a freed slot is reacquired immediately
/// and throughput emerges from the target's actual service latency. Each
/// completed request streams its raw row through `raw` while the gate unit is
/// still held, then releases. The level's statistics cover its own wall-clock
/// window, first dispatch to last completion, and are only computed once
/// every unit has finished.
pub async fn run_level(
    client: &Arc<HttpClient>,
    request: &HttpRequest,
    concurrency: u32,
    total_requests: u32,
    run_label: &str,
    raw: mpsc::Sender<RawRow>,
    shutdown: &Arc<ShutdownFlag>,
) -> Result<LevelSummary> {
    let gate = Arc::new(Semaphore::new(concurrency as usize));
    let label: Arc<str> = Arc::from(run_label);
    let started = Instant::now();

    let mut handles = Vec::with_capacity(total_requests as usize);
    for _ in 0..total_requests {
        let gate = gate.clone();
        let client = client.clone();
        let request = request.clone();
        let raw = raw.clone();
        let label = label.clone();
        let shutdown = shutdown.clone();

        handles.push(tokio::spawn(async move {
            let _permit = match gate.acquire_owned().await {
                Ok(permit) => permit,
                // The gate is never closed; treat it like a shutdown anyway.
                Err(_) => return None,
            };

            if shutdown.is_triggered() {
                return None;
            }

            let outcome = invoke(&client, request).await;

            // Row loss is tolerable if the sink is gone; a torn row is not,
            // which is the single writer's job on the other end.
            let _ = raw
                .send(RawRow {
                    run_label: label,
                    concurrency,
                    req_id: uuid::Uuid::new_v4().to_string(),
                    ok: outcome.success,
                    status: outcome.status,
                    latency_ms: outcome.latency_ms,
                    resp_len: outcome.resp_len,
                })
                .await;

            Some(outcome)
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Some(outcome) = handle.await? {
            outcomes.push(outcome);
        }
    }

    let elapsed_s = started.elapsed().as_secs_f64();
    Ok(summarize_level(run_label, concurrency, &outcomes, elapsed_s))
}
