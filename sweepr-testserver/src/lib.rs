//! In-process stub of the ML challenge platform the benchmark drives:
//! thin call-and-store handlers, just enough shape for the bootstrap
//! sequence and the measured runs to exercise end to end.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

pub const PATH_REGISTER: &str = "/register";
pub const PATH_LOGIN: &str = "/login";
pub const PATH_CHALLENGES: &str = "/challenges";
pub const PATH_SUBMIT: &str = "/submit";
pub const PATH_EVALUATE: &str = "/evaluate";
pub const PATH_LEADERBOARD: &str = "/leaderboard";
pub const PATH_DELAY: &str = "/delay";

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
    submissions_total: Arc<AtomicU64>,
    challenge_seq: Arc<AtomicU64>,
}

impl TestServerStats {
    fn inc_requests_total(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_submissions_total(&self) {
        self.submissions_total.fetch_add(1, Ordering::Relaxed);
    }

    fn next_challenge_id(&self) -> u64 {
        self.challenge_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn submissions_total(&self) -> u64 {
        self.submissions_total.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CredentialsRequest {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Default, Deserialize)]
struct CreateChallengeRequest {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    challenge_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct EvaluateRequest {
    #[serde(default)]
    submission_id: String,
}

async fn handle_register(
    State(stats): State<TestServerStats>,
    Json(req): Json<CredentialsRequest>,
) -> Json<Value> {
    stats.inc_requests_total();
    Json(json!({"status": "ok", "user": {"username": req.username}}))
}

async fn handle_login(
    State(stats): State<TestServerStats>,
    Json(req): Json<CredentialsRequest>,
) -> Json<Value> {
    stats.inc_requests_total();
    let token = format!("tok_{}_{}", req.username, uuid::Uuid::new_v4().simple());
    Json(json!({"token": token}))
}

async fn handle_create_challenge(
    State(stats): State<TestServerStats>,
    Json(req): Json<CreateChallengeRequest>,
) -> Json<Value> {
    stats.inc_requests_total();
    let id = format!("ch_{}", stats.next_challenge_id());
    Json(json!({"challenge": {"id": id, "title": req.title}}))
}

async fn handle_submit(
    State(stats): State<TestServerStats>,
    Json(req): Json<SubmitRequest>,
) -> Json<Value> {
    stats.inc_requests_total();
    stats.inc_submissions_total();
    let id = format!("sub_{}", uuid::Uuid::new_v4().simple());
    Json(json!({"submission": {"id": id, "challenge_id": req.challenge_id, "status": "queued"}}))
}

async fn handle_evaluate(
    State(stats): State<TestServerStats>,
    Json(req): Json<EvaluateRequest>,
) -> Json<Value> {
    stats.inc_requests_total();
    Json(json!({"result": {"submission_id": req.submission_id, "score": 0.5}}))
}

async fn handle_leaderboard(
    State(stats): State<TestServerStats>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    stats.inc_requests_total();
    let challenge_id = query
        .get("challenge_id")
        .cloned()
        .unwrap_or_else(|| "default".to_string());
    Json(json!({
        "challenge_id": challenge_id,
        "leaderboard": [
            {"rank": 1, "user": "alice", "score": 0.9},
            {"rank": 2, "user": "bob", "score": 0.7},
        ]
    }))
}

/// Responds 200 "ok" after `ms` milliseconds (query parameter, default 10).
/// Gives concurrency tests a target with a known fixed service time.
async fn handle_delay(
    State(stats): State<TestServerStats>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    stats.inc_requests_total();
    let ms = query
        .get("ms")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10);
    sleep(Duration::from_millis(ms)).await;
    (StatusCode::OK, "ok")
}

pub fn router(stats: TestServerStats) -> Router {
    Router::new()
        .route(PATH_REGISTER, post(handle_register))
        .route(PATH_LOGIN, post(handle_login))
        .route(PATH_CHALLENGES, post(handle_create_challenge))
        .route(PATH_SUBMIT, post(handle_submit))
        .route(PATH_EVALUATE, post(handle_evaluate))
        .route(PATH_LEADERBOARD, get(handle_leaderboard))
        .route(PATH_DELAY, get(handle_delay).post(handle_delay))
        .with_state(stats)
}

pub struct TestServer {
    addr: SocketAddr,
    base_url: String,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(stats.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        let base_url = format!("http://{addr}");

        Ok(Self {
            addr,
            base_url,
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
