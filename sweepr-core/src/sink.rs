use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::outcome::LevelSummary;

pub const RAW_HEADER: [&str; 7] = [
    "run_label",
    "concurrency",
    "req_id",
    "ok",
    "status",
    "latency_ms",
    "resp_len",
];

pub const SUMMARY_HEADER: [&str; 11] = [
    "run_label",
    "concurrency",
    "requests",
    "ok",
    "errors",
    "elapsed_s",
    "throughput_rps",
    "latency_avg_ms",
    "latency_p50_ms",
    "latency_p95_ms",
    "latency_p99_ms",
];

/// One raw record, sent from a request task to the sink's writer.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub run_label: Arc<str>,
    pub concurrency: u32,
    pub req_id: String,
    pub ok: bool,
    pub status: i32,
    pub latency_ms: f64,
    pub resp_len: u64,
}

/// Streaming raw-record store for one run.
///
/// Many request tasks feed a bounded channel; a single writer task appends
/// and flushes one CSV row per completed request. The bounded channel keeps
/// memory proportional to in-flight concurrency, and the single writer is
/// what guarantees rows are never interleaved. The file is truncated at open:
/// one invocation, one file.
pub struct RawSink {
    tx: mpsc::Sender<RawRow>,
    task: JoinHandle<Result<()>>,
}

impl RawSink {
    pub fn create(path: &Path, capacity: usize) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(RAW_HEADER)?;
        writer.flush()?;

        let (tx, mut rx) = mpsc::channel::<RawRow>(capacity.max(1));
        let task = tokio::spawn(async move {
            while let Some(row) = rx.recv().await {
                writer.write_record(&[
                    row.run_label.as_ref().to_string(),
                    row.concurrency.to_string(),
                    row.req_id,
                    u8::from(row.ok).to_string(),
                    row.status.to_string(),
                    format!("{:.3}", row.latency_ms),
                    row.resp_len.to_string(),
                ])?;
                // Flush per row so an interrupted level leaves valid,
                // if incomplete, raw data on disk.
                writer.flush()?;
            }
            writer.flush()?;
            Ok(())
        });

        Ok(Self { tx, task })
    }

    #[must_use]
    pub fn sender(&self) -> mpsc::Sender<RawRow> {
        self.tx.clone()
    }

    /// Close the channel and wait for the writer to drain.
    pub async fn finish(self) -> Result<()> {
        drop(self.tx);
        self.task.await?
    }
}

/// Per-level summary store (also used for the cross-run combined file).
pub struct SummaryWriter {
    writer: csv::Writer<File>,
}

impl SummaryWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(SUMMARY_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, s: &LevelSummary) -> Result<()> {
        self.writer.write_record(&[
            s.run_label.clone(),
            s.concurrency.to_string(),
            s.requests.to_string(),
            s.ok.to_string(),
            s.errors.to_string(),
            s.elapsed_s.to_string(),
            s.throughput_rps.to_string(),
            s.latency_avg_ms.to_string(),
            s.latency_p50_ms.to_string(),
            s.latency_p95_ms.to_string(),
            s.latency_p99_ms.to_string(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}
