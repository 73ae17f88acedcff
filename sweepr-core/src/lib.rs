mod config;
mod context;
mod error;
mod invoker;
mod level;
mod outcome;
mod run;
mod sink;
mod stats;
mod template;

pub use config::{BenchConfig, Method, RunSpec};
pub use context::{BenchContext, json_field_str, prepare_context};
pub use error::{Error, Result};
pub use invoker::invoke;
pub use level::{ShutdownFlag, run_level};
pub use outcome::{LevelSummary, RequestOutcome};
pub use run::{BenchReport, ProgressEvent, ProgressFn, run_benchmark};
pub use sink::{RAW_HEADER, SUMMARY_HEADER, RawRow, RawSink, SummaryWriter};
pub use stats::{percentile, summarize_level};
pub use template::resolve;

pub use sweepr_http::{HttpClient, HttpRequest, HttpResponse};
