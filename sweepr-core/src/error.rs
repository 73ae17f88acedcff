pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("`base_url` must be a non-empty http(s) address")]
    InvalidBaseUrl,

    #[error("`runs` must be a non-empty list")]
    NoRuns,

    #[error("run name must be non-empty")]
    EmptyRunName,

    #[error("duplicate run name: `{0}`")]
    DuplicateRunName(String),

    #[error("run `{0}`: `concurrency_levels` entries must be positive integers")]
    InvalidConcurrencyLevel(String),

    #[error("run `{0}`: `concurrency_levels` must be non-empty")]
    NoConcurrencyLevels(String),

    #[error("`timeout_seconds` must be a positive number")]
    InvalidTimeout,

    #[error("invalid output dir `{path}`: {source}")]
    OutputDir {
        path: String,
        source: std::io::Error,
    },
}
