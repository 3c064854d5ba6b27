use std::path::PathBuf;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Every variant is fatal for the chart being built.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("source file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("malformed record in {} at line {line}: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("run log {} contains no records", .path.display())]
    EmptyRunLog { path: PathBuf },
    #[error("schema mismatch in {}: expected {expected} columns, found {found}", .path.display())]
    SchemaMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("{source_id} has no `{column}` column")]
    MissingColumn { source_id: String, column: &'static str },
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("expected {expected} {what}, found {found}")]
    SeriesMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid tick range: {0}")]
    InvalidTicks(String),
    #[error("chart has no curves and no reference lines")]
    EmptyChart,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

impl Error {
    pub fn malformed(path: impl Into<PathBuf>, line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRecord { path: path.into(), line, reason: reason.into() }
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }
}
