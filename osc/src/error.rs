use std::fmt;

/// Semantic error kinds for the online schema-change engine.
///
/// Variants are grouped by how the Runner should react to them (abort
/// immediately, retry with backoff, or abandon the migration and leave the
/// source table untouched), not by call site.
#[derive(Debug, thiserror::Error)]
pub enum OscError {
    /// Invalid DSN, missing table, unsupported PK, table has FK/trigger,
    /// insufficient grants, wrong server version. Fatal at preflight.
    #[error("config error: {0}")]
    Config(String),

    /// A retryable SQL condition (lock wait timeout, deadlock, connection
    /// reset) whose retry budget has been exhausted.
    #[error("retry budget exhausted after {attempts} attempts: {source}")]
    RetryBudgetExhausted {
        attempts: u32,
        #[source]
        source: Box<OscError>,
    },

    /// A single retryable SQL condition. The caller is expected to retry
    /// with backoff; this variant should never escape the crate boundary.
    #[error("retryable error: {0}")]
    Retryable(String),

    /// A chunk execution emitted a warning indicating data loss or
    /// truncation. Never retried: the ALTER is unsafe for this data.
    #[error("unsafe warning migrating chunk: {0}")]
    DataSafety(String),

    /// Checksum mismatch between source and shadow after copy.
    #[error("checksum mismatch: {0}")]
    Consistency(String),

    /// An internal invariant was violated (e.g. a queued chunk has a nil
    /// bound where one is required). Indicates a bug in the core, not a
    /// data or environment problem.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The caller cancelled the run context. Partial state is recoverable
    /// via the checkpoint.
    #[error("cancelled")]
    Cancelled,

    /// The table has been fully read; no further chunks will be emitted.
    #[error("table is read")]
    TableIsRead,

    /// `open()` / `attach_chunker()` called more than once, or `next()`
    /// called before `open()`.
    #[error("chunker not open, call open() first")]
    ChunkerNotOpen,

    /// The cutover rename or a post-rename step failed; the caller must
    /// manually reconcile the source/shadow tables.
    #[error("cutover failed: {0}")]
    CutoverFailed(String),

    /// Passthrough for errors surfaced by the `Executor` / driver boundary.
    #[error("db error: {0}")]
    Db(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OscError {
    pub fn config<S: Into<String>>(s: S) -> Self {
        OscError::Config(s.into())
    }

    pub fn db<S: Into<String>>(s: S) -> Self {
        OscError::Db(s.into())
    }

    /// True for a single transient condition a caller should retry with
    /// backoff: an explicit `Retryable`, or a `Db` error whose underlying
    /// message matches the centralized MySQL retryable-error classification
    /// (lock wait timeout, deadlock, connection-reset families).
    pub fn is_retryable(&self) -> bool {
        match self {
            OscError::Retryable(_) => true,
            OscError::Db(msg) => crate::db::is_retryable_mysql_error(&SqlError::message(msg.clone())),
            _ => false,
        }
    }
}

/// A lightweight stand-in for the numbered wire error a real MySQL driver
/// would report. The `Executor` trait boundary converts driver-specific
/// errors into these before they cross into `osc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlError {
    pub code: Option<u16>,
    pub message: String,
}

impl SqlError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        SqlError { code: Some(code), message: message.into() }
    }

    pub fn message(message: impl Into<String>) -> Self {
        SqlError { code: None, message: message.into() }
    }
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "Error {code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<SqlError> for OscError {
    fn from(e: SqlError) -> Self {
        OscError::Db(e.to_string())
    }
}

pub type OscResult<T> = Result<T, OscError>;
