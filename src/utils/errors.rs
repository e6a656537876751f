use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the ledger tool
#[derive(Error, Debug)]
pub enum LedgerToolError {
    #[error("more than one data source specified: {}", .0.join(", "))]
    ConfigAmbiguity(Vec<&'static str>),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{target}: {reason}")]
    Backend { target: String, reason: String },

    #[error("malformed range '{0}'")]
    MalformedRange(String),

    #[error("unknown ledger name '{0}'")]
    UnknownName(String),

    #[error("no ledgers matching condition between {begin} and {end}")]
    NoMatch { begin: u64, end: u64 },

    #[error("corrupt cache file {}: {reason}", path.display())]
    CacheCorruption { path: PathBuf, reason: String },

    #[error("invalid condition '{0}'")]
    Condition(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerToolError {
    pub fn backend(target: impl ToString, reason: impl ToString) -> Self {
        LedgerToolError::Backend {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Errors that only affect a single ledger; bulk flows log and skip them.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LedgerToolError::Backend { .. })
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, LedgerToolError>;
