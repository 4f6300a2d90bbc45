use std::path::PathBuf;
use thiserror::Error;
use trix_core::StoreError;

/// Failure recorded by a worker for a single task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("worker panicked: {0}")]
    Panicked(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("task outcome lost")]
    Lost,
}

impl From<StoreError> for TaskError {
    fn from(e: StoreError) -> Self {
        TaskError::Failed(e.to_string())
    }
}

/// Errors handed to callers.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to open {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },

    #[error("search failed: {0}")]
    Search(String),

    #[error("document is not open yet")]
    NotReady,

    #[error("worker pool: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
