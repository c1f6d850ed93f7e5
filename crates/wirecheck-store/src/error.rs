use thiserror::Error;
use wirecheck_types::{InvalidModeError, ResultId, RunId};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no active spec named {0:?}")]
    SpecNotFound(String),

    #[error("run {0} not found")]
    RunNotFound(RunId),

    #[error("result {0} not found")]
    ResultNotFound(ResultId),

    #[error("run {0} is closed")]
    RunClosed(RunId),

    #[error(transparent)]
    InvalidMode(#[from] InvalidModeError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("storage failure: {0}")]
    StorageFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::StorageFailure(Box::new(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::StorageFailure(Box::new(err))
    }
}
