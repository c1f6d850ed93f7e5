//! Report-layer error taxonomy.

use thiserror::Error;
use wirecheck_store::StoreError;

/// Errors produced while generating or registering report artifacts.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("report rendering failed: {0}")]
    Render(String),

    #[error("report i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
