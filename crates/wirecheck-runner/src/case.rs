//! Case execution seams.
//!
//! Concrete wire-protocol checks live outside this crate; the runner
//! only sees case metadata and an async execution entry point.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use wirecheck_types::{CaseInfo, CaseOutcome, TestSpec};

/// Error raised by the case collaborator.
///
/// An execution error is recorded as a failing result, never treated
/// as fatal by the runner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CaseError(pub String);

impl CaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Outcome of one case execution, before storage assigns identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseExecution {
    pub outcome: CaseOutcome,
    pub diagnostics: Value,
    pub duration_ms: Option<u64>,
}

/// One unit of test behavior, supplied by an external producer.
#[async_trait]
pub trait TestCase: Send + Sync {
    /// Static case metadata (name, description, expectation).
    fn info(&self) -> &CaseInfo;

    /// Execute the case against the target implementation.
    async fn execute(&self) -> Result<CaseExecution, CaseError>;
}

/// Derives the fixed, ordered case list for an imported spec.
pub trait CaseSource: Send + Sync {
    fn cases(&self, spec: &TestSpec) -> Result<Vec<Arc<dyn TestCase>>, CaseError>;
}
