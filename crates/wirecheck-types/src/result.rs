//! Test results and case outcomes.

use crate::ids::{ResultId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verdict for one executed case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Observed behavior matched the expectation.
    Passed,
    /// Accepted, but only under a non-strict reading of the protocol.
    NonStrict,
    /// Observed behavior violated the expectation.
    Failed,
    /// The target does not implement the tested behavior.
    Unimplemented,
    /// No pass/fail judgement; recorded for the report only.
    Informational,
}

impl CaseOutcome {
    /// Whether this outcome counts as a failure for run summaries.
    pub fn is_failure(&self) -> bool {
        matches!(self, CaseOutcome::Failed)
    }
}

/// Payload for appending a result to a run.
///
/// The ID and creation timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTestResult {
    pub case_name: String,
    pub outcome: CaseOutcome,
    pub expectation: String,
    #[serde(default)]
    pub diagnostics: Value,
    pub duration_ms: Option<u64>,
}

/// One persisted test result.
///
/// Results are append-only: after creation nothing in this record is
/// mutated; only report-file provenance may be attached alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: ResultId,
    pub run_id: RunId,
    pub case_name: String,
    pub outcome: CaseOutcome,
    pub expectation: String,
    pub diagnostics: Value,
    pub duration_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}
