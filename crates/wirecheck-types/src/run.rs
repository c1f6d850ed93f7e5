//! Testsuite runs: modes, lifecycle, and listing summaries.

use crate::ids::RunId;
use crate::spec::TestSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of supported testsuite modes.
///
/// Extending this set is a contract change, not a runtime option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunMode {
    /// Fuzz a WAMP client implementation.
    #[serde(rename = "fuzzingwampclient")]
    FuzzingWampClient,
    /// Fuzz a WebSocket client implementation.
    #[serde(rename = "fuzzingclient")]
    FuzzingClient,
}

impl RunMode {
    /// Every recognized mode, in declaration order.
    pub const ALL: [RunMode; 2] = [RunMode::FuzzingWampClient, RunMode::FuzzingClient];

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::FuzzingWampClient => "fuzzingwampclient",
            RunMode::FuzzingClient => "fuzzingclient",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized mode strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid run mode: {0:?}")]
pub struct InvalidModeError(pub String);

impl FromStr for RunMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fuzzingwampclient" => Ok(RunMode::FuzzingWampClient),
            "fuzzingclient" => Ok(RunMode::FuzzingClient),
            other => Err(InvalidModeError(other.to_string())),
        }
    }
}

/// Lifecycle status of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Open,
    Closed,
}

/// One persisted testsuite run.
///
/// The spec content is bound by value at creation time; later updates
/// to the named spec never affect an existing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub mode: RunMode,
    pub spec_name: String,
    pub spec: TestSpec,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    /// Whether the run has been closed against further mutation.
    pub fn is_closed(&self) -> bool {
        self.status == RunStatus::Closed
    }
}

/// Listing projection for recent-run queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: RunId,
    pub mode: RunMode,
    pub spec_name: String,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub result_count: usize,
}
