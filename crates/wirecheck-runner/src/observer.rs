//! Run progress observers.

use crate::run::TestRun;
use async_trait::async_trait;
use wirecheck_types::{CaseInfo, RunId, TestResult};

/// Error surfaced by an observer. Logged by the runner, never fatal.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Side-effect sink notified once per completed case, in registration
/// order, from the runner's execution context.
///
/// On the final case of a run, `remaining` is 0.
#[async_trait]
pub trait RunObserver: Send + Sync {
    async fn progress(
        &self,
        run_id: &RunId,
        test_run: &TestRun,
        case: &CaseInfo,
        result: &TestResult,
        remaining: usize,
    ) -> Result<(), ObserverError>;
}
