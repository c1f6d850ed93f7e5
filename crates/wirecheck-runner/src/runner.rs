//! Drives a test run to completion.

use crate::case::{CaseError, CaseSource};
use crate::observer::RunObserver;
use crate::run::TestRun;
use std::sync::Arc;
use thiserror::Error;
use wirecheck_store::{ResultStore, StoreError};
use wirecheck_types::{CaseOutcome, NewTestResult, RunId, RunMode, TestSpec};

/// Runner-layer errors.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("case source failed: {0}")]
    Cases(#[from] CaseError),
}

/// Summary of one completed `run` invocation.
///
/// `executed < total` marks a partial run: the store failed mid-loop
/// and the run was closed early. Partial runs are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: RunId,
    pub total: usize,
    pub executed: usize,
    pub failed: usize,
}

/// Orchestrates spec import, case execution, result persistence, and
/// run closure against a shared [`ResultStore`].
pub struct TestRunner {
    store: Arc<dyn ResultStore>,
    cases: Arc<dyn CaseSource>,
}

impl TestRunner {
    pub fn new(store: Arc<dyn ResultStore>, cases: Arc<dyn CaseSource>) -> Self {
        Self { store, cases }
    }

    /// Import `spec`, open a run in `mode`, execute every case, and
    /// close the run.
    ///
    /// A failing case execution becomes a persisted failing result and
    /// the loop continues. Observer errors are logged and never abort
    /// the run. Only a [`StoreError`] is fatal; even then the run is
    /// closed best-effort before the error propagates, so no run is
    /// left open past the end of this call.
    pub async fn run(
        &self,
        mode: RunMode,
        spec: &TestSpec,
        observers: &[Arc<dyn RunObserver>],
    ) -> Result<RunReport, RunnerError> {
        let (op, spec_id) = self.store.import_spec(spec).await?;
        tracing::debug!(spec = %spec.name(), spec_id = %spec_id, op = ?op, "resolved spec");

        let case_list = self.cases.cases(spec)?;
        let run_id = self.store.new_run(mode, spec).await?;
        let mut test_run = TestRun::new(case_list);
        let total = test_run.len();
        tracing::info!(run_id = %run_id, mode = %mode, cases = total, "starting test run");

        let mut executed = 0usize;
        let mut failed = 0usize;
        let mut fatal: Option<StoreError> = None;

        while let Some(case) = test_run.next() {
            let info = case.info().clone();
            let new_result = match case.execute().await {
                Ok(execution) => {
                    if execution.outcome.is_failure() {
                        failed += 1;
                    }
                    NewTestResult {
                        case_name: info.name.clone(),
                        outcome: execution.outcome,
                        expectation: info.expectation.clone(),
                        diagnostics: execution.diagnostics,
                        duration_ms: execution.duration_ms,
                    }
                }
                Err(err) => {
                    // A failing execution is a recorded outcome, not a
                    // fatal error.
                    failed += 1;
                    tracing::warn!(run_id = %run_id, case = %info.name, error = %err, "case execution failed");
                    NewTestResult {
                        case_name: info.name.clone(),
                        outcome: CaseOutcome::Failed,
                        expectation: info.expectation.clone(),
                        diagnostics: serde_json::json!({ "error": err.to_string() }),
                        duration_ms: None,
                    }
                }
            };

            let result = match self.store.save_result(&run_id, new_result).await {
                Ok(result_id) => match self.store.get_result(&result_id).await {
                    Ok(result) => result,
                    Err(err) => {
                        fatal = Some(err);
                        break;
                    }
                },
                Err(err) => {
                    fatal = Some(err);
                    break;
                }
            };
            executed += 1;

            let remaining = test_run.remaining();
            for observer in observers {
                if let Err(err) = observer
                    .progress(&run_id, &test_run, &info, &result, remaining)
                    .await
                {
                    tracing::warn!(run_id = %run_id, case = %info.name, error = %err, "observer failed");
                }
            }
        }

        // The run is never left open, even after a storage failure.
        if let Err(err) = self.store.close_run(&run_id).await {
            if fatal.is_none() {
                fatal = Some(err);
            } else {
                tracing::error!(run_id = %run_id, error = %err, "failed to close run after storage failure");
            }
        }

        if let Some(err) = fatal {
            tracing::error!(run_id = %run_id, error = %err, "test run aborted by storage failure");
            return Err(err.into());
        }

        tracing::info!(run_id = %run_id, executed, failed, "test run complete");
        Ok(RunReport {
            run_id,
            total,
            executed,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CaseExecution, TestCase};
    use crate::observer::ObserverError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use wirecheck_store::MemoryStore;
    use wirecheck_types::{CaseInfo, ResultId, TestResult};

    struct ScriptedCase {
        info: CaseInfo,
        script: Result<CaseExecution, CaseError>,
    }

    #[async_trait]
    impl TestCase for ScriptedCase {
        fn info(&self) -> &CaseInfo {
            &self.info
        }

        async fn execute(&self) -> Result<CaseExecution, CaseError> {
            self.script.clone()
        }
    }

    struct FixedCases(Vec<(String, Result<CaseExecution, CaseError>)>);

    impl CaseSource for FixedCases {
        fn cases(&self, _spec: &TestSpec) -> Result<Vec<Arc<dyn TestCase>>, CaseError> {
            Ok(self
                .0
                .iter()
                .map(|(name, script)| {
                    Arc::new(ScriptedCase {
                        info: CaseInfo::new(name.clone(), "scripted", "pass"),
                        script: script.clone(),
                    }) as Arc<dyn TestCase>
                })
                .collect())
        }
    }

    fn passing(names: &[&str]) -> Arc<FixedCases> {
        Arc::new(FixedCases(
            names
                .iter()
                .map(|n| {
                    (
                        n.to_string(),
                        Ok(CaseExecution {
                            outcome: CaseOutcome::Passed,
                            diagnostics: json!({}),
                            duration_ms: Some(1),
                        }),
                    )
                })
                .collect(),
        ))
    }

    #[derive(Default)]
    struct RecordingObserver {
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl RunObserver for RecordingObserver {
        async fn progress(
            &self,
            _run_id: &RunId,
            _test_run: &TestRun,
            case: &CaseInfo,
            _result: &TestResult,
            remaining: usize,
        ) -> Result<(), ObserverError> {
            self.seen
                .lock()
                .unwrap()
                .push((case.name.clone(), remaining));
            Ok(())
        }
    }

    struct FailingObserver;

    #[async_trait]
    impl RunObserver for FailingObserver {
        async fn progress(
            &self,
            _run_id: &RunId,
            _test_run: &TestRun,
            _case: &CaseInfo,
            _result: &TestResult,
            _remaining: usize,
        ) -> Result<(), ObserverError> {
            Err("observer exploded".into())
        }
    }

    fn basic_spec() -> TestSpec {
        TestSpec::new(json!({"name": "basic", "cases": ["C1", "C2", "C3"]})).unwrap()
    }

    #[tokio::test]
    async fn test_run_executes_all_cases_and_closes() {
        let store = Arc::new(MemoryStore::new());
        let runner = TestRunner::new(store.clone(), passing(&["C1", "C2"]));

        let report = runner
            .run(RunMode::FuzzingClient, &basic_spec(), &[])
            .await
            .unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.executed, 2);
        assert_eq!(report.failed, 0);

        let run = store.get_run(&report.run_id).await.unwrap();
        assert!(run.is_closed());

        let results = store.get_results(&report.run_id).await.unwrap();
        let names: Vec<_> = results.iter().map(|r| r.case_name.as_str()).collect();
        assert_eq!(names, ["C1", "C2"]);
    }

    #[tokio::test]
    async fn test_observer_fanout_and_remaining_countdown() {
        let store = Arc::new(MemoryStore::new());
        let runner = TestRunner::new(store, passing(&["C1", "C2", "C3"]));

        let first = Arc::new(RecordingObserver::default());
        let second = Arc::new(RecordingObserver::default());
        let observers: Vec<Arc<dyn RunObserver>> = vec![first.clone(), second.clone()];

        runner
            .run(RunMode::FuzzingClient, &basic_spec(), &observers)
            .await
            .unwrap();

        let expected = vec![
            ("C1".to_string(), 2),
            ("C2".to_string(), 1),
            ("C3".to_string(), 0),
        ];
        assert_eq!(*first.seen.lock().unwrap(), expected);
        assert_eq!(*second.seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_case_error_is_recorded_not_fatal() {
        let store = Arc::new(MemoryStore::new());
        let cases = Arc::new(FixedCases(vec![
            (
                "C1".to_string(),
                Err(CaseError::new("peer reset the connection")),
            ),
            (
                "C2".to_string(),
                Ok(CaseExecution {
                    outcome: CaseOutcome::Passed,
                    diagnostics: json!({}),
                    duration_ms: None,
                }),
            ),
        ]));
        let runner = TestRunner::new(store.clone(), cases);

        let report = runner
            .run(RunMode::FuzzingClient, &basic_spec(), &[])
            .await
            .unwrap();
        assert_eq!(report.executed, 2);
        assert_eq!(report.failed, 1);

        let results = store.get_results(&report.run_id).await.unwrap();
        assert_eq!(results[0].outcome, CaseOutcome::Failed);
        assert_eq!(
            results[0].diagnostics,
            json!({ "error": "peer reset the connection" })
        );
        assert_eq!(results[1].outcome, CaseOutcome::Passed);
    }

    #[tokio::test]
    async fn test_observer_failure_does_not_abort_run() {
        let store = Arc::new(MemoryStore::new());
        let runner = TestRunner::new(store.clone(), passing(&["C1", "C2"]));

        let recording = Arc::new(RecordingObserver::default());
        let observers: Vec<Arc<dyn RunObserver>> =
            vec![Arc::new(FailingObserver), recording.clone()];

        let report = runner
            .run(RunMode::FuzzingClient, &basic_spec(), &observers)
            .await
            .unwrap();
        assert_eq!(report.executed, 2);

        // The observer after the failing one still saw every case.
        assert_eq!(recording.seen.lock().unwrap().len(), 2);

        let results = store.get_results(&report.run_id).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    /// Delegates to a [`MemoryStore`] but fails every `save_result`
    /// after the first, simulating a backend outage mid-run.
    struct FlakyStore {
        inner: MemoryStore,
        saves_left: Mutex<usize>,
    }

    #[async_trait]
    impl ResultStore for FlakyStore {
        async fn import_spec(
            &self,
            spec: &TestSpec,
        ) -> Result<(Option<wirecheck_store::ImportOp>, wirecheck_types::SpecId), StoreError>
        {
            self.inner.import_spec(spec).await
        }

        async fn get_spec_by_name(&self, name: &str) -> Result<TestSpec, StoreError> {
            self.inner.get_spec_by_name(name).await
        }

        async fn new_run(&self, mode: RunMode, spec: &TestSpec) -> Result<RunId, StoreError> {
            self.inner.new_run(mode, spec).await
        }

        async fn get_run(
            &self,
            run_id: &RunId,
        ) -> Result<wirecheck_types::RunRecord, StoreError> {
            self.inner.get_run(run_id).await
        }

        async fn save_result(
            &self,
            run_id: &RunId,
            result: NewTestResult,
        ) -> Result<ResultId, StoreError> {
            {
                let mut left = self.saves_left.lock().unwrap();
                if *left == 0 {
                    return Err(StoreError::StorageFailure("disk full".into()));
                }
                *left -= 1;
            }
            self.inner.save_result(run_id, result).await
        }

        async fn close_run(&self, run_id: &RunId) -> Result<(), StoreError> {
            self.inner.close_run(run_id).await
        }

        async fn get_test_runs(
            &self,
            limit: i64,
        ) -> Result<Vec<wirecheck_types::RunSummary>, StoreError> {
            self.inner.get_test_runs(limit).await
        }

        async fn get_result(&self, result_id: &ResultId) -> Result<TestResult, StoreError> {
            self.inner.get_result(result_id).await
        }

        async fn get_results(&self, run_id: &RunId) -> Result<Vec<TestResult>, StoreError> {
            self.inner.get_results(run_id).await
        }

        async fn register_result_file(
            &self,
            result_id: &ResultId,
            kind: wirecheck_types::ReportKind,
            sha1: &str,
            path: &std::path::Path,
        ) -> Result<(), StoreError> {
            self.inner.register_result_file(result_id, kind, sha1, path).await
        }

        async fn register_run_file(
            &self,
            run_id: &RunId,
            kind: wirecheck_types::ReportKind,
            sha1: &str,
            path: &std::path::Path,
        ) -> Result<(), StoreError> {
            self.inner.register_run_file(run_id, kind, sha1, path).await
        }
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_but_still_closes_run() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            saves_left: Mutex::new(1),
        });
        let runner = TestRunner::new(store.clone(), passing(&["C1", "C2", "C3"]));

        let err = runner
            .run(RunMode::FuzzingClient, &basic_spec(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Store(StoreError::StorageFailure(_))));

        // The partial run was closed best-effort and kept its one result.
        let runs = store.inner.get_test_runs(1).await.unwrap();
        assert_eq!(runs.len(), 1);
        let summary = &runs[0];
        assert_eq!(summary.result_count, 1);

        let run = store.inner.get_run(&summary.id).await.unwrap();
        assert!(run.is_closed());
    }

    #[tokio::test]
    async fn test_run_imports_spec_before_executing() {
        let store = Arc::new(MemoryStore::new());
        let runner = TestRunner::new(store.clone(), passing(&["C1"]));

        let spec = basic_spec();
        runner.run(RunMode::FuzzingClient, &spec, &[]).await.unwrap();

        let active = store.get_spec_by_name("basic").await.unwrap();
        assert_eq!(active.fingerprint(), spec.fingerprint());
    }
}
