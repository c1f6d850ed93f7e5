//! In-memory reference implementation of the result store.
//!
//! This adapter is deterministic and test-friendly. Durable
//! deployments should use [`FsStore`](crate::FsStore) or another
//! backend satisfying the same contract.

use crate::error::{StoreError, StoreResult};
use crate::importer::{plan_import, ImportDecision, ImportOp};
use crate::traits::ResultStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use wirecheck_types::{
    NewTestResult, ReportFileRecord, ReportKind, ReportTarget, ResultId, RunId, RunMode, RunRecord,
    RunStatus, RunSummary, SpecId, TestResult, TestSpec,
};

/// In-memory result store adapter.
///
/// Every table lives behind one lock so the closed-status check in
/// `save_result` is atomic with respect to `close_run`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    specs: HashMap<String, SpecEntry>,
    runs: HashMap<RunId, RunRecord>,
    /// Creation order, oldest first.
    run_order: Vec<RunId>,
    results: HashMap<ResultId, TestResult>,
    /// Append order per run.
    run_results: HashMap<RunId, Vec<ResultId>>,
    report_files: Vec<ReportFileRecord>,
}

struct SpecEntry {
    id: SpecId,
    /// Version history, newest last; the last entry is active.
    versions: Vec<TestSpec>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered report-file provenance records, in registration
    /// order. Test observability hook; not part of the store contract.
    pub fn report_files(&self) -> StoreResult<Vec<ReportFileRecord>> {
        Ok(self.read()?.report_files.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| lock_poisoned())
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| lock_poisoned())
    }
}

fn lock_poisoned() -> StoreError {
    StoreError::StorageFailure("store lock poisoned".into())
}

/// Shared idempotence rule for report-file registration.
fn already_registered(files: &[ReportFileRecord], record: &ReportFileRecord) -> bool {
    files
        .iter()
        .any(|f| f.target == record.target && f.kind == record.kind && f.sha1 == record.sha1)
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn import_spec(&self, spec: &TestSpec) -> StoreResult<(Option<ImportOp>, SpecId)> {
        let mut inner = self.write()?;
        let decision = plan_import(
            spec,
            inner
                .specs
                .get(spec.name())
                .and_then(|entry| entry.versions.last()),
        );
        match decision {
            ImportDecision::Unchanged => {
                let entry = inner
                    .specs
                    .get(spec.name())
                    .ok_or_else(|| StoreError::SpecNotFound(spec.name().to_string()))?;
                Ok((None, entry.id.clone()))
            }
            ImportDecision::Insert => {
                let id = SpecId::generate();
                inner.specs.insert(
                    spec.name().to_string(),
                    SpecEntry {
                        id: id.clone(),
                        versions: vec![spec.clone()],
                    },
                );
                tracing::info!(spec = %spec.name(), spec_id = %id, "imported new spec");
                Ok((Some(ImportOp::Inserted), id))
            }
            ImportDecision::Update => {
                let entry = inner
                    .specs
                    .get_mut(spec.name())
                    .ok_or_else(|| StoreError::SpecNotFound(spec.name().to_string()))?;
                entry.versions.push(spec.clone());
                tracing::info!(spec = %spec.name(), spec_id = %entry.id, "updated spec");
                Ok((Some(ImportOp::Updated), entry.id.clone()))
            }
        }
    }

    async fn get_spec_by_name(&self, name: &str) -> StoreResult<TestSpec> {
        let inner = self.read()?;
        inner
            .specs
            .get(name)
            .and_then(|entry| entry.versions.last())
            .cloned()
            .ok_or_else(|| StoreError::SpecNotFound(name.to_string()))
    }

    async fn new_run(&self, mode: RunMode, spec: &TestSpec) -> StoreResult<RunId> {
        let mut inner = self.write()?;
        let id = RunId::generate();
        let record = RunRecord {
            id: id.clone(),
            mode,
            spec_name: spec.name().to_string(),
            spec: spec.clone(),
            status: RunStatus::Open,
            created_at: Utc::now(),
            closed_at: None,
        };
        inner.runs.insert(id.clone(), record);
        inner.run_order.push(id.clone());
        inner.run_results.insert(id.clone(), Vec::new());
        tracing::info!(run_id = %id, mode = %mode, spec = %spec.name(), "opened run");
        Ok(id)
    }

    async fn get_run(&self, run_id: &RunId) -> StoreResult<RunRecord> {
        let inner = self.read()?;
        inner
            .runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))
    }

    async fn save_result(&self, run_id: &RunId, result: NewTestResult) -> StoreResult<ResultId> {
        let mut inner = self.write()?;
        let run = inner
            .runs
            .get(run_id)
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))?;
        if run.is_closed() {
            return Err(StoreError::RunClosed(run_id.clone()));
        }

        let id = ResultId::generate();
        let record = TestResult {
            id: id.clone(),
            run_id: run_id.clone(),
            case_name: result.case_name,
            outcome: result.outcome,
            expectation: result.expectation,
            diagnostics: result.diagnostics,
            duration_ms: result.duration_ms,
            created_at: Utc::now(),
        };
        inner.results.insert(id.clone(), record);
        inner
            .run_results
            .entry(run_id.clone())
            .or_default()
            .push(id.clone());
        Ok(id)
    }

    async fn close_run(&self, run_id: &RunId) -> StoreResult<()> {
        let mut inner = self.write()?;
        let run = inner
            .runs
            .get_mut(run_id)
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))?;
        if run.is_closed() {
            return Ok(());
        }
        run.status = RunStatus::Closed;
        run.closed_at = Some(Utc::now());
        tracing::info!(run_id = %run_id, "closed run");
        Ok(())
    }

    async fn get_test_runs(&self, limit: i64) -> StoreResult<Vec<RunSummary>> {
        if limit < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "limit must be non-negative, got {limit}"
            )));
        }
        let inner = self.read()?;
        Ok(inner
            .run_order
            .iter()
            .rev()
            .take(limit as usize)
            .filter_map(|id| inner.runs.get(id))
            .map(|run| RunSummary {
                id: run.id.clone(),
                mode: run.mode,
                spec_name: run.spec_name.clone(),
                status: run.status,
                created_at: run.created_at,
                closed_at: run.closed_at,
                result_count: inner
                    .run_results
                    .get(&run.id)
                    .map(Vec::len)
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn get_result(&self, result_id: &ResultId) -> StoreResult<TestResult> {
        let inner = self.read()?;
        inner
            .results
            .get(result_id)
            .cloned()
            .ok_or_else(|| StoreError::ResultNotFound(result_id.clone()))
    }

    async fn get_results(&self, run_id: &RunId) -> StoreResult<Vec<TestResult>> {
        let inner = self.read()?;
        if !inner.runs.contains_key(run_id) {
            return Err(StoreError::RunNotFound(run_id.clone()));
        }
        Ok(inner
            .run_results
            .get(run_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.results.get(id))
            .cloned()
            .collect())
    }

    async fn register_result_file(
        &self,
        result_id: &ResultId,
        kind: ReportKind,
        sha1: &str,
        path: &Path,
    ) -> StoreResult<()> {
        let mut inner = self.write()?;
        if !inner.results.contains_key(result_id) {
            return Err(StoreError::ResultNotFound(result_id.clone()));
        }
        let record = ReportFileRecord {
            target: ReportTarget::Result(result_id.clone()),
            kind,
            sha1: sha1.to_string(),
            path: path.to_path_buf(),
            created_at: Utc::now(),
        };
        if already_registered(&inner.report_files, &record) {
            return Ok(());
        }
        inner.report_files.push(record);
        Ok(())
    }

    async fn register_run_file(
        &self,
        run_id: &RunId,
        kind: ReportKind,
        sha1: &str,
        path: &Path,
    ) -> StoreResult<()> {
        let mut inner = self.write()?;
        if !inner.runs.contains_key(run_id) {
            return Err(StoreError::RunNotFound(run_id.clone()));
        }
        let record = ReportFileRecord {
            target: ReportTarget::Run(run_id.clone()),
            kind,
            sha1: sha1.to_string(),
            path: path.to_path_buf(),
            created_at: Utc::now(),
        };
        if already_registered(&inner.report_files, &record) {
            return Ok(());
        }
        inner.report_files.push(record);
        Ok(())
    }
}
