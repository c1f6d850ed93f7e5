use crate::error::StoreResult;
use crate::importer::ImportOp;
use async_trait::async_trait;
use std::path::Path;
use wirecheck_types::{
    NewTestResult, ReportKind, ResultId, RunId, RunMode, RunRecord, RunSummary, SpecId, TestResult,
    TestSpec,
};

/// Default cap for [`ResultStore::get_test_runs`].
pub const DEFAULT_RUN_LIST_LIMIT: i64 = 10;

/// Durable keyed storage for specs, runs, results, and report files.
///
/// All operations may suspend on I/O and are safe under concurrent
/// callers. Mutations are serialized per run: `close_run` acts as a
/// write barrier, so a `save_result` that observes the close fails
/// with [`RunClosed`] instead of appending.
///
/// [`RunClosed`]: crate::StoreError::RunClosed
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Import a spec, deduplicating against the active spec of the
    /// same name by content fingerprint.
    ///
    /// Returns the operation carried out (`None` on an exact-content
    /// match, which is side-effect free) and the spec ID. The ID is
    /// assigned on first insert and stays stable across updates;
    /// superseded versions are retained for historical run integrity
    /// but are no longer returned by name lookup.
    async fn import_spec(&self, spec: &TestSpec) -> StoreResult<(Option<ImportOp>, SpecId)>;

    /// Find the currently active spec by name.
    async fn get_spec_by_name(&self, name: &str) -> StoreResult<TestSpec>;

    /// Open a new run in the given mode, bound to the given spec
    /// content by value.
    async fn new_run(&self, mode: RunMode, spec: &TestSpec) -> StoreResult<RunId>;

    /// Fetch one run record.
    async fn get_run(&self, run_id: &RunId) -> StoreResult<RunRecord>;

    /// Append a result to an open run and return its assigned ID.
    ///
    /// Fails with [`RunClosed`] once the run is closed and with
    /// [`RunNotFound`] for an unknown run. Results within one run form
    /// an append-ordered sequence.
    ///
    /// [`RunClosed`]: crate::StoreError::RunClosed
    /// [`RunNotFound`]: crate::StoreError::RunNotFound
    async fn save_result(&self, run_id: &RunId, result: NewTestResult) -> StoreResult<ResultId>;

    /// Close a run against further mutation.
    ///
    /// Closing an already-closed run is a no-op, not an error.
    async fn close_run(&self, run_id: &RunId) -> StoreResult<()>;

    /// List the latest runs, most recent first. `limit` caps the
    /// length; negative values are rejected with
    /// [`InvalidArgument`].
    ///
    /// [`InvalidArgument`]: crate::StoreError::InvalidArgument
    async fn get_test_runs(&self, limit: i64) -> StoreResult<Vec<RunSummary>>;

    /// [`get_test_runs`] capped at [`DEFAULT_RUN_LIST_LIMIT`].
    ///
    /// [`get_test_runs`]: ResultStore::get_test_runs
    async fn get_recent_test_runs(&self) -> StoreResult<Vec<RunSummary>> {
        self.get_test_runs(DEFAULT_RUN_LIST_LIMIT).await
    }

    /// Fetch a single result by ID.
    async fn get_result(&self, result_id: &ResultId) -> StoreResult<TestResult>;

    /// Fetch all results of a run in insertion order. A run with no
    /// results yet yields an empty list, not an error.
    async fn get_results(&self, run_id: &RunId) -> StoreResult<Vec<TestResult>>;

    /// Record provenance for a generated per-result report artifact.
    ///
    /// Re-registration with an identical `(result, kind, sha1)` is
    /// idempotent.
    async fn register_result_file(
        &self,
        result_id: &ResultId,
        kind: ReportKind,
        sha1: &str,
        path: &Path,
    ) -> StoreResult<()>;

    /// Record provenance for a run-level index report artifact, with
    /// the same idempotence as [`register_result_file`].
    ///
    /// [`register_result_file`]: ResultStore::register_result_file
    async fn register_run_file(
        &self,
        run_id: &RunId,
        kind: ReportKind,
        sha1: &str,
        path: &Path,
    ) -> StoreResult<()>;
}
