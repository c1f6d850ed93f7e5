//! File-backed durable implementation of the result store.
//!
//! Layout under the root directory:
//! - `specs.json` — every spec history, keyed by name, newest version last
//! - `runs/<run-id>.json` — one document per run holding the run record,
//!   its append-ordered results, and its registered report files
//!
//! Documents are loaded once at open. Mutations build the updated
//! document under an async lock, persist it, and only then commit it
//! to in-process state, so a failed write leaves the store unchanged
//! and identity survives process restarts.

use crate::error::{StoreError, StoreResult};
use crate::importer::{plan_import, ImportDecision, ImportOp};
use crate::traits::ResultStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use wirecheck_types::{
    NewTestResult, ReportFileRecord, ReportKind, ReportTarget, ResultId, RunId, RunMode, RunRecord,
    RunStatus, RunSummary, SpecId, TestResult, TestSpec,
};

/// Durable JSON-document store rooted at a directory.
pub struct FsStore {
    specs_path: PathBuf,
    runs_dir: PathBuf,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    specs: HashMap<String, SpecDoc>,
    runs: HashMap<RunId, RunDoc>,
    /// Creation order, oldest first.
    run_order: Vec<RunId>,
    /// Owning run per result, for direct result lookup.
    result_index: HashMap<ResultId, RunId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpecDoc {
    id: SpecId,
    name: String,
    versions: Vec<SpecVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpecVersion {
    fingerprint: String,
    spec: TestSpec,
    imported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunDoc {
    record: RunRecord,
    results: Vec<TestResult>,
    files: Vec<ReportFileRecord>,
}

impl FsStore {
    /// Open (or initialize) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let runs_dir = root.join("runs");
        fs::create_dir_all(&runs_dir).await?;
        let specs_path = root.join("specs.json");

        let mut inner = Inner::default();
        if fs::try_exists(&specs_path).await? {
            let bytes = fs::read(&specs_path).await?;
            let docs: Vec<SpecDoc> = serde_json::from_slice(&bytes)?;
            inner.specs = docs.into_iter().map(|doc| (doc.name.clone(), doc)).collect();
        }

        let mut entries = fs::read_dir(&runs_dir).await?;
        let mut loaded = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            let doc: RunDoc = serde_json::from_slice(&bytes)?;
            loaded.push(doc);
        }
        loaded.sort_by(|a, b| {
            a.record
                .created_at
                .cmp(&b.record.created_at)
                .then_with(|| a.record.id.0.cmp(&b.record.id.0))
        });
        for doc in loaded {
            inner.run_order.push(doc.record.id.clone());
            for result in &doc.results {
                inner
                    .result_index
                    .insert(result.id.clone(), doc.record.id.clone());
            }
            inner.runs.insert(doc.record.id.clone(), doc);
        }

        tracing::info!(
            root = %root.display(),
            specs = inner.specs.len(),
            runs = inner.runs.len(),
            "opened file store"
        );
        Ok(Self {
            specs_path,
            runs_dir,
            inner: RwLock::new(inner),
        })
    }

    /// Registered report-file provenance records across all runs.
    /// Test observability hook; not part of the store contract.
    pub async fn report_files(&self) -> Vec<ReportFileRecord> {
        let inner = self.inner.read().await;
        let mut files = Vec::new();
        for id in &inner.run_order {
            if let Some(doc) = inner.runs.get(id) {
                files.extend(doc.files.iter().cloned());
            }
        }
        files
    }

    /// Persist the spec table with `updated` standing in for (or added
    /// to) its stored document.
    async fn persist_specs(&self, inner: &Inner, updated: &SpecDoc) -> StoreResult<()> {
        let mut docs: Vec<&SpecDoc> = inner
            .specs
            .values()
            .filter(|doc| doc.name != updated.name)
            .collect();
        docs.push(updated);
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        write_doc(&self.specs_path, &docs).await
    }

    async fn persist_run(&self, doc: &RunDoc) -> StoreResult<()> {
        let path = self.runs_dir.join(format!("{}.json", doc.record.id));
        write_doc(&path, doc).await
    }
}

/// Write via a sibling temp file so readers never observe a torn
/// document.
async fn write_doc<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

fn already_registered(files: &[ReportFileRecord], record: &ReportFileRecord) -> bool {
    files
        .iter()
        .any(|f| f.target == record.target && f.kind == record.kind && f.sha1 == record.sha1)
}

#[async_trait]
impl ResultStore for FsStore {
    async fn import_spec(&self, spec: &TestSpec) -> StoreResult<(Option<ImportOp>, SpecId)> {
        let mut inner = self.inner.write().await;
        let decision = {
            let active = inner
                .specs
                .get(spec.name())
                .and_then(|doc| doc.versions.last())
                .map(|version| &version.spec);
            plan_import(spec, active)
        };

        let version = SpecVersion {
            fingerprint: spec.fingerprint(),
            spec: spec.clone(),
            imported_at: Utc::now(),
        };
        let (op, doc) = match decision {
            ImportDecision::Unchanged => {
                let id = inner
                    .specs
                    .get(spec.name())
                    .map(|doc| doc.id.clone())
                    .ok_or_else(|| StoreError::SpecNotFound(spec.name().to_string()))?;
                return Ok((None, id));
            }
            ImportDecision::Insert => {
                let doc = SpecDoc {
                    id: SpecId::generate(),
                    name: spec.name().to_string(),
                    versions: vec![version],
                };
                (ImportOp::Inserted, doc)
            }
            ImportDecision::Update => {
                let mut doc = inner
                    .specs
                    .get(spec.name())
                    .cloned()
                    .ok_or_else(|| StoreError::SpecNotFound(spec.name().to_string()))?;
                doc.versions.push(version);
                (ImportOp::Updated, doc)
            }
        };

        // Persist before committing so a failed write changes nothing.
        self.persist_specs(&inner, &doc).await?;
        let id = doc.id.clone();
        inner.specs.insert(doc.name.clone(), doc);
        match op {
            ImportOp::Inserted => {
                tracing::info!(spec = %spec.name(), spec_id = %id, "imported new spec")
            }
            ImportOp::Updated => {
                tracing::info!(spec = %spec.name(), spec_id = %id, "updated spec")
            }
        }
        Ok((Some(op), id))
    }

    async fn get_spec_by_name(&self, name: &str) -> StoreResult<TestSpec> {
        let inner = self.inner.read().await;
        inner
            .specs
            .get(name)
            .and_then(|doc| doc.versions.last())
            .map(|version| version.spec.clone())
            .ok_or_else(|| StoreError::SpecNotFound(name.to_string()))
    }

    async fn new_run(&self, mode: RunMode, spec: &TestSpec) -> StoreResult<RunId> {
        let mut inner = self.inner.write().await;
        let id = RunId::generate();
        let doc = RunDoc {
            record: RunRecord {
                id: id.clone(),
                mode,
                spec_name: spec.name().to_string(),
                spec: spec.clone(),
                status: RunStatus::Open,
                created_at: Utc::now(),
                closed_at: None,
            },
            results: Vec::new(),
            files: Vec::new(),
        };
        self.persist_run(&doc).await?;
        inner.runs.insert(id.clone(), doc);
        inner.run_order.push(id.clone());
        tracing::info!(run_id = %id, mode = %mode, spec = %spec.name(), "opened run");
        Ok(id)
    }

    async fn get_run(&self, run_id: &RunId) -> StoreResult<RunRecord> {
        let inner = self.inner.read().await;
        inner
            .runs
            .get(run_id)
            .map(|doc| doc.record.clone())
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))
    }

    async fn save_result(&self, run_id: &RunId, result: NewTestResult) -> StoreResult<ResultId> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .runs
            .get(run_id)
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))?;
        if doc.record.is_closed() {
            return Err(StoreError::RunClosed(run_id.clone()));
        }

        let id = ResultId::generate();
        let mut updated = doc.clone();
        updated.results.push(TestResult {
            id: id.clone(),
            run_id: run_id.clone(),
            case_name: result.case_name,
            outcome: result.outcome,
            expectation: result.expectation,
            diagnostics: result.diagnostics,
            duration_ms: result.duration_ms,
            created_at: Utc::now(),
        });
        // Persist before committing so a failed write changes nothing.
        self.persist_run(&updated).await?;
        inner.runs.insert(run_id.clone(), updated);
        inner.result_index.insert(id.clone(), run_id.clone());
        Ok(id)
    }

    async fn close_run(&self, run_id: &RunId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .runs
            .get(run_id)
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))?;
        if doc.record.is_closed() {
            return Ok(());
        }
        let mut updated = doc.clone();
        updated.record.status = RunStatus::Closed;
        updated.record.closed_at = Some(Utc::now());
        self.persist_run(&updated).await?;
        inner.runs.insert(run_id.clone(), updated);
        tracing::info!(run_id = %run_id, "closed run");
        Ok(())
    }

    async fn get_test_runs(&self, limit: i64) -> StoreResult<Vec<RunSummary>> {
        if limit < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "limit must be non-negative, got {limit}"
            )));
        }
        let inner = self.inner.read().await;
        Ok(inner
            .run_order
            .iter()
            .rev()
            .take(limit as usize)
            .filter_map(|id| inner.runs.get(id))
            .map(|doc| RunSummary {
                id: doc.record.id.clone(),
                mode: doc.record.mode,
                spec_name: doc.record.spec_name.clone(),
                status: doc.record.status,
                created_at: doc.record.created_at,
                closed_at: doc.record.closed_at,
                result_count: doc.results.len(),
            })
            .collect())
    }

    async fn get_result(&self, result_id: &ResultId) -> StoreResult<TestResult> {
        let inner = self.inner.read().await;
        inner
            .result_index
            .get(result_id)
            .and_then(|run_id| inner.runs.get(run_id))
            .and_then(|doc| doc.results.iter().find(|r| &r.id == result_id))
            .cloned()
            .ok_or_else(|| StoreError::ResultNotFound(result_id.clone()))
    }

    async fn get_results(&self, run_id: &RunId) -> StoreResult<Vec<TestResult>> {
        let inner = self.inner.read().await;
        inner
            .runs
            .get(run_id)
            .map(|doc| doc.results.clone())
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))
    }

    async fn register_result_file(
        &self,
        result_id: &ResultId,
        kind: ReportKind,
        sha1: &str,
        path: &Path,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let run_id = inner
            .result_index
            .get(result_id)
            .cloned()
            .ok_or_else(|| StoreError::ResultNotFound(result_id.clone()))?;
        let doc = inner
            .runs
            .get(&run_id)
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))?;

        let record = ReportFileRecord {
            target: ReportTarget::Result(result_id.clone()),
            kind,
            sha1: sha1.to_string(),
            path: path.to_path_buf(),
            created_at: Utc::now(),
        };
        if already_registered(&doc.files, &record) {
            return Ok(());
        }
        let mut updated = doc.clone();
        updated.files.push(record);
        self.persist_run(&updated).await?;
        inner.runs.insert(run_id, updated);
        Ok(())
    }

    async fn register_run_file(
        &self,
        run_id: &RunId,
        kind: ReportKind,
        sha1: &str,
        path: &Path,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .runs
            .get(run_id)
            .ok_or_else(|| StoreError::RunNotFound(run_id.clone()))?;

        let record = ReportFileRecord {
            target: ReportTarget::Run(run_id.clone()),
            kind,
            sha1: sha1.to_string(),
            path: path.to_path_buf(),
            created_at: Utc::now(),
        };
        if already_registered(&doc.files, &record) {
            return Ok(());
        }
        let mut updated = doc.clone();
        updated.files.push(record);
        self.persist_run(&updated).await?;
        inner.runs.insert(run_id.clone(), updated);
        Ok(())
    }
}
