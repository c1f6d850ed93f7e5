//! Report artifact writing and provenance registration.

use crate::error::ReportResult;
use crate::generator::ReportGenerator;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use wirecheck_store::ResultStore;
use wirecheck_types::{ResultId, RunId};

/// Writes rendered report artifacts and records their provenance.
///
/// File-producing operations register `(target, kind, sha1, path)`
/// with the store after the write succeeds. Sink-producing operations
/// register nothing, since no filesystem path exists for the bytes.
pub struct ReportFileRegistry {
    store: Arc<dyn ResultStore>,
}

impl ReportFileRegistry {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }

    /// Render the index artifact for `run_id`, write it to
    /// `output_directory/index<ext>`, and register the file.
    pub async fn write_report_index_file(
        &self,
        generator: &dyn ReportGenerator,
        run_id: &RunId,
    ) -> ReportResult<PathBuf> {
        let run = self.store.get_run(run_id).await?;
        let results = self.store.get_results(run_id).await?;
        let bytes = generator.render_index(&run, &results)?;

        let path = generator
            .output_directory()
            .join(format!("index{}", generator.file_extension()));
        write_bytes(&path, &bytes).await?;

        let sha1 = sha1_hex(&bytes);
        self.store
            .register_run_file(run_id, generator.kind(), &sha1, &path)
            .await?;
        tracing::info!(run_id = %run_id, path = %path.display(), "wrote run index report");
        Ok(path)
    }

    /// Render the index artifact for `run_id` into a caller-supplied
    /// sink. No provenance is registered.
    pub async fn write_report_index_to<W>(
        &self,
        generator: &dyn ReportGenerator,
        run_id: &RunId,
        sink: &mut W,
    ) -> ReportResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let run = self.store.get_run(run_id).await?;
        let results = self.store.get_results(run_id).await?;
        let bytes = generator.render_index(&run, &results)?;
        sink.write_all(&bytes).await?;
        Ok(())
    }

    /// Render the detail artifact for `result_id`, write it to
    /// `output_directory/<result-id><ext>`, and register the file.
    pub async fn write_report_file(
        &self,
        generator: &dyn ReportGenerator,
        result_id: &ResultId,
    ) -> ReportResult<PathBuf> {
        let result = self.store.get_result(result_id).await?;
        let bytes = generator.render_result(&result)?;

        let path = generator
            .output_directory()
            .join(format!("{}{}", result_id, generator.file_extension()));
        write_bytes(&path, &bytes).await?;

        let sha1 = sha1_hex(&bytes);
        self.store
            .register_result_file(result_id, generator.kind(), &sha1, &path)
            .await?;
        tracing::debug!(result_id = %result_id, path = %path.display(), "wrote result report");
        Ok(path)
    }

    /// Render the detail artifact for `result_id` into a
    /// caller-supplied sink. No provenance is registered.
    pub async fn write_report_to<W>(
        &self,
        generator: &dyn ReportGenerator,
        result_id: &ResultId,
        sink: &mut W,
    ) -> ReportResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let result = self.store.get_result(result_id).await?;
        let bytes = generator.render_result(&result)?;
        sink.write_all(&bytes).await?;
        Ok(())
    }
}

async fn write_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, bytes).await
}

/// Lowercase hex SHA-1 of the rendered artifact bytes.
pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::JsonReportGenerator;
    use serde_json::json;
    use wirecheck_store::{MemoryStore, ResultStore};
    use wirecheck_types::{
        CaseOutcome, NewTestResult, ReportKind, ReportTarget, RunMode, TestSpec,
    };

    async fn seeded_store() -> (Arc<MemoryStore>, RunId, ResultId) {
        let store = Arc::new(MemoryStore::new());
        let spec = TestSpec::new(json!({"name": "basic", "cases": ["C1"]})).unwrap();
        store.import_spec(&spec).await.unwrap();
        let run_id = store.new_run(RunMode::FuzzingClient, &spec).await.unwrap();
        let result_id = store
            .save_result(
                &run_id,
                NewTestResult {
                    case_name: "C1".to_string(),
                    outcome: CaseOutcome::Passed,
                    expectation: "pass".to_string(),
                    diagnostics: json!({"frames": 3}),
                    duration_ms: Some(12),
                },
            )
            .await
            .unwrap();
        store.close_run(&run_id).await.unwrap();
        (store, run_id, result_id)
    }

    #[tokio::test]
    async fn test_index_file_written_and_registered() {
        let (store, run_id, _) = seeded_store().await;
        let dir = tempfile::tempdir().unwrap();
        let generator = JsonReportGenerator::new(dir.path());
        let registry = ReportFileRegistry::new(store.clone());

        let path = registry
            .write_report_index_file(&generator, &run_id)
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("index.json"));

        let bytes = std::fs::read(&path).unwrap();
        let rendered: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(rendered["run"]["id"], json!(run_id.as_str()));
        assert_eq!(rendered["results"].as_array().unwrap().len(), 1);

        let files = store.report_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].target, ReportTarget::Run(run_id));
        assert_eq!(files[0].kind, ReportKind::Json);
        assert_eq!(files[0].sha1, sha1_hex(&bytes));
        assert_eq!(files[0].path, path);
    }

    #[tokio::test]
    async fn test_result_file_named_after_result_id() {
        let (store, _, result_id) = seeded_store().await;
        let dir = tempfile::tempdir().unwrap();
        let generator = JsonReportGenerator::new(dir.path());
        let registry = ReportFileRegistry::new(store.clone());

        let path = registry
            .write_report_file(&generator, &result_id)
            .await
            .unwrap();
        assert_eq!(path, dir.path().join(format!("{result_id}.json")));

        let result: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(result["case_name"], json!("C1"));

        let files = store.report_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].target, ReportTarget::Result(result_id));
    }

    #[tokio::test]
    async fn test_rewriting_unchanged_artifact_is_idempotent() {
        let (store, run_id, _) = seeded_store().await;
        let dir = tempfile::tempdir().unwrap();
        let generator = JsonReportGenerator::new(dir.path());
        let registry = ReportFileRegistry::new(store.clone());

        registry
            .write_report_index_file(&generator, &run_id)
            .await
            .unwrap();
        registry
            .write_report_index_file(&generator, &run_id)
            .await
            .unwrap();

        assert_eq!(store.report_files().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sink_writes_register_nothing() {
        let (store, run_id, result_id) = seeded_store().await;
        let generator = JsonReportGenerator::new("/nonexistent");
        let registry = ReportFileRegistry::new(store.clone());

        let mut index = Vec::new();
        registry
            .write_report_index_to(&generator, &run_id, &mut index)
            .await
            .unwrap();
        assert!(!index.is_empty());

        let mut detail = Vec::new();
        registry
            .write_report_to(&generator, &result_id, &mut detail)
            .await
            .unwrap();
        assert!(!detail.is_empty());

        assert!(store.report_files().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_run_surfaces_store_error() {
        let (store, _, _) = seeded_store().await;
        let registry = ReportFileRegistry::new(store);
        let generator = JsonReportGenerator::new("/nonexistent");

        let err = registry
            .write_report_index_file(&generator, &RunId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::ReportError::Store(_)));
    }

    #[test]
    fn test_sha1_hex_of_known_input() {
        // sha1("abc")
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
