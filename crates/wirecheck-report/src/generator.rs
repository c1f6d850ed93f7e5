//! Report generator contract.
//!
//! A generator carries its fixed output configuration (directory, file
//! extension, MIME type) and knows how to render two artifact shapes:
//! an index covering a whole run, and a detail page for one result.
//! Writing and provenance registration are the registry's job, so a
//! generator never touches the store.

use crate::error::{ReportError, ReportResult};
use serde_json::json;
use std::path::{Path, PathBuf};
use wirecheck_types::{ReportKind, RunRecord, TestResult};

/// Renders report artifacts for stored runs and results.
pub trait ReportGenerator: Send + Sync {
    /// Directory artifact files are written into.
    fn output_directory(&self) -> &Path;

    /// File extension for produced artifacts, including the leading
    /// dot (`".json"`).
    fn file_extension(&self) -> &str;

    /// MIME type of produced artifacts.
    fn mime_type(&self) -> &str;

    /// Kind recorded in the provenance entry for produced artifacts.
    fn kind(&self) -> ReportKind;

    /// Render the index artifact for one run and its results.
    fn render_index(&self, run: &RunRecord, results: &[TestResult]) -> ReportResult<Vec<u8>>;

    /// Render the detail artifact for one result.
    fn render_result(&self, result: &TestResult) -> ReportResult<Vec<u8>>;
}

/// Reference generator that emits the stored records as pretty JSON.
pub struct JsonReportGenerator {
    output_directory: PathBuf,
}

impl JsonReportGenerator {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
        }
    }
}

impl ReportGenerator for JsonReportGenerator {
    fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    fn file_extension(&self) -> &str {
        ".json"
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn kind(&self) -> ReportKind {
        ReportKind::Json
    }

    fn render_index(&self, run: &RunRecord, results: &[TestResult]) -> ReportResult<Vec<u8>> {
        serde_json::to_vec_pretty(&json!({
            "run": run,
            "results": results,
        }))
        .map_err(|err| ReportError::Render(err.to_string()))
    }

    fn render_result(&self, result: &TestResult) -> ReportResult<Vec<u8>> {
        serde_json::to_vec_pretty(result).map_err(|err| ReportError::Render(err.to_string()))
    }
}
