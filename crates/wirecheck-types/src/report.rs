//! Provenance records for generated report artifacts.

use crate::ids::{ResultId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What a generated report artifact describes.
///
/// An index report aggregates a whole run; a detail report belongs to
/// one result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportTarget {
    Result(ResultId),
    Run(RunId),
}

/// Kind of produced report artifact.
///
/// Open enumeration: backends must tolerate kinds they do not know,
/// so anything beyond the built-in kinds travels as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Html,
    Json,
    #[serde(untagged)]
    Other(String),
}

impl ReportKind {
    pub fn as_str(&self) -> &str {
        match self {
            ReportKind::Html => "html",
            ReportKind::Json => "json",
            ReportKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance record for one generated report artifact.
///
/// The content hash lets backends treat re-registration of an
/// unchanged artifact as idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFileRecord {
    pub target: ReportTarget,
    pub kind: ReportKind,
    pub sha1: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrips_builtin() {
        let encoded = serde_json::to_string(&ReportKind::Html).unwrap();
        assert_eq!(encoded, "\"html\"");
        let decoded: ReportKind = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(decoded, ReportKind::Json);
    }

    #[test]
    fn test_kind_tolerates_unknown() {
        let decoded: ReportKind = serde_json::from_str("\"pdf\"").unwrap();
        assert_eq!(decoded, ReportKind::Other("pdf".to_string()));
        assert_eq!(decoded.as_str(), "pdf");
    }
}
