//! Wirecheck core types.
//!
//! Persisted entities for conformance test orchestration:
//! - test specifications with stable content fingerprints
//! - testsuite runs and their open/closed lifecycle
//! - per-case results
//! - provenance records for generated report artifacts
//!
//! This crate is pure data: no storage, no I/O, no execution. The
//! contracts that move these values live in `wirecheck-store`,
//! `wirecheck-runner`, and `wirecheck-report`.

#![deny(unsafe_code)]

pub mod case;
pub mod ids;
pub mod report;
pub mod result;
pub mod run;
pub mod spec;

pub use case::CaseInfo;
pub use ids::{ResultId, RunId, SpecId};
pub use report::{ReportFileRecord, ReportKind, ReportTarget};
pub use result::{CaseOutcome, NewTestResult, TestResult};
pub use run::{InvalidModeError, RunMode, RunRecord, RunStatus, RunSummary};
pub use spec::{SpecError, TestSpec};
