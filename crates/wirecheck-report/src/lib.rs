//! Wirecheck report artifacts.
//!
//! Couples a rendering seam ([`ReportGenerator`]) with provenance
//! bookkeeping ([`ReportFileRegistry`]): every artifact written to
//! disk is registered with the result store under its content hash,
//! so regenerating an unchanged report stays idempotent.

#![deny(unsafe_code)]

mod error;
pub mod generator;
pub mod registry;

pub use error::{ReportError, ReportResult};
pub use generator::{JsonReportGenerator, ReportGenerator};
pub use registry::{sha1_hex, ReportFileRegistry};
