//! Spec-import deduplication.
//!
//! The insert/update/no-op decision is a pure function over the
//! incoming spec and the currently active spec of the same name, so
//! "does this spec content count as changed" is testable without a
//! live backend. Both backends route `import_spec` through it.

use serde::{Deserialize, Serialize};
use wirecheck_types::TestSpec;

/// Operation actually carried out by an import.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportOp {
    Inserted,
    Updated,
}

/// Planned action for an incoming spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportDecision {
    /// No active spec with this name exists.
    Insert,
    /// An active spec exists with a different fingerprint.
    Update,
    /// Fingerprints match; importing is a side-effect-free no-op.
    Unchanged,
}

/// Decide what importing `incoming` should do, given the active spec
/// (if any) stored under the same name.
pub fn plan_import(incoming: &TestSpec, active: Option<&TestSpec>) -> ImportDecision {
    match active {
        None => ImportDecision::Insert,
        Some(current) if current.fingerprint() == incoming.fingerprint() => {
            ImportDecision::Unchanged
        }
        Some(_) => ImportDecision::Update,
    }
}
