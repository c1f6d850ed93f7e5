//! Descriptive case metadata.

use serde::{Deserialize, Serialize};

/// Static description of one test case.
///
/// Cases are supplied by an external producer; the core consumes them
/// through this metadata plus the execution trait in
/// `wirecheck-runner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseInfo {
    pub name: String,
    pub description: String,
    pub expectation: String,
}

impl CaseInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expectation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expectation: expectation.into(),
        }
    }
}
