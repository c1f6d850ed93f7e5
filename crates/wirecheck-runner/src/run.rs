//! Run cursor state machine.

use crate::case::TestCase;
use std::sync::Arc;

/// Ordered cursor over the cases of one run.
///
/// Two states: pending (cases not yet exhausted) and exhausted.
/// Exhaustion is terminal: once `next` returns `None` it returns
/// `None` forever. The length is fixed at construction; `remaining`
/// counts the cases not yet handed out and is unaffected by read-only
/// inspection.
pub struct TestRun {
    cases: Vec<Arc<dyn TestCase>>,
    cursor: usize,
}

impl TestRun {
    pub fn new(cases: Vec<Arc<dyn TestCase>>) -> Self {
        Self { cases, cursor: 0 }
    }

    /// Next unconsumed case, or `None` once all cases are consumed.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Arc<dyn TestCase>> {
        let case = self.cases.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(case)
    }

    /// Count of cases not yet returned by `next`.
    pub fn remaining(&self) -> usize {
        self.cases.len() - self.cursor
    }

    /// Total cases in this run. Fetching cases does not change it.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
