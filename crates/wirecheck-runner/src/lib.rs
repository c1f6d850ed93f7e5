//! Wirecheck test runner.
//!
//! Drives an ordered list of test cases to completion against a shared
//! result store:
//! - [`TestRun`] is the cursor state machine over one run's cases
//! - [`TestCase`] / [`CaseSource`] are the execution seams filled in by
//!   the wire-protocol collaborator
//! - [`RunObserver`] receives per-case progress callbacks
//! - [`TestRunner`] orchestrates import, execution, persistence, and
//!   the unconditional close of the run

#![deny(unsafe_code)]

pub mod case;
pub mod observer;
pub mod run;
pub mod runner;

pub use case::{CaseError, CaseExecution, CaseSource, TestCase};
pub use observer::{ObserverError, RunObserver};
pub use run::TestRun;
pub use runner::{RunReport, RunnerError, TestRunner};
