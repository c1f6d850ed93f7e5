//! Wirecheck result store.
//!
//! This crate defines the storage contract for the orchestration core:
//! - spec import with content-fingerprint deduplication
//! - run lifecycle (open, append results, close-as-barrier)
//! - append-ordered result listing
//! - report artifact provenance registration
//!
//! Design stance:
//! - the insert/update/no-op import decision is a pure function
//!   ([`importer::plan_import`]) shared by every backend
//! - `MemoryStore` is the deterministic, test-friendly adapter
//! - `FsStore` persists JSON documents for restart-surviving identity

#![deny(unsafe_code)]

mod error;
pub mod fs;
pub mod importer;
pub mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsStore;
pub use importer::{plan_import, ImportDecision, ImportOp};
pub use memory::MemoryStore;
pub use traits::{ResultStore, DEFAULT_RUN_LIST_LIMIT};
