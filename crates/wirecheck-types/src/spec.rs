//! Test specification values and content identity.
//!
//! A spec is an opaque, JSON-serializable description of what to test.
//! The core only requires a `name` field for lookup and a stable
//! content fingerprint for change detection; everything else in the
//! body belongs to the test-producer collaborator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};
use thiserror::Error;

/// Errors raised when a spec body cannot be accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("spec has no string `name` field")]
    MissingName,

    #[error("spec `name` field is empty")]
    EmptyName,
}

/// A declarative test specification.
///
/// Identity is by logical name; content equality (via [`fingerprint`])
/// decides whether a re-import is an insert, an update, or a no-op.
///
/// [`fingerprint`]: TestSpec::fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    name: String,
    body: Value,
}

impl TestSpec {
    /// Wrap a JSON body, validating the presence of a non-empty `name`.
    pub fn new(body: Value) -> Result<Self, SpecError> {
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .ok_or(SpecError::MissingName)?;
        if name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            body,
        })
    }

    /// Logical name used for active-spec lookup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The opaque JSON body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// SHA-1 hex digest of the canonical (key-sorted) serialization.
    ///
    /// Two specs with the same logical content produce the same
    /// fingerprint regardless of object key order.
    pub fn fingerprint(&self) -> String {
        let canonical = canonicalize(&self.body);
        let mut hasher = Sha1::new();
        hasher.update(canonical.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Rebuild a value with all object keys in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
